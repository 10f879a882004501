//! Cooperative single-task scheduler tying the pipeline together.
//!
//! All work runs as arms of one `tokio::select!` loop on one task:
//! message dispatch, the 33 ms render tick, the 5 s label sweep, and the
//! per-record one-shot expiries. No arm preempts another mid-execution,
//! so the stores need no locking; every arm is short and non-blocking.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::time::DelayQueue;
use tracing::{debug, trace};

use crate::config::VizConfig;
use crate::dispatch::{Dispatcher, ExpiryKey, IngestedRecord};
use crate::labels::LabelReconciler;
use crate::render::Renderer;
use crate::scale;
use crate::surface::DrawSurface;

/// The live-entity render state manager.
///
/// Owns the stores (via the dispatcher), the label reconciler, the
/// renderer, and the draw surface. Drive it either through [`run`] against
/// a transport channel, or tick by tick through [`ingest`],
/// [`render_tick`], and [`sweep_tick`] with explicit instants.
///
/// [`run`]: Floorview::run
/// [`ingest`]: Floorview::ingest
/// [`render_tick`]: Floorview::render_tick
/// [`sweep_tick`]: Floorview::sweep_tick
pub struct Floorview<S: DrawSurface> {
    dispatcher: Dispatcher,
    reconciler: LabelReconciler,
    renderer: Renderer,
    surface: S,
    record_ttl: Duration,
    render_period: Duration,
    sweep_period: Duration,
}

impl<S: DrawSurface> Floorview<S> {
    /// Create the state manager and draw the static grid onto the surface.
    pub fn new(config: &VizConfig, mut surface: S) -> Self {
        scale::draw_grid(&mut surface, config);

        Self {
            dispatcher: Dispatcher::new(config),
            reconciler: LabelReconciler::new(config.label_handle_ttl, config.label_retain_ttl),
            renderer: Renderer::new(config.marker_radius),
            surface,
            record_ttl: config.record_ttl,
            render_period: config.render_period,
            sweep_period: config.sweep_period,
        }
    }

    /// Route one raw stream message into the stores.
    ///
    /// Returns the ingested record, whose expiry the caller schedules at
    /// `now + record_ttl` ([`run`] does this through its delay queue).
    ///
    /// [`run`]: Floorview::run
    pub fn ingest(&mut self, raw: &str, now: Instant) -> Option<IngestedRecord> {
        self.dispatcher.dispatch(raw, now)
    }

    /// Apply a fired record expiry. Stale keys remove nothing.
    pub fn expire_record(&mut self, key: ExpiryKey) -> bool {
        self.dispatcher.expire(key)
    }

    /// One render tick: reconcile labels, then diff markers.
    pub fn render_tick(&mut self, now: Instant) {
        self.reconciler.reconcile(
            self.dispatcher.positions().snapshot(),
            self.dispatcher.demographics().snapshot(),
            &mut self.surface,
            now,
        );
        self.renderer
            .draw(self.dispatcher.positions().snapshot(), &mut self.surface);
    }

    /// One label expiry sweep.
    pub fn sweep_tick(&mut self, now: Instant) {
        self.reconciler.sweep(&mut self.surface, now);
    }

    /// Run the client loop until cancelled.
    ///
    /// Continues rendering after the inbound channel closes; existing
    /// records simply age out through their expiries.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<String>) {
        let mut expirations: DelayQueue<ExpiryKey> = DelayQueue::new();

        let mut render = tokio::time::interval(self.render_period);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sweep = tokio::time::interval(self.sweep_period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut inbound_open = true;

        loop {
            tokio::select! {
                maybe = rx.recv(), if inbound_open => match maybe {
                    Some(raw) => {
                        if let Some(ingested) = self.ingest(&raw, tokio::time::Instant::now().into_std()) {
                            expirations.insert(ingested.expiry_key(), self.record_ttl);
                        }
                    }
                    None => {
                        debug!("inbound channel closed, rendering continues on existing state");
                        inbound_open = false;
                    }
                },
                Some(expired) = expirations.next(), if !expirations.is_empty() => {
                    let key = expired.into_inner();
                    trace!(record_id = %key.id, "record expiry fired");
                    self.expire_record(key);
                }
                _ = render.tick() => {
                    self.render_tick(tokio::time::Instant::now().into_std());
                }
                _ = sweep.tick() => {
                    self.sweep_tick(tokio::time::Instant::now().into_std());
                }
            }
        }
    }

    /// The underlying dispatcher (store access).
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The label reconciler.
    pub fn labels(&self) -> &LabelReconciler {
        &self.reconciler
    }

    /// The draw surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consume the manager, returning the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}
