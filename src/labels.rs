//! Joins demographic records to position records and manages the
//! lifetime of the resulting text labels.
//!
//! Labels expire on a two-tier schedule: the drawn handle is destroyed once
//! a label has gone unrefreshed for `handle_ttl` (10 s), while the label
//! leaves the retained set already at `retain_ttl` (5 s). The asymmetry is
//! inherited behavior; see the sweep notes on [`LabelReconciler::sweep`].

use std::time::{Duration, Instant};

use tracing::debug;

use crate::store::{DemographicData, PersonId, PositionData, Record};
use crate::surface::{DrawSurface, LabelHandle};

/// One live label: the join of a person's newest position and demographic.
#[derive(Debug)]
pub struct LabelRecord {
    /// The person this label annotates
    pub person_id: PersonId,
    /// Horizontal pixel coordinate, tracks the joined position record
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
    /// Rendered text, `"<gender>, <age>"`
    pub text: String,
    /// When the label was last produced by a reconciliation pass
    pub refreshed_at: Instant,
    /// Drawn handle; None once destroyed by the sweep
    handle: Option<LabelHandle>,
}

impl LabelRecord {
    /// The drawn handle, if not yet destroyed.
    pub fn handle(&self) -> Option<LabelHandle> {
        self.handle
    }
}

/// A label evicted from the retained set whose handle has not yet reached
/// its destruction boundary. Exists only so the handle is still released
/// exactly once.
#[derive(Debug)]
struct RetiredLabel {
    refreshed_at: Instant,
    handle: LabelHandle,
}

/// Derives at most one live label per person from the two stores.
#[derive(Debug)]
pub struct LabelReconciler {
    labels: Vec<LabelRecord>,
    retired: Vec<RetiredLabel>,
    next_handle: u64,
    handle_ttl: Duration,
    retain_ttl: Duration,
}

impl LabelReconciler {
    /// Create a reconciler with the given staleness bounds.
    pub fn new(handle_ttl: Duration, retain_ttl: Duration) -> Self {
        Self {
            labels: Vec::new(),
            retired: Vec::new(),
            next_handle: 0,
            handle_ttl,
            retain_ttl,
        }
    }

    /// Reconcile labels against current store snapshots.
    ///
    /// For each demographic record, find the newest position record for the
    /// same person (the store holds at most one, but the search tolerates
    /// duplicates). A demographic with no position is skipped without error.
    /// Matched labels are created or updated in place and their refresh time
    /// reset.
    pub fn reconcile<S: DrawSurface>(
        &mut self,
        positions: &[Record<PositionData>],
        demographics: &[Record<DemographicData>],
        surface: &mut S,
        now: Instant,
    ) {
        for demo in demographics {
            let Some(pos) = positions
                .iter()
                .filter(|p| p.person_id == demo.person_id)
                .max_by_key(|p| p.created_at)
            else {
                continue;
            };

            let text = format!("{}, {}", demo.data.gender, demo.data.age);

            match self
                .labels
                .iter_mut()
                .find(|l| l.person_id == demo.person_id)
            {
                Some(label) => {
                    label.x = pos.data.x;
                    label.y = pos.data.y;
                    label.text = text;
                    label.refreshed_at = now;
                    if let Some(handle) = label.handle {
                        surface.upsert_label(handle, label.x, label.y, &label.text);
                    }
                }
                None => {
                    self.next_handle += 1;
                    let handle = LabelHandle(self.next_handle);
                    surface.upsert_label(handle, pos.data.x, pos.data.y, &text);
                    self.labels.push(LabelRecord {
                        person_id: demo.person_id,
                        x: pos.data.x,
                        y: pos.data.y,
                        text,
                        refreshed_at: now,
                        handle: Some(handle),
                    });
                }
            }
        }
    }

    /// Expiry sweep, run on its own timer decoupled from reconciliation.
    ///
    /// Handles are destroyed at `handle_ttl` staleness; records leave the
    /// retained set at `retain_ttl`. Since retention is the shorter bound, a
    /// record can be evicted with its handle still drawn; such handles move
    /// to a retired list and are released once their `handle_ttl` passes, so
    /// every handle is released exactly once.
    pub fn sweep<S: DrawSurface>(&mut self, surface: &mut S, now: Instant) {
        for label in &mut self.labels {
            if label.refreshed_at + self.handle_ttl < now {
                if let Some(handle) = label.handle.take() {
                    debug!(person_id = %label.person_id, %handle, "destroying stale label handle");
                    surface.remove_label(handle);
                }
            }
        }

        let handle_ttl = self.handle_ttl;
        self.retired.retain(|retired| {
            if retired.refreshed_at + handle_ttl < now {
                surface.remove_label(retired.handle);
                false
            } else {
                true
            }
        });

        let retain_ttl = self.retain_ttl;
        let mut kept = Vec::with_capacity(self.labels.len());
        for label in self.labels.drain(..) {
            if label.refreshed_at + retain_ttl >= now {
                kept.push(label);
            } else if let Some(handle) = label.handle {
                self.retired.push(RetiredLabel {
                    refreshed_at: label.refreshed_at,
                    handle,
                });
            }
        }
        self.labels = kept;
    }

    /// Currently retained labels.
    pub fn labels(&self) -> &[LabelRecord] {
        &self.labels
    }

    /// The retained label for a person, if any.
    pub fn label_for(&self, person_id: PersonId) -> Option<&LabelRecord> {
        self.labels.iter().find(|l| l.person_id == person_id)
    }

    /// Evicted labels whose handle is still awaiting destruction.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ExpiringStore, Gender};
    use crate::surface::RecordingSurface;

    fn position(x: f64, y: f64) -> PositionData {
        PositionData {
            x,
            y,
            color: "red".to_string(),
        }
    }

    fn demographic(gender: Gender, age: u32) -> DemographicData {
        DemographicData { gender, age }
    }

    fn reconciler() -> LabelReconciler {
        LabelReconciler::new(Duration::from_secs(10), Duration::from_secs(5))
    }

    #[test]
    fn test_join_produces_label_at_position() {
        let now = Instant::now();
        let mut positions = ExpiringStore::new();
        let mut demographics = ExpiringStore::new();
        positions.upsert(PersonId::new(7), position(10.0, 20.0), now);
        demographics.upsert(PersonId::new(7), demographic(Gender::Male, 34), now);

        let mut surface = RecordingSurface::default();
        let mut rec = reconciler();
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, now);

        let label = rec.label_for(PersonId::new(7)).unwrap();
        assert_eq!(label.text, "male, 34");
        assert_eq!((label.x, label.y), (10.0, 20.0));
        assert_eq!(surface.labels.len(), 1);
        let drawn = surface.labels.values().next().unwrap();
        assert_eq!(drawn.text, "male, 34");
        assert_eq!((drawn.x, drawn.y), (10.0, 20.0));
    }

    #[test]
    fn test_demographic_without_position_is_skipped() {
        let now = Instant::now();
        let positions: ExpiringStore<PositionData> = ExpiringStore::new();
        let mut demographics = ExpiringStore::new();
        demographics.upsert(PersonId::new(7), demographic(Gender::Female, 28), now);

        let mut surface = RecordingSurface::default();
        let mut rec = reconciler();
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, now);

        assert!(rec.labels().is_empty());
        assert!(surface.labels.is_empty());
    }

    #[test]
    fn test_reconcile_picks_newest_position_among_duplicates() {
        // The store forbids duplicates, so build raw records directly to
        // exercise the defensive max-by search.
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let mut store = ExpiringStore::new();
        let old_id = store.upsert(PersonId::new(7), position(1.0, 1.0), t0);
        let mut records: Vec<Record<PositionData>> = store.snapshot().to_vec();
        records.push(Record {
            id: old_id,
            person_id: PersonId::new(7),
            created_at: t1,
            data: position(9.0, 9.0),
        });

        let mut demographics = ExpiringStore::new();
        demographics.upsert(PersonId::new(7), demographic(Gender::Male, 40), t1);

        let mut surface = RecordingSurface::default();
        let mut rec = reconciler();
        rec.reconcile(&records, demographics.snapshot(), &mut surface, t1);

        let label = rec.label_for(PersonId::new(7)).unwrap();
        assert_eq!((label.x, label.y), (9.0, 9.0));
    }

    #[test]
    fn test_refresh_keeps_label_alive() {
        let t0 = Instant::now();
        let mut positions = ExpiringStore::new();
        let mut demographics = ExpiringStore::new();
        positions.upsert(PersonId::new(1), position(0.0, 0.0), t0);
        demographics.upsert(PersonId::new(1), demographic(Gender::Male, 30), t0);

        let mut surface = RecordingSurface::default();
        let mut rec = reconciler();
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, t0);

        // Refresh at t0+4s, sweep at t0+8s: only 4s stale, label survives.
        let t4 = t0 + Duration::from_secs(4);
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, t4);
        rec.sweep(&mut surface, t0 + Duration::from_secs(8));

        assert_eq!(rec.labels().len(), 1);
        assert_eq!(surface.labels.len(), 1);
    }

    #[test]
    fn test_two_tier_expiry_releases_handle_exactly_once() {
        let t0 = Instant::now();
        let mut positions = ExpiringStore::new();
        let mut demographics = ExpiringStore::new();
        positions.upsert(PersonId::new(1), position(0.0, 0.0), t0);
        demographics.upsert(PersonId::new(1), demographic(Gender::Female, 22), t0);

        let mut surface = RecordingSurface::default();
        let mut rec = reconciler();
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, t0);

        // 6s stale: evicted from the set, handle still drawn.
        rec.sweep(&mut surface, t0 + Duration::from_secs(6));
        assert!(rec.labels().is_empty());
        assert_eq!(rec.retired_count(), 1);
        assert_eq!(surface.labels.len(), 1);
        assert!(surface.released_labels.is_empty());

        // 11s stale: handle destroyed, once.
        rec.sweep(&mut surface, t0 + Duration::from_secs(11));
        assert_eq!(rec.retired_count(), 0);
        assert!(surface.labels.is_empty());
        assert_eq!(surface.released_labels.len(), 1);

        // Further sweeps release nothing more.
        rec.sweep(&mut surface, t0 + Duration::from_secs(20));
        assert_eq!(surface.released_labels.len(), 1);
    }

    #[test]
    fn test_update_after_handle_destruction_stays_undrawn() {
        // A label that lost its handle but is refreshed again keeps its
        // record state without reallocating a handle, matching the
        // inherited behavior.
        let t0 = Instant::now();
        let mut positions = ExpiringStore::new();
        let mut demographics = ExpiringStore::new();
        positions.upsert(PersonId::new(1), position(0.0, 0.0), t0);
        demographics.upsert(PersonId::new(1), demographic(Gender::Male, 50), t0);

        let mut surface = RecordingSurface::default();
        // Retention longer than handle ttl so the record outlives its handle.
        let mut rec = LabelReconciler::new(Duration::from_secs(2), Duration::from_secs(30));
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, t0);

        rec.sweep(&mut surface, t0 + Duration::from_secs(3));
        assert_eq!(rec.labels().len(), 1);
        assert!(rec.labels()[0].handle().is_none());
        assert!(surface.labels.is_empty());

        let t4 = t0 + Duration::from_secs(4);
        rec.reconcile(positions.snapshot(), demographics.snapshot(), &mut surface, t4);
        assert_eq!(rec.labels().len(), 1);
        assert!(rec.labels()[0].handle().is_none());
        assert!(surface.labels.is_empty());
    }
}
