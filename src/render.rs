//! Fixed-cadence marker projection onto the draw surface.
//!
//! Each tick diffs the position snapshot against the drawn marker set by
//! record id: new records gain a marker, orphaned markers are removed, and
//! surviving markers get position and color re-applied unconditionally
//! rather than change-detected.

use std::collections::HashSet;

use tracing::warn;

use crate::store::{PositionData, Record, RecordId};
use crate::surface::DrawSurface;

/// Projects position records onto the surface as circle markers.
#[derive(Debug)]
pub struct Renderer {
    radius: f64,
    drawn: HashSet<RecordId>,
}

impl Renderer {
    /// Create a renderer drawing markers of the given radius.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            drawn: HashSet::new(),
        }
    }

    /// Reconcile the surface's markers with the snapshot.
    ///
    /// A record with non-finite coordinates is skipped with a warning; one
    /// bad record never stops the tick. Idempotent: repeated calls with an
    /// unchanged snapshot leave the surface unchanged.
    pub fn draw<S: DrawSurface>(&mut self, positions: &[Record<PositionData>], surface: &mut S) {
        let mut live = HashSet::with_capacity(positions.len());

        for record in positions {
            let PositionData { x, y, ref color } = record.data;
            if !x.is_finite() || !y.is_finite() {
                warn!(record_id = %record.id, person_id = %record.person_id,
                    "skipping record with unusable coordinates");
                continue;
            }
            live.insert(record.id);
            surface.upsert_marker(record.id, x, y, self.radius, color);
        }

        for stale in self.drawn.difference(&live) {
            surface.remove_marker(*stale);
        }
        self.drawn = live;
    }

    /// Number of markers currently drawn.
    pub fn marker_count(&self) -> usize {
        self.drawn.len()
    }
}
