//! Draw-surface seam between the render state manager and whatever
//! actually draws (SVG, canvas, a terminal, a test recorder).
//!
//! The core controls every identifier: markers are keyed by the
//! [`RecordId`] of the position record they represent, labels by a
//! [`LabelHandle`] allocated by the reconciler. Surface operations are
//! infallible by contract; a surface that can fail must absorb the failure
//! itself.

use std::collections::HashMap;
use std::fmt;

use crate::store::RecordId;

/// Opaque handle to one drawn text label, allocated by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(pub(crate) u64);

impl fmt::Display for LabelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiver for the core's drawing side effects.
pub trait DrawSurface {
    /// Create or reposition the circle marker for a position record.
    fn upsert_marker(&mut self, id: RecordId, x: f64, y: f64, radius: f64, color: &str);

    /// Remove a marker. Removing an unknown id is a no-op.
    fn remove_marker(&mut self, id: RecordId);

    /// Create or update a text label.
    fn upsert_label(&mut self, id: LabelHandle, x: f64, y: f64, text: &str);

    /// Remove a label. The core releases each handle exactly once.
    fn remove_label(&mut self, id: LabelHandle);

    /// Draw one static grid line.
    fn grid_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
}

/// Surface that draws nothing, for headless operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl DrawSurface for NullSurface {
    fn upsert_marker(&mut self, _id: RecordId, _x: f64, _y: f64, _radius: f64, _color: &str) {}
    fn remove_marker(&mut self, _id: RecordId) {}
    fn upsert_label(&mut self, _id: LabelHandle, _x: f64, _y: f64, _text: &str) {}
    fn remove_label(&mut self, _id: LabelHandle) {}
    fn grid_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64) {}
}

/// One recorded marker.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnMarker {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
    /// Radius in pixels
    pub radius: f64,
    /// Fill color
    pub color: String,
}

/// One recorded label.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLabel {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
    /// Rendered text
    pub text: String,
}

/// In-memory surface keeping the full drawn state, inspectable from tests
/// and headless tooling.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Currently drawn markers by record id
    pub markers: HashMap<RecordId, DrawnMarker>,
    /// Currently drawn labels by handle
    pub labels: HashMap<LabelHandle, DrawnLabel>,
    /// Number of grid lines drawn
    pub grid_lines: usize,
    /// Every label handle ever released, in release order
    pub released_labels: Vec<LabelHandle>,
}

impl DrawSurface for RecordingSurface {
    fn upsert_marker(&mut self, id: RecordId, x: f64, y: f64, radius: f64, color: &str) {
        self.markers.insert(
            id,
            DrawnMarker {
                x,
                y,
                radius,
                color: color.to_string(),
            },
        );
    }

    fn remove_marker(&mut self, id: RecordId) {
        self.markers.remove(&id);
    }

    fn upsert_label(&mut self, id: LabelHandle, x: f64, y: f64, text: &str) {
        self.labels.insert(
            id,
            DrawnLabel {
                x,
                y,
                text: text.to_string(),
            },
        );
    }

    fn remove_label(&mut self, id: LabelHandle) {
        self.labels.remove(&id);
        self.released_labels.push(id);
    }

    fn grid_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64) {
        self.grid_lines += 1;
    }
}
