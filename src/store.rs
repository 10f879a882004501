//! Bounded collection of time-stamped per-person records with
//! upsert-by-person and expiry-by-record-id.
//!
//! The store is instantiated twice, once for positions and once for
//! demographics. Expiry is arena-style: each scheduled expiry carries the
//! [`RecordId`] it targets, so a timer firing after its record was replaced
//! removes nothing.

use std::fmt;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Monotonic, process-local identifier assigned at ingestion.
///
/// Distinguishes records even when a person re-appears: a replacement gets a
/// fresh id, which is what makes stale expiry timers harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    /// The raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned identifier, stable per physical person while tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId(i64);

impl PersonId {
    /// Wrap a server-issued person id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw id value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Record payloads
// ---------------------------------------------------------------------------

/// Projected position of one visible person, in draw-surface pixels.
#[derive(Debug, Clone)]
pub struct PositionData {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
    /// Marker fill color, stable per person across frames
    pub color: String,
}

/// Reported gender of a tracked person.
///
/// Decoded leniently from the wire's integer encoding: `1` is male,
/// anything else is female.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    /// Wire value 1
    Male,
    /// Wire value 0 (and anything unrecognized)
    Female,
}

impl From<u8> for Gender {
    fn from(value: u8) -> Self {
        if value == 1 {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Demographic assertion for one person.
#[derive(Debug, Clone)]
pub struct DemographicData {
    /// Reported gender
    pub gender: Gender,
    /// Reported age in years
    pub age: u32,
}

// ---------------------------------------------------------------------------
// ExpiringStore
// ---------------------------------------------------------------------------

/// One stored event payload with its identity and ingestion time.
#[derive(Debug, Clone)]
pub struct Record<T> {
    /// Process-local record identity
    pub id: RecordId,
    /// The person this record describes
    pub person_id: PersonId,
    /// Ingestion timestamp
    pub created_at: Instant,
    /// Event payload
    pub data: T,
}

/// Self-pruning store holding at most one record per person.
#[derive(Debug)]
pub struct ExpiringStore<T> {
    records: Vec<Record<T>>,
    next_id: u64,
}

impl<T> ExpiringStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
        }
    }

    /// Insert a record for `person_id`, replacing any existing one.
    ///
    /// Returns the fresh [`RecordId`]; the caller is responsible for
    /// scheduling that id's expiry. The replaced record's pending expiry
    /// becomes a no-op because it targets the old id.
    pub fn upsert(&mut self, person_id: PersonId, data: T, now: Instant) -> RecordId {
        self.next_id += 1;
        let id = RecordId(self.next_id);

        self.records.retain(|r| r.person_id != person_id);
        self.records.push(Record {
            id,
            person_id,
            created_at: now,
            data,
        });
        id
    }

    /// Remove the record with this exact id, if still present.
    ///
    /// Returns whether anything was removed; `false` means the record was
    /// already replaced and the expiry is a no-op.
    pub fn expire(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Current records in insertion order.
    ///
    /// Point-in-time view; do not hold across the next mutation.
    pub fn snapshot(&self) -> &[Record<T>] {
        &self.records
    }

    /// Look up the live record for a person, if any.
    pub fn get(&self, person_id: PersonId) -> Option<&Record<T>> {
        self.records.iter().find(|r| r.person_id == person_id)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for ExpiringStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
