//! Inbound message classification and routing.
//!
//! Raw text frames are parsed as JSON, classified by their `message_type`
//! field, and routed into the position or demographic store. A parse
//! failure is logged and discarded; it never propagates outward or stops
//! the ingestion loop.

use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::VizConfig;
use crate::scale::LinearScale;
use crate::store::{DemographicData, ExpiringStore, Gender, PersonId, PositionData, RecordId};

/// Raw coordinates as they arrive on the wire, in real-world units.
#[derive(Debug, Deserialize)]
struct WirePosition {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "message_type")]
enum InboundMessage {
    #[serde(rename = "realtime_person_position")]
    PersonPosition {
        person_id: i64,
        #[serde(default)]
        position: Option<WirePosition>,
    },
    #[serde(rename = "realtime_demographics")]
    Demographics {
        person_id: i64,
        gender: u8,
        age: u32,
    },
    #[serde(other)]
    Other,
}

/// Which store an ingested record landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Position store
    Position,
    /// Demographic store
    Demographic,
}

/// Identifies one scheduled record expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryKey {
    /// Store the record lives in
    pub kind: RecordKind,
    /// Exact record targeted; firing after replacement is a no-op
    pub id: RecordId,
}

/// Result of a successfully routed message.
#[derive(Debug, Clone, Copy)]
pub struct IngestedRecord {
    /// Store the record landed in
    pub kind: RecordKind,
    /// Fresh record id
    pub id: RecordId,
}

impl IngestedRecord {
    /// The expiry key for this record.
    pub fn expiry_key(&self) -> ExpiryKey {
        ExpiryKey {
            kind: self.kind,
            id: self.id,
        }
    }
}

/// Routes stream messages into the entity stores.
#[derive(Debug)]
pub struct Dispatcher {
    x_scale: LinearScale,
    y_scale: LinearScale,
    palette: Vec<String>,
    positions: ExpiringStore<PositionData>,
    demographics: ExpiringStore<DemographicData>,
}

impl Dispatcher {
    /// Create a dispatcher with scales and palette taken from the config.
    pub fn new(config: &VizConfig) -> Self {
        Self {
            x_scale: LinearScale::new(
                (config.domain_min, config.domain_max),
                (0.0, config.canvas_width),
            ),
            y_scale: LinearScale::new(
                (config.domain_min, config.domain_max),
                (0.0, config.canvas_height),
            ),
            palette: config.palette.clone(),
            positions: ExpiringStore::new(),
            demographics: ExpiringStore::new(),
        }
    }

    /// Classify and route one raw stream message.
    ///
    /// Returns the ingested record so the caller can schedule its expiry,
    /// or `None` when the message was discarded or ignored.
    pub fn dispatch(&mut self, raw: &str, now: Instant) -> Option<IngestedRecord> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "failed parsing incoming stream message as JSON, discarding");
                return None;
            }
        };

        if value.get("message_type").is_none() {
            debug!(message = raw, "ignoring message without a type");
            return None;
        }

        match serde_json::from_value::<InboundMessage>(value) {
            Ok(InboundMessage::PersonPosition { person_id, position }) => {
                let Some(wire) = position else {
                    warn!(person_id, "position message without coordinates, discarding");
                    return None;
                };
                let person = PersonId::new(person_id);
                let data = PositionData {
                    x: self.x_scale.scale(wire.x),
                    y: self.y_scale.scale(wire.y),
                    color: self.color_for(person),
                };
                let id = self.positions.upsert(person, data, now);
                Some(IngestedRecord {
                    kind: RecordKind::Position,
                    id,
                })
            }
            Ok(InboundMessage::Demographics {
                person_id,
                gender,
                age,
            }) => {
                let data = DemographicData {
                    gender: Gender::from(gender),
                    age,
                };
                let id = self.demographics.upsert(PersonId::new(person_id), data, now);
                Some(IngestedRecord {
                    kind: RecordKind::Demographic,
                    id,
                })
            }
            Ok(InboundMessage::Other) => {
                debug!(message = raw, "ignoring message with other type");
                None
            }
            Err(error) => {
                warn!(%error, "recognized message type with malformed payload, discarding");
                None
            }
        }
    }

    /// Apply a fired expiry. Stale keys remove nothing.
    pub fn expire(&mut self, key: ExpiryKey) -> bool {
        match key.kind {
            RecordKind::Position => self.positions.expire(key.id),
            RecordKind::Demographic => self.demographics.expire(key.id),
        }
    }

    /// The position store.
    pub fn positions(&self) -> &ExpiringStore<PositionData> {
        &self.positions
    }

    /// The demographic store.
    pub fn demographics(&self) -> &ExpiringStore<DemographicData> {
        &self.demographics
    }

    /// Cyclic palette assignment by person id.
    fn color_for(&self, person: PersonId) -> String {
        let index = person.as_i64().rem_euclid(self.palette.len() as i64) as usize;
        self.palette[index].clone()
    }
}
