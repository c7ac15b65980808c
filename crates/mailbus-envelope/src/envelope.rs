use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Schema snapshot identifier stamped on envelopes built by this crate.
///
/// One active schema per event type; this names the snapshot that validated
/// the payload at publish time.
pub const SCHEMA_VERSION: &str = "1";

/// The validated wire unit carrying event metadata and payload.
///
/// `deny_unknown_fields` enforces the closed top-level policy: a wire document
/// with fields beyond these five fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Event type name; selects the schema the payload was validated against.
    pub event_type: String,
    /// Unique id, assigned at publish time, immutable.
    pub event_id: String,
    /// Creation time (RFC 3339, UTC). Ordering diagnostics only — transports
    /// may reorder.
    pub timestamp: DateTime<Utc>,
    /// Which schema snapshot validated this payload.
    pub schema_version: String,
    /// Event-specific document, shaped by the event type's schema.
    pub payload: Value,
}

impl Envelope {
    /// Build a new envelope for `payload`, assigning id and timestamp.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
            payload,
        }
    }
}
