//! Event envelope type and JSON wire codec for mailbus.
//!
//! Every message that crosses a transport is an [`Envelope`]: event metadata
//! (type, id, timestamp, schema version) wrapped around an event-specific JSON
//! payload. The wire format is a single JSON document with a closed top-level
//! field set — unknown fields are a decode error, not a silent pass-through.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod events;

pub use codec::{decode, encode, CodecConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use envelope::{Envelope, SCHEMA_VERSION};
pub use error::{EnvelopeError, Result};
pub use events::{
    well_known_event_types, ARCHIVE_INGESTED, EMBEDDINGS_GENERATED, MESSAGES_PARSED,
    SUMMARY_COMPLETED, SUMMARY_REQUESTED,
};
