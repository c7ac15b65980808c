use bytes::Bytes;

use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};

/// Default maximum wire message size: 4 MiB.
///
/// Large enough for a summarized archive batch, small enough that a runaway
/// producer cannot exhaust a consumer's memory.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for the envelope codec.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum wire message size in bytes. Default: 4 MiB.
    pub max_message_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Encode an envelope into its wire form: one JSON document.
pub fn encode(envelope: &Envelope) -> Result<Bytes> {
    let raw = serde_json::to_vec(envelope)?;
    Ok(Bytes::from(raw))
}

/// Decode a wire message into an envelope.
///
/// Fails on oversized input, invalid JSON, missing or unknown top-level
/// fields, and unparseable timestamps. Callers treat any failure here as a
/// poison message.
pub fn decode(raw: &[u8]) -> Result<Envelope> {
    decode_with_config(raw, &CodecConfig::default())
}

/// Decode with an explicit size limit.
pub fn decode_with_config(raw: &[u8], config: &CodecConfig) -> Result<Envelope> {
    if raw.len() > config.max_message_size {
        return Err(EnvelopeError::TooLarge {
            size: raw.len(),
            max: config.max_message_size,
        });
    }
    Ok(serde_json::from_slice(raw)?)
}
