/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The wire document is not a valid envelope (bad JSON, missing or
    /// unknown top-level fields, unparseable timestamp).
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The message exceeds the configured maximum size.
    #[error("message too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
