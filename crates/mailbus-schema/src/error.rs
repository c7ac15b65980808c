/// Errors that can occur while loading or compiling schemas.
///
/// Validation itself never errors — a bad candidate or a bad schema produces
/// an invalid [`crate::ValidationReport`], not an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema directory could not be read, or a load-time limit was
    /// breached.
    #[error("failed to load schemas: {0}")]
    LoadFailed(String),

    /// A schema document could not be compiled.
    #[error("failed to compile schema for {event_type}: {message}")]
    CompileFailed { event_type: String, message: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
