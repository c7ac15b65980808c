use mailbus_envelope::EnvelopeError;
use mailbus_schema::Violation;
use mailbus_transport::TransportError;

/// Errors surfaced to callers of [`crate::Publisher::publish`].
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The payload or envelope failed schema checks, or the event type is
    /// unknown. Never retried; zero wire writes occurred.
    #[error("validation failed for {event_type}: {}", join_violations(violations))]
    Validation {
        event_type: String,
        violations: Vec<Violation>,
    },

    /// The envelope could not be serialized for the wire.
    #[error("envelope encoding failed: {0}")]
    Encode(#[from] EnvelopeError),

    /// A terminal (non-transient) transport failure.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Transient transport failures consumed the whole retry budget.
    #[error("transport retries exhausted after {attempts} attempts, last error: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: TransportError,
    },

    /// The publish was cancelled (shutdown) mid-retry; distinct from both
    /// exhaustion and a transport-side shutdown.
    #[error("publish cancelled during attempt {attempt}")]
    Cancelled { attempt: u32 },
}

/// Why an inbound message was isolated as poison.
///
/// Caught at the subscriber loop boundary and reported; never surfaced to the
/// handler or the service's caller.
#[derive(Debug, thiserror::Error)]
pub enum SubscriberValidationError {
    /// The raw message is not a well-formed wire envelope.
    #[error("malformed message: {0}")]
    Malformed(#[from] EnvelopeError),

    /// The envelope declares an event type with no registered schema.
    #[error("unknown event type {0:?}")]
    UnknownEventType(String),

    /// The envelope failed validation against its event type's schema.
    #[error("schema violations for {event_type}: {}", join_violations(violations))]
    Violations {
        event_type: String,
        violations: Vec<Violation>,
    },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
