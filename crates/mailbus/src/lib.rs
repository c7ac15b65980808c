//! Schema-validated event messaging for mailing-list archive pipelines.
//!
//! mailbus is the messaging core shared by the pipeline's services: envelope
//! and schema validation, publish/subscribe over pluggable transport drivers,
//! and a bounded-backoff retry primitive for transient failures and
//! read-after-write races.
//!
//! # Crate Structure
//!
//! - [`envelope`] — The wire envelope type, JSON codec, well-known event names
//! - [`schema`] — Schema registry and exhaustive envelope validation
//! - [`retry`] — Bounded exponential-backoff retry primitive
//! - [`transport`] — Transport driver abstraction and built-in backends
//! - [`pubsub`] — Publisher and subscriber loops over the above

/// Re-export envelope types.
pub mod envelope {
    pub use mailbus_envelope::*;
}

/// Re-export schema registry and validation types.
pub mod schema {
    pub use mailbus_schema::*;
}

/// Re-export the retry primitive.
pub mod retry {
    pub use mailbus_retry::*;
}

/// Re-export transport types.
pub mod transport {
    pub use mailbus_transport::*;
}

/// Re-export publisher/subscriber types.
pub mod pubsub {
    pub use mailbus_pubsub::*;
}
