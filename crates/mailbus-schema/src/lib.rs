//! JSON Schema registry and envelope validation for mailbus.
//!
//! Every event type has one active schema, loaded from a directory of
//! `<EventType>.schema.json` documents at construction time. Validation is
//! exhaustive — callers get every violation found in one pass, not just the
//! first — and never panics on a malformed schema document.

pub mod config;
pub mod error;
pub mod registry;
pub mod validator;
pub mod violation;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::{CompiledSchema, LoadReport, SchemaRegistry};
pub use validator::{validate_document, validate_envelope};
pub use violation::{ValidationReport, Violation};
