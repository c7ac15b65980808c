//! Schema-validated publisher and subscriber loops for mailbus.
//!
//! The publisher validates outgoing envelopes against the schema registry
//! before any transport call; the subscriber validates inbound messages
//! before any handler call. Between them sits the invariant the rest of the
//! pipeline leans on: an envelope that crossed the wire has passed validation
//! on both sides, and one bad message never stalls a consumption loop.

pub mod error;
pub mod publisher;
pub mod report;
pub mod subscriber;

pub use error::{PublishError, SubscriberValidationError};
pub use publisher::Publisher;
pub use report::{
    safe_handler, ErrorReporter, Handler, HandlerError, RecordingReporter, ReportContext,
    TracingReporter,
};
pub use subscriber::{Subscriber, SubscriberConfig, Subscription};
