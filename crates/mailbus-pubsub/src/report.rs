//! Error-reporting collaborator and the safe-handler wrapper.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use mailbus_envelope::Envelope;

/// Key-value context attached to a report (event type, ids, delivery tags).
pub type ReportContext = BTreeMap<String, String>;

/// A handler error the subscriber treats as opaque.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A subscription handler. Errors are caught at the loop boundary, reported,
/// and never crash the loop.
pub type Handler = Box<dyn FnMut(Envelope) -> Result<(), HandlerError> + Send>;

/// Sink for poison messages and handler failures.
///
/// Implementations must swallow their own failures — nothing a reporter does
/// may propagate back into the consumption loop.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &str, context: &ReportContext);
}

/// Default reporter: structured error logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &str, context: &ReportContext) {
        tracing::error!(error, ?context, "subscriber error reported");
    }
}

/// Reporter that records every report; a test double, also handy for
/// draining reports into assertions from integration code.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<(String, ReportContext)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(String, ReportContext)> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &str, context: &ReportContext) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((error.to_string(), context.clone()));
    }
}

/// Wrap `handler` so that any failure — an `Err` or a panic — is reported
/// with the offending envelope as context instead of propagating.
///
/// The returned closure reports `true` on success; the caller decides whether
/// a failed invocation acks or rejects the delivery. The wrapping is explicit
/// at the call site rather than injected, so the catch/report contract is
/// visible wherever a handler is installed.
pub fn safe_handler(
    mut handler: Handler,
    reporter: Arc<dyn ErrorReporter>,
) -> impl FnMut(&Envelope) -> bool + Send {
    move |envelope| {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| handler(envelope.clone())));
        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                reporter.report(
                    &format!("handler failed: {err}"),
                    &envelope_context(envelope),
                );
                false
            }
            Err(panic) => {
                reporter.report(
                    &format!("handler panicked: {}", panic_message(&panic)),
                    &envelope_context(envelope),
                );
                false
            }
        }
    }
}

/// Standard report context for an envelope.
pub(crate) fn envelope_context(envelope: &Envelope) -> ReportContext {
    let mut context = ReportContext::new();
    context.insert("event_type".to_string(), envelope.event_type.clone());
    context.insert("event_id".to_string(), envelope.event_id.clone());
    context.insert(
        "schema_version".to_string(),
        envelope.schema_version.clone(),
    );
    context
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
