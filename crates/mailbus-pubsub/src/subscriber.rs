use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use mailbus_envelope::Envelope;
use mailbus_schema::{validate_envelope, SchemaRegistry};
use mailbus_transport::{RawMessage, TransportDriver, TransportError};

use crate::error::SubscriberValidationError;
use crate::report::{safe_handler, ErrorReporter, Handler, ReportContext};

/// Behavior knobs for a subscriber's consumption loop.
#[derive(Debug, Clone, Copy)]
pub struct SubscriberConfig {
    /// Bounded wait per receive; the stop flag is re-checked between waits.
    pub receive_timeout: Duration,
    /// Pause before reconnecting after a receive failure.
    pub reconnect_delay: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(200),
            reconnect_delay: Duration::from_millis(500),
        }
    }
}

/// Builds validated consumption loops over transport connections.
///
/// Each subscription runs on its own thread and owns its own driver
/// connection; the registry and the error reporter are the only shared
/// state, and both are read-only from the loop's perspective.
pub struct Subscriber {
    registry: Arc<SchemaRegistry>,
    reporter: Arc<dyn ErrorReporter>,
    config: SubscriberConfig,
}

impl Subscriber {
    pub fn new(registry: Arc<SchemaRegistry>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self::with_config(registry, reporter, SubscriberConfig::default())
    }

    pub fn with_config(
        registry: Arc<SchemaRegistry>,
        reporter: Arc<dyn ErrorReporter>,
        config: SubscriberConfig,
    ) -> Self {
        Self {
            registry,
            reporter,
            config,
        }
    }

    /// Start consuming `event_type` messages from `driver`, dispatching each
    /// validated envelope to `handler`.
    ///
    /// The handler is wrapped by [`safe_handler`]: its failures and panics
    /// are reported and never crash the loop. Messages that fail to decode
    /// or validate are isolated as poison — reported once, acknowledged, and
    /// skipped. Messages for other event types on the same connection are
    /// acknowledged silently.
    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        mut driver: Box<dyn TransportDriver>,
        handler: Handler,
    ) -> Result<Subscription, TransportError> {
        let event_type = event_type.into();
        driver.connect()?;

        let stop = Arc::new(AtomicBool::new(false));
        let handle_safely = safe_handler(handler, self.reporter.clone());

        let loop_stop = stop.clone();
        let registry = self.registry.clone();
        let reporter = self.reporter.clone();
        let config = self.config;
        let loop_event_type = event_type.clone();
        let thread = std::thread::spawn(move || {
            run_loop(
                driver,
                loop_event_type,
                registry,
                handle_safely,
                reporter,
                loop_stop,
                config,
            );
        });

        Ok(Subscription {
            event_type,
            stop,
            thread: Some(thread),
        })
    }
}

/// Handle to one running consumption loop.
pub struct Subscription {
    event_type: String,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Subscription {
    /// The event type this subscription consumes.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Stop the loop cooperatively: no new messages are accepted, the
    /// in-flight handler invocation completes, then the transport connection
    /// is released.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!(event_type = %self.event_type, "consumer thread panicked");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn run_loop(
    mut driver: Box<dyn TransportDriver>,
    event_type: String,
    registry: Arc<SchemaRegistry>,
    mut handle_safely: impl FnMut(&Envelope) -> bool,
    reporter: Arc<dyn ErrorReporter>,
    stop: Arc<AtomicBool>,
    config: SubscriberConfig,
) {
    tracing::debug!(event_type, "consumer loop started");

    while !stop.load(Ordering::SeqCst) {
        let message = match driver.receive(config.receive_timeout) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(TransportError::Shutdown) => {
                tracing::info!(event_type, "transport shut down, stopping consumer");
                break;
            }
            Err(err) => {
                tracing::warn!(event_type, error = %err, "receive failed, reconnecting");
                std::thread::sleep(config.reconnect_delay);
                if let Err(err) = driver.connect() {
                    tracing::warn!(event_type, error = %err, "reconnect failed");
                }
                continue;
            }
        };

        let envelope = match decode_and_validate(&message, &event_type, &registry) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                // Another event type sharing this connection; not ours.
                acknowledge(driver.as_mut(), &message, &event_type);
                continue;
            }
            Err(poison) => {
                let mut context = ReportContext::new();
                context.insert("subscription".to_string(), event_type.clone());
                context.insert(
                    "delivery_tag".to_string(),
                    message.delivery_tag.to_string(),
                );
                reporter.report(&poison.to_string(), &context);
                // Poison is discarded, never redelivered.
                acknowledge(driver.as_mut(), &message, &event_type);
                continue;
            }
        };

        if handle_safely(&envelope) {
            acknowledge(driver.as_mut(), &message, &event_type);
        } else {
            // At-least-once: the broker may redeliver; handlers are assumed
            // idempotent.
            if let Err(err) = driver.reject(&message) {
                tracing::warn!(event_type, error = %err, "reject failed");
            }
        }
    }

    if let Err(err) = driver.disconnect() {
        tracing::warn!(event_type, error = %err, "disconnect failed");
    }
    tracing::debug!(event_type, "consumer loop stopped");
}

fn acknowledge(driver: &mut dyn TransportDriver, message: &RawMessage, event_type: &str) {
    if let Err(err) = driver.ack(message) {
        tracing::warn!(event_type, error = %err, "ack failed");
    }
}

/// Decode and validate one raw message for `subscription`.
///
/// `Ok(None)` means the message is a valid envelope for a different event
/// type. `Err` is a poison classification.
fn decode_and_validate(
    message: &RawMessage,
    subscription: &str,
    registry: &SchemaRegistry,
) -> Result<Option<Envelope>, SubscriberValidationError> {
    let envelope = mailbus_envelope::decode(&message.payload)?;

    if envelope.event_type != subscription {
        return Ok(None);
    }

    let schema = registry
        .get(&envelope.event_type)
        .ok_or_else(|| SubscriberValidationError::UnknownEventType(envelope.event_type.clone()))?;

    let report = validate_envelope(&envelope, &schema);
    if report.is_valid() {
        Ok(Some(envelope))
    } else {
        Err(SubscriberValidationError::Violations {
            event_type: envelope.event_type.clone(),
            violations: report.into_violations(),
        })
    }
}
