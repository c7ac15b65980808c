use std::sync::Arc;
use std::time::Duration;

use mailbus_envelope::Envelope;
use mailbus_retry::{CancelFlag, Outcome, RetryError, RetryPolicy, ThreadSleeper};
use mailbus_schema::{validate_envelope, SchemaRegistry, Violation};
use mailbus_transport::TransportDriver;
use serde_json::Value;

use crate::error::PublishError;

/// Default transport retry: a small bounded budget for transient failures.
fn default_transport_retry() -> RetryPolicy {
    RetryPolicy::new(3)
        .with_base_delay(Duration::from_millis(50))
        .with_max_delay(Duration::from_secs(1))
}

/// Validates outgoing events and hands them to a transport driver.
///
/// An envelope that leaves this publisher has passed validation against the
/// schema active at publish time; a validation failure produces zero wire
/// writes. The publisher owns its driver connection — one publisher, one
/// connection, called synchronously from the originating task.
pub struct Publisher {
    registry: Arc<SchemaRegistry>,
    driver: Box<dyn TransportDriver>,
    retry: RetryPolicy,
    cancel: CancelFlag,
}

impl Publisher {
    /// Connect `driver` and build a publisher over it.
    pub fn new(
        registry: Arc<SchemaRegistry>,
        mut driver: Box<dyn TransportDriver>,
    ) -> Result<Self, PublishError> {
        driver.connect()?;
        Ok(Self {
            registry,
            driver,
            retry: default_transport_retry(),
            cancel: CancelFlag::new(),
        })
    }

    /// Override the transport retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cancellation handle; cancelling aborts any in-progress send retry.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Wrap `payload` into an envelope for `event_type`, validate it, and
    /// send it.
    ///
    /// Exactly one wire write occurs on success; none on validation failure.
    pub fn publish(&mut self, event_type: &str, payload: Value) -> Result<Envelope, PublishError> {
        self.publish_envelope(Envelope::new(event_type, payload))
    }

    /// Validate and send a prebuilt envelope (re-emission tooling).
    pub fn publish_envelope(&mut self, envelope: Envelope) -> Result<Envelope, PublishError> {
        let Some(schema) = self.registry.get(&envelope.event_type) else {
            return Err(PublishError::Validation {
                event_type: envelope.event_type.clone(),
                violations: vec![Violation::new("$.event_type", "unknown event type")],
            });
        };

        let report = validate_envelope(&envelope, &schema);
        if !report.is_valid() {
            return Err(PublishError::Validation {
                event_type: envelope.event_type.clone(),
                violations: report.into_violations(),
            });
        }

        let raw = mailbus_envelope::encode(&envelope)?;
        self.send_with_retry(&raw)?;

        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            "event published"
        );
        Ok(envelope)
    }

    /// Release the transport connection.
    pub fn disconnect(&mut self) -> Result<(), PublishError> {
        self.driver.disconnect()?;
        Ok(())
    }

    fn send_with_retry(&mut self, raw: &[u8]) -> Result<(), PublishError> {
        let policy = self.retry;
        let cancel = self.cancel.clone();
        let driver = self.driver.as_mut();

        mailbus_retry::run_with(&policy, &mut ThreadSleeper, &cancel, |_attempt| {
            driver.send(raw).map_err(|err| {
                if err.is_transient() {
                    Outcome::Transient(err)
                } else {
                    Outcome::Fatal(err)
                }
            })
        })
        .map_err(|err| match err {
            RetryError::Exhausted { attempts, last } => {
                PublishError::RetriesExhausted { attempts, last }
            }
            RetryError::Fatal(last) => PublishError::Transport(last),
            RetryError::Cancelled { attempt } => PublishError::Cancelled { attempt },
        })
    }
}
