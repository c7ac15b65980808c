use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// One delivered wire message, identified for ack/reject by its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Broker-assigned tag for this delivery.
    pub delivery_tag: u64,
    /// The wire payload as received.
    pub payload: Bytes,
}

/// Capability surface every transport backend implements.
///
/// A driver value is one connection. Connections are not safe for concurrent
/// use: each is owned by a single publisher or a single subscriber loop. The
/// trait is `Send` (a loop may run on its own thread) but deliberately not
/// `Sync`.
pub trait TransportDriver: Send {
    /// Establish the connection. Must be called before any other operation.
    fn connect(&mut self) -> Result<()>;

    /// Release the connection. Idempotent.
    fn disconnect(&mut self) -> Result<()>;

    /// Write one wire message.
    fn send(&mut self, raw: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for the next message.
    ///
    /// `Ok(None)` means the wait elapsed with nothing delivered — callers use
    /// the bounded wait to re-check shutdown flags without busy-polling.
    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>>;

    /// Confirm a delivery; it will not be redelivered on this connection.
    fn ack(&mut self, message: &RawMessage) -> Result<()>;

    /// Refuse a delivery; the backend may redeliver per its at-least-once
    /// policy.
    fn reject(&mut self, message: &RawMessage) -> Result<()>;
}
