use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::{RawMessage, TransportDriver};

/// Driver that accepts everything and delivers nothing.
///
/// Useful for publisher-only deployments where events are intentionally
/// discarded, and for tests that only care that a send happened.
#[derive(Debug, Default)]
pub struct NoopTransport {
    connected: bool,
    sent: u64,
}

impl NoopTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many messages have been discarded so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl TransportDriver for NoopTransport {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn send(&mut self, _raw: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.sent += 1;
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        // Nothing will ever arrive; honor the bounded wait contract.
        std::thread::sleep(timeout);
        Ok(None)
    }

    fn ack(&mut self, message: &RawMessage) -> Result<()> {
        Err(TransportError::UnknownDelivery(message.delivery_tag))
    }

    fn reject(&mut self, message: &RawMessage) -> Result<()> {
        Err(TransportError::UnknownDelivery(message.delivery_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_discarded_sends() {
        let mut driver = NoopTransport::new();
        driver.connect().expect("connect should succeed");

        driver.send(b"a").expect("send should succeed");
        driver.send(b"b").expect("send should succeed");
        assert_eq!(driver.sent(), 2);
    }

    #[test]
    fn never_delivers() {
        let mut driver = NoopTransport::new();
        driver.connect().expect("connect should succeed");

        let received = driver
            .receive(Duration::from_millis(5))
            .expect("receive should not error");
        assert!(received.is_none());
    }
}
