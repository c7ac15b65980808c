use std::time::Duration;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The driver has not been connected, or was disconnected.
    #[error("driver is not connected")]
    NotConnected,

    /// The connection dropped mid-operation. Transient: worth retrying.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The operation did not complete in time. Transient: worth retrying.
    #[error("transport operation timed out after {0:?}")]
    Timeout(Duration),

    /// Ack or reject referenced a delivery that is not pending.
    #[error("delivery {0} is not pending on this connection")]
    UnknownDelivery(u64),

    /// No driver registered under the requested name.
    #[error("unknown transport driver {0:?}")]
    UnknownDriver(String),

    /// The backing broker has shut down; terminal for this connection.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// Whether a retry with backoff can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionLost(_) | TransportError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(TransportError::ConnectionLost("reset".into()).is_transient());
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!TransportError::NotConnected.is_transient());
        assert!(!TransportError::UnknownDriver("kafka".into()).is_transient());
        assert!(!TransportError::Shutdown.is_transient());
    }
}
