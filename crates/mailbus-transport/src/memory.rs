//! In-process broker backend.
//!
//! A [`MemoryBroker`] fans every sent message out to each live subscriber
//! connection, each of which drains its own queue in delivery order. Rejected
//! deliveries are requeued up to a configured redelivery cap (at-least-once),
//! then dropped with a warning.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::{RawMessage, TransportDriver};

/// Behavior knobs for the in-process broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// How many times a rejected delivery is requeued before being dropped.
    pub max_redeliveries: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_redeliveries: 3 }
    }
}

#[derive(Debug)]
struct Delivery {
    tag: u64,
    payload: Bytes,
    redeliveries: u32,
}

struct BrokerShared {
    subscribers: Mutex<Vec<Sender<Delivery>>>,
    next_tag: AtomicU64,
    config: MemoryConfig,
}

/// Handle to an in-process broker; cheap to clone, hands out connections.
#[derive(Clone)]
pub struct MemoryBroker {
    shared: Arc<BrokerShared>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            shared: Arc::new(BrokerShared {
                subscribers: Mutex::new(Vec::new()),
                next_tag: AtomicU64::new(1),
                config,
            }),
        }
    }

    /// A send-only connection.
    pub fn publisher(&self) -> MemoryTransport {
        MemoryTransport {
            shared: self.shared.clone(),
            receiver: None,
            requeue: None,
            pending: HashMap::new(),
            connected: false,
        }
    }

    /// A receive connection with its own delivery queue. Every message sent
    /// through this broker after this call is copied into that queue.
    pub fn subscriber(&self) -> MemoryTransport {
        let (sender, receiver) = mpsc::channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender.clone());

        MemoryTransport {
            shared: self.shared.clone(),
            receiver: Some(receiver),
            requeue: Some(sender),
            pending: HashMap::new(),
            connected: false,
        }
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// One connection to a [`MemoryBroker`]; single-owner, not shared.
pub struct MemoryTransport {
    shared: Arc<BrokerShared>,
    receiver: Option<Receiver<Delivery>>,
    requeue: Option<Sender<Delivery>>,
    pending: HashMap<u64, Delivery>,
    connected: bool,
}

impl MemoryTransport {
    fn next_tag(&self) -> u64 {
        self.shared.next_tag.fetch_add(1, Ordering::Relaxed)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl TransportDriver for MemoryTransport {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            tracing::warn!(
                unacked = self.pending.len(),
                "disconnecting with unacknowledged deliveries"
            );
            self.pending.clear();
        }
        self.connected = false;
        // Dropping the receiver closes this queue; the broker prunes the dead
        // sender on its next fan-out.
        self.receiver = None;
        self.requeue = None;
        Ok(())
    }

    fn send(&mut self, raw: &[u8]) -> Result<()> {
        self.ensure_connected()?;

        let payload = Bytes::copy_from_slice(raw);
        let mut subscribers = self
            .shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|subscriber| {
            let delivery = Delivery {
                tag: self.shared.next_tag.fetch_add(1, Ordering::Relaxed),
                payload: payload.clone(),
                redeliveries: 0,
            };
            subscriber.send(delivery).is_ok()
        });

        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>> {
        self.ensure_connected()?;
        let receiver = self.receiver.as_ref().ok_or(TransportError::NotConnected)?;

        match receiver.recv_timeout(timeout) {
            Ok(delivery) => {
                let message = RawMessage {
                    delivery_tag: delivery.tag,
                    payload: delivery.payload.clone(),
                };
                self.pending.insert(delivery.tag, delivery);
                Ok(Some(message))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Shutdown),
        }
    }

    fn ack(&mut self, message: &RawMessage) -> Result<()> {
        self.ensure_connected()?;
        self.pending
            .remove(&message.delivery_tag)
            .map(|_| ())
            .ok_or(TransportError::UnknownDelivery(message.delivery_tag))
    }

    fn reject(&mut self, message: &RawMessage) -> Result<()> {
        self.ensure_connected()?;
        let delivery = self
            .pending
            .remove(&message.delivery_tag)
            .ok_or(TransportError::UnknownDelivery(message.delivery_tag))?;

        if delivery.redeliveries >= self.shared.config.max_redeliveries {
            tracing::warn!(
                delivery_tag = delivery.tag,
                redeliveries = delivery.redeliveries,
                "redelivery cap reached, dropping message"
            );
            return Ok(());
        }

        let requeue = self.requeue.as_ref().ok_or(TransportError::NotConnected)?;
        let requeued = Delivery {
            tag: self.next_tag(),
            payload: delivery.payload,
            redeliveries: delivery.redeliveries + 1,
        };
        requeue
            .send(requeued)
            .map_err(|_| TransportError::Shutdown)
    }
}
