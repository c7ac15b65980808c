//! Pluggable transport driver abstraction for mailbus.
//!
//! Publishers and subscribers consume one uniform capability surface —
//! connect, disconnect, send, receive, ack, reject — and stay agnostic of the
//! backend behind it. Backends ship here as an in-process broker (tests,
//! single-binary deployments) and a no-op driver; broker- or cloud-queue
//! backed drivers register through the same [`DriverFactory`].

pub mod error;
pub mod factory;
pub mod memory;
pub mod noop;
pub mod traits;

pub use error::{Result, TransportError};
pub use factory::{DriverFactory, DriverRole};
pub use memory::{MemoryBroker, MemoryConfig, MemoryTransport};
pub use noop::NoopTransport;
pub use traits::{RawMessage, TransportDriver};
