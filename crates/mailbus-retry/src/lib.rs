//! Bounded exponential-backoff retry primitive for mailbus.
//!
//! Wraps any operation whose success depends on not-yet-visible external
//! state: a transient transport failure, or the read-after-write race where
//! an event arrives before the document it references is visible in the
//! store. Each invocation owns its own attempt state — nothing is shared or
//! persisted between calls.

pub mod error;
pub mod policy;
pub mod runner;

pub use error::{Outcome, RetryError};
pub use policy::RetryPolicy;
pub use runner::{run, run_with, CancelFlag, Sleeper, ThreadSleeper};
