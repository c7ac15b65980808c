use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Outcome, RetryError};
use crate::policy::RetryPolicy;

/// Suspends the caller between attempts. Injectable so tests can record the
/// computed delays instead of sleeping through them.
pub trait Sleeper {
    fn sleep(&mut self, delay: std::time::Duration);
}

/// Production sleeper: blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: std::time::Duration) {
        std::thread::sleep(delay);
    }
}

/// Shared cancellation signal for a retry loop.
///
/// Cancellation is observed before each attempt and before each backoff
/// sleep; a sleep already in progress runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the loop to stop at its next check point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run `op` under `policy`, sleeping on the current thread between attempts.
///
/// `op` receives the 1-based attempt number and classifies its own failures
/// via [`Outcome`]. Success at any attempt returns immediately; a fatal
/// failure aborts without consuming budget; after `max_attempts` transient
/// failures the loop fails with [`RetryError::Exhausted`] naming the last
/// underlying error.
pub fn run<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    E: std::fmt::Debug + std::fmt::Display,
    F: FnMut(u32) -> Result<T, Outcome<E>>,
{
    run_with(policy, &mut ThreadSleeper, &CancelFlag::new(), op)
}

/// [`run`] with an explicit sleeper and cancellation flag.
pub fn run_with<T, E, F, S>(
    policy: &RetryPolicy,
    sleeper: &mut S,
    cancel: &CancelFlag,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::fmt::Debug + std::fmt::Display,
    F: FnMut(u32) -> Result<T, Outcome<E>>,
    S: Sleeper,
{
    let max_attempts = policy.max_attempts.max(1);
    let seed = clock_seed();
    let mut attempt = 1u32;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempt });
        }

        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(Outcome::Fatal(err)) => return Err(RetryError::Fatal(err)),
            Err(Outcome::Transient(err)) => {
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }

                if cancel.is_cancelled() {
                    return Err(RetryError::Cancelled { attempt });
                }

                let delay = policy.sleep_delay(attempt, seed);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off"
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() as u64 ^ elapsed.as_secs())
        .unwrap_or(0)
}
