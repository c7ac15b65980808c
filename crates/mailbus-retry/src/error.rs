/// Classification of one failed attempt, decided by the wrapped operation.
///
/// Only `Transient` consumes retry budget; `Fatal` aborts the loop at once
/// (validation failures, permanent not-found).
#[derive(Debug)]
pub enum Outcome<E> {
    /// Worth retrying after a backoff delay.
    Transient(E),
    /// Retrying cannot help; fail immediately.
    Fatal(E),
}

/// Terminal result of a retry loop that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E>
where
    E: std::fmt::Debug + std::fmt::Display,
{
    /// The full attempt budget was consumed; carries the last failure.
    #[error("retries exhausted after {attempts} attempts, last error: {last}")]
    Exhausted { attempts: u32, last: E },

    /// The operation failed in a way retrying cannot fix.
    #[error("not retryable: {0}")]
    Fatal(E),

    /// The loop was cancelled (e.g. shutdown) before it could succeed.
    #[error("retry cancelled during attempt {attempt}")]
    Cancelled { attempt: u32 },
}

impl<E> RetryError<E>
where
    E: std::fmt::Debug + std::fmt::Display,
{
    /// The underlying failure, if the loop got far enough to record one.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Fatal(last) => Some(last),
            RetryError::Cancelled { .. } => None,
        }
    }
}
