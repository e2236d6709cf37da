//! Waiting for the next matching event.
//!
//! Every wait takes ownership of a freshly subscribed `broadcast::Receiver`
//! and drops it when the wait ends, so the subscription is released on
//! success, on timeout and when the caller's future is dropped. Subscribe
//! before performing the action whose effect you want to observe.

use log::debug;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Duration, Instant};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("no matching event within {0:?}")]
    Timeout(Duration),

    #[error("event source closed")]
    Closed,

    /// The receiver fell behind and `{0}` events were discarded unseen. One
    /// of them may have been the one the caller was waiting for.
    #[error("missed {0} events")]
    Lagged(u64),
}

/// Wait for the first event accepted by `check`, skipping the rest.
///
/// `timeout` of `None` waits indefinitely. Falling behind the sender ends the
/// wait with [`WaitError::Lagged`]; the caller decides from current state
/// whether what it waited for has already happened.
pub async fn once_with_cleanup<T, F>(
    rx: broadcast::Receiver<T>,
    timeout: Option<Duration>,
    check: F,
) -> Result<T, WaitError>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, next_matching(rx, check))
            .await
            .map_err(|_| WaitError::Timeout(limit))?,
        None => next_matching(rx, check).await,
    }
}

/// Same as [`once_with_cleanup`] with an absolute deadline.
pub async fn once_until<T, F>(
    rx: broadcast::Receiver<T>,
    deadline: Instant,
    check: F,
) -> Result<T, WaitError>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let limit = deadline.saturating_duration_since(Instant::now());
    tokio::time::timeout_at(deadline, next_matching(rx, check))
        .await
        .map_err(|_| WaitError::Timeout(limit))?
}

/// Next event of any kind, no timeout.
///
/// A lagged receiver still proves that events happened, so the lag itself
/// counts as an occurrence and `None` is returned in place of the lost value.
pub async fn once<T: Clone>(mut rx: broadcast::Receiver<T>) -> Result<Option<T>, WaitError> {
    match rx.recv().await {
        Ok(value) => Ok(Some(value)),
        Err(RecvError::Lagged(skipped)) => {
            debug!("event wait lagged by {} events", skipped);
            Ok(None)
        }
        Err(RecvError::Closed) => Err(WaitError::Closed),
    }
}

async fn next_matching<T, F>(mut rx: broadcast::Receiver<T>, mut check: F) -> Result<T, WaitError>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    loop {
        match rx.recv().await {
            Ok(value) if check(&value) => return Ok(value),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                debug!("event wait lagged by {} events", skipped);
                return Err(WaitError::Lagged(skipped));
            }
            Err(RecvError::Closed) => return Err(WaitError::Closed),
        }
    }
}
