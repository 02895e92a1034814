use std::{future::Future, time::Duration};

use tracing::debug;

use crate::error::{ClipcheckError, Result};

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until a terminal state or an error
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// Call `fetch` until `is_terminal` accepts its value, sleeping
/// `policy.interval` between attempts. Errors from `fetch` end the loop.
///
/// `fetch` receives the 1-based attempt number.
pub async fn poll_until<T, F, Fut, P>(policy: PollPolicy, mut fetch: F, is_terminal: P) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let value = fetch(attempt).await?;
        if is_terminal(&value) {
            return Ok(value);
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            return Err(ClipcheckError::PollExhausted { attempts: attempt });
        }

        debug!(attempt, interval = ?policy.interval, "not ready, polling again");
        tokio::time::sleep(policy.interval).await;
    }
}
