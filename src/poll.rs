use crate::error::{Result, VerifyError};
use crate::transport::{document_path, Transport};
use crate::types::DocumentSnapshot;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_ATTEMPTS: u32 = 30;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_attempts: u32,
    /// Fixed pause between attempts (no backoff).
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Shared cancel flag. Cancelling wakes a poller that is sleeping between attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, wake) = &*self.inner;
        if let Ok(mut cancelled) = flag.lock() {
            *cancelled = true;
        }
        wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        flag.lock().map(|c| *c).unwrap_or(true)
    }

    /// Sleeps up to `duration`; returns `true` if cancelled meanwhile.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = match flag.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = match wake.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(_) => return true,
            };
        }
        true
    }
}

/// Polls `GET /api/document/{id}` until extraction results are available.
pub struct PollClient<T: Transport> {
    transport: T,
}

impl<T: Transport> PollClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn attempt(&self, path: &str) -> Result<DocumentSnapshot> {
        let response = self.transport.get(path)?;
        if response.is_success() {
            return response.json();
        }
        if response.is_unauthorized() {
            return Err(VerifyError::Unauthorized);
        }
        Err(VerifyError::Transient(format!("HTTP {}", response.status)))
    }

    /// Up to `max_attempts` requests, `delay` apart. Unauthorized aborts at once
    /// (and signs out); any other failure is logged and retried.
    pub fn poll(
        &self,
        document_id: &str,
        options: PollOptions,
        cancel: &CancelToken,
    ) -> Result<DocumentSnapshot> {
        let path = document_path(document_id);
        for attempt in 1..=options.max_attempts {
            if cancel.is_cancelled() {
                return Err(VerifyError::Cancelled);
            }
            let outcome = self.attempt(&path);
            if cancel.is_cancelled() {
                log::debug!("Dropping response for {} after cancel", document_id);
                return Err(VerifyError::Cancelled);
            }
            match outcome {
                Ok(snapshot) => {
                    log::info!("Document {} ready after {} attempt(s)", document_id, attempt);
                    return Ok(snapshot);
                }
                Err(VerifyError::Unauthorized) => {
                    self.transport.sign_out();
                    return Err(VerifyError::Unauthorized);
                }
                Err(e) => log::warn!("Attempt {} failed: {}", attempt, e),
            }
            if attempt < options.max_attempts && cancel.sleep(options.delay) {
                return Err(VerifyError::Cancelled);
            }
        }
        log::error!("Attempt failed after max attempts ({})", options.max_attempts);
        Err(VerifyError::Timeout {
            attempts: options.max_attempts,
        })
    }
}
