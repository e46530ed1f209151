//! Sizing and deadline settings for the dispatcher.

use std::time::Duration;

use crate::{KvsError, Result};

/// default number of worker threads in the dispatcher pool
pub const DEFAULT_POOL_SIZE: usize = 10;
/// default number of units of work that may wait for a free worker
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
/// default time a caller waits for its unit of work before giving up
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Sizing and deadline settings for a [`Dispatcher`](crate::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// number of worker threads
    pub pool_size: usize,
    /// maximum number of queued (not yet running) units of work
    pub queue_capacity: usize,
    /// how long [`PendingResult::wait`](crate::PendingResult::wait) blocks; `None` waits forever
    pub call_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            pool_size: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }
}

impl DispatcherConfig {
    /// sets the number of worker threads
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// sets the capacity of the request queue
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// sets (or clears, with `None`) the per-call deadline
    pub fn call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// checks that the pool and the queue can hold at least one unit of work
    ///
    /// # Errors
    /// returns [`KvsError::Config`] if either size is zero
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(KvsError::Config("pool size must be greater than zero".to_owned()));
        }
        if self.queue_capacity == 0 {
            return Err(KvsError::Config(
                "queue capacity must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
