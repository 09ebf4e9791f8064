//! Concurrency limiter shared by all fetch tasks of one sync run

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::domain::DomainError;

/// Bounded pool of permits capping simultaneous in-flight rating requests
///
/// Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a permit; it is returned to the pool when dropped
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, DomainError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| DomainError::internal("Concurrency limiter closed unexpectedly"))
    }
}
