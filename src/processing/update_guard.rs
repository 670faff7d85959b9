use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Allows a single scheduled update at a time.
#[derive(Debug, Clone)]
pub struct UpdateGuard {
    update: Arc<Semaphore>,
}

impl Default for UpdateGuard {
    fn default() -> Self {
        Self {
            update: Arc::new(Semaphore::new(1)),
        }
    }
}

impl UpdateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_update(&self) -> Option<UpdateGuardPermit> {
        self.update
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| UpdateGuardPermit { _permit: permit })
    }
}

pub struct UpdateGuardPermit {
    _permit: OwnedSemaphorePermit,
}
