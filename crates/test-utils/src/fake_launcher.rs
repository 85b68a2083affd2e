use std::sync::{Arc, Mutex};

use runtrack::errors::{Result, RuntrackError};
use runtrack::exec::{LaunchBackend, LaunchRequest, LaunchSlot};

/// A fake launch backend that:
/// - records every dispatched `LaunchRequest` instead of starting a process
/// - optionally refuses reservations once `capacity` requests are recorded,
///   like a full launch queue.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<LaunchRequest>>>,
    capacity: Option<usize>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            launched: Arc::default(),
            capacity: Some(capacity),
        }
    }

    pub fn launched(&self) -> Vec<LaunchRequest> {
        self.launched.lock().unwrap().clone()
    }
}

struct FakeSlot {
    launched: Arc<Mutex<Vec<LaunchRequest>>>,
}

impl LaunchSlot for FakeSlot {
    fn dispatch(self: Box<Self>, request: LaunchRequest) {
        self.launched.lock().unwrap().push(request);
    }
}

impl LaunchBackend for FakeLauncher {
    fn reserve(&self) -> Result<Box<dyn LaunchSlot>> {
        if let Some(capacity) = self.capacity {
            if self.launched.lock().unwrap().len() >= capacity {
                return Err(RuntrackError::QueueFull(capacity));
            }
        }
        Ok(Box::new(FakeSlot {
            launched: Arc::clone(&self.launched),
        }))
    }
}
