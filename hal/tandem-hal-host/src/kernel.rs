//! Kernel services on std threads

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tandem_hal::{BinarySemaphore, SpawnError, TaskParams, TaskSpawner, Timeout};

/// Smallest stack handed to a host thread
///
/// Embedded stack sizes are far too small for std formatting machinery.
pub const MIN_HOST_STACK: usize = 256 * 1024;

/// Binary semaphore built on a mutex-protected flag and a condition variable
#[derive(Debug, Default)]
pub struct HostSemaphore {
    given: Mutex<bool>,
    condvar: Condvar,
}

impl HostSemaphore {
    pub const fn new() -> Self {
        Self {
            given: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }
}

impl BinarySemaphore for HostSemaphore {
    fn give(&self) {
        let mut given = self.given.lock().unwrap_or_else(PoisonError::into_inner);
        *given = true;
        self.condvar.notify_one();
    }

    fn take(&self, timeout: Timeout) -> bool {
        let mut given = self.given.lock().unwrap_or_else(PoisonError::into_inner);
        match timeout {
            Timeout::Forever => {
                while !*given {
                    given = self
                        .condvar
                        .wait(given)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
            Timeout::Millis(ms) => {
                let deadline = Instant::now() + Duration::from_millis(u64::from(ms));
                while !*given {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    given = self
                        .condvar
                        .wait_timeout(given, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        *given = false;
        true
    }
}

/// Spawns each task on its own named std thread
///
/// An optional capacity limits how many tasks may be created, so callers can
/// exercise the out-of-memory path.
#[derive(Debug)]
pub struct ThreadSpawner {
    remaining: Option<AtomicUsize>,
}

impl ThreadSpawner {
    /// Spawner without a task limit
    pub const fn new() -> Self {
        Self { remaining: None }
    }

    /// Spawner that refuses to create more than `tasks` tasks
    pub const fn with_capacity(tasks: usize) -> Self {
        Self {
            remaining: Some(AtomicUsize::new(tasks)),
        }
    }

    fn reserve(&self) -> Result<(), SpawnError> {
        match &self.remaining {
            None => Ok(()),
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .map(|_| ())
                .map_err(|_| SpawnError::OutOfMemory),
        }
    }
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSpawner for ThreadSpawner {
    fn spawn<A: Sync + 'static>(
        &self,
        params: &TaskParams<'_>,
        entry: fn(&'static A) -> !,
        arg: &'static A,
    ) -> Result<(), SpawnError> {
        if params.stack_size == 0 {
            return Err(SpawnError::InvalidParams);
        }
        self.reserve()?;

        thread::Builder::new()
            .name(params.name.to_owned())
            .stack_size(params.stack_size.max(MIN_HOST_STACK))
            .spawn(move || {
                entry(arg);
            })
            .map(|_| ())
            .map_err(|_| SpawnError::OutOfMemory)
    }
}
