//! Mutual exclusion between tasks.

use core::ops::Deref;

use tandem_hal::{BinarySemaphore, Timeout};

/// Blocking mutual exclusion between tasks
///
/// Built on a kernel binary semaphore that starts out given. Not usable from
/// interrupt context.
pub struct TaskLock<S> {
    semaphore: S,
}

/// Held [`TaskLock`]; releases on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct TaskLockGuard<'a, S: BinarySemaphore> {
    lock: &'a TaskLock<S>,
}

impl<S: BinarySemaphore> TaskLock<S> {
    pub fn new() -> Self {
        let semaphore = S::default();
        semaphore.give();
        Self { semaphore }
    }

    /// Block until the lock is free
    pub fn lock(&self) -> TaskLockGuard<'_, S> {
        while !self.semaphore.take(Timeout::Forever) {}
        TaskLockGuard { lock: self }
    }

    /// Block for at most `timeout`
    pub fn try_lock(&self, timeout: Timeout) -> Option<TaskLockGuard<'_, S>> {
        self.semaphore
            .take(timeout)
            .then(|| TaskLockGuard { lock: self })
    }
}

impl<S: BinarySemaphore> Default for TaskLock<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BinarySemaphore> Drop for TaskLockGuard<'_, S> {
    fn drop(&mut self) {
        self.lock.semaphore.give();
    }
}

/// A value shared between tasks, reachable only while holding its lock
///
/// For drivers that several tasks use for multi-step work (a scan, a
/// write-then-read) that must not interleave. Only shared access is handed
/// out; the drivers themselves take `&self`.
pub struct TaskMutex<S, T> {
    lock: TaskLock<S>,
    value: T,
}

/// Held [`TaskMutex`]; releases on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct TaskMutexGuard<'a, S: BinarySemaphore, T> {
    _held: TaskLockGuard<'a, S>,
    value: &'a T,
}

impl<S: BinarySemaphore, T> TaskMutex<S, T> {
    pub fn new(value: T) -> Self {
        Self {
            lock: TaskLock::new(),
            value,
        }
    }

    /// Block until no other task holds the value
    pub fn lock(&self) -> TaskMutexGuard<'_, S, T> {
        TaskMutexGuard {
            _held: self.lock.lock(),
            value: &self.value,
        }
    }

    /// Block for at most `timeout`
    pub fn try_lock(&self, timeout: Timeout) -> Option<TaskMutexGuard<'_, S, T>> {
        let held = self.lock.try_lock(timeout)?;
        Some(TaskMutexGuard {
            _held: held,
            value: &self.value,
        })
    }
}

impl<S: BinarySemaphore, T> Deref for TaskMutexGuard<'_, S, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_hal_host::HostSemaphore;

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let lock: TaskLock<HostSemaphore> = TaskLock::new();
        let guard = lock.lock();
        assert!(lock.try_lock(Timeout::NONE).is_none());
        drop(guard);
        assert!(lock.try_lock(Timeout::NONE).is_some());
    }

    #[test]
    fn test_task_mutex_serializes_multi_step_work() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use std::thread;
        use std::time::Duration;

        // Two steps that must not interleave: read, pause, write back.
        let shared: Arc<TaskMutex<HostSemaphore, AtomicUsize>> =
            Arc::new(TaskMutex::new(AtomicUsize::new(0)));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let counter = shared.lock();
                        let seen = counter.load(Ordering::SeqCst);
                        thread::sleep(Duration::from_micros(50));
                        counter.store(seen + 1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(shared.lock().load(Ordering::SeqCst), 40);
        let held = shared.lock();
        assert!(shared.try_lock(Timeout::NONE).is_none());
        drop(held);
        assert!(shared.try_lock(Timeout::NONE).is_some());
    }
}
