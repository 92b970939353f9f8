//! Kernel services
//!
//! The only RTOS facilities the peripheral layer relies on: a binary
//! semaphore that an interrupt can give and a task can take with a timeout,
//! and a way to create tasks.

use core::fmt;

/// How long a task is willing to block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Give up after this many milliseconds (0 polls)
    Millis(u32),
    /// Block until released
    Forever,
}

impl Timeout {
    /// Do not block at all
    pub const NONE: Self = Timeout::Millis(0);

    /// Timeout in milliseconds
    pub const fn ms(ms: u32) -> Self {
        Timeout::Millis(ms)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Forever
    }
}

/// Binary semaphore provided by the kernel
///
/// Created empty. `give` saturates: giving an already given semaphore has no
/// further effect, so at most one `take` is satisfied per burst of gives.
pub trait BinarySemaphore: Default + Sync {
    /// Release the semaphore
    ///
    /// Must be callable from interrupt context: never blocks.
    fn give(&self);

    /// Take the semaphore, blocking the calling task for at most `timeout`
    ///
    /// Returns `true` if the semaphore was taken, `false` on timeout.
    /// Task context only.
    fn take(&self, timeout: Timeout) -> bool;
}

/// Scheduler priority (higher runs first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(pub u8);

/// Parameters for creating one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskParams<'a> {
    /// Task name, shown by kernel-aware debuggers
    pub name: &'a str,
    /// Stack size in bytes
    pub stack_size: usize,
    /// Scheduling priority
    pub priority: Priority,
}

/// Why the kernel could not create a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// Not enough memory for the task control block or stack
    OutOfMemory,
    /// Stack size or priority not accepted by the kernel
    InvalidParams,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::OutOfMemory => f.write_str("out of memory"),
            SpawnError::InvalidParams => f.write_str("invalid task parameters"),
        }
    }
}

/// Task creation
///
/// Each successful call creates one new, immediately runnable task that
/// calls `entry(arg)` and never returns.
pub trait TaskSpawner {
    fn spawn<A: Sync + 'static>(
        &self,
        params: &TaskParams<'_>,
        entry: fn(&'static A) -> !,
        arg: &'static A,
    ) -> Result<(), SpawnError>;
}
