//! Task wrapper
//!
//! A [`Task`] records everything needed to create a kernel task up front,
//! typically in a `static`, and creates it on [`Task::start`]. Creation
//! happens at most once.

use core::cell::Cell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{Priority, SpawnError, TaskParams, TaskSpawner};

use crate::driver::ProgrammingFault;

/// Why [`Task::start`] did not create a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskError {
    /// `start` was already called successfully
    AlreadyStarted,
    /// The kernel refused; the task may be started again
    Spawn(SpawnError),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::AlreadyStarted => f.write_str("task already started"),
            TaskError::Spawn(e) => write!(f, "task not created: {}", e),
        }
    }
}

impl ProgrammingFault for TaskError {
    fn is_programming_error(&self) -> bool {
        matches!(self, TaskError::AlreadyStarted)
    }
}

/// A kernel task that has not necessarily been created yet
pub struct Task<'s, T, A: 'static> {
    spawner: &'s T,
    name: &'static str,
    stack_size: usize,
    priority: Priority,
    arg: &'static A,
    entry: fn(&'static A) -> !,
    started: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl<'s, T: TaskSpawner, A: Sync + 'static> Task<'s, T, A> {
    /// Record the task; nothing is created until [`start`](Self::start)
    pub const fn new(
        spawner: &'s T,
        name: &'static str,
        stack_size: usize,
        priority: Priority,
        arg: &'static A,
        entry: fn(&'static A) -> !,
    ) -> Self {
        Self {
            spawner,
            name,
            stack_size,
            priority,
            arg,
            entry,
            started: Mutex::new(Cell::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_started(&self) -> bool {
        self.started.lock(Cell::get)
    }

    /// Create the kernel task, which starts running `entry(arg)`
    pub fn start(&self) -> Result<(), TaskError> {
        if self.started.lock(|started| started.replace(true)) {
            return Err(TaskError::AlreadyStarted);
        }

        let params = TaskParams {
            name: self.name,
            stack_size: self.stack_size,
            priority: self.priority,
        };
        match self.spawner.spawn(&params, self.entry, self.arg) {
            Ok(()) => {
                info!("task {} started", self.name);
                Ok(())
            }
            Err(e) => {
                self.started.lock(|started| started.set(false));
                warn!("task {} not created: {:?}", self.name, e);
                Err(TaskError::Spawn(e))
            }
        }
    }
}
