//! Synchronization between interrupt handlers and tasks
//!
//! - [`Rendezvous`] - one interrupt-side producer wakes one waiting task
//! - [`Transaction`] - Idle/Pending/Completed/Failed state of one transfer
//!   direction, settled from interrupt context
//! - [`EventLatch`] - task blocks until an external pin edge
//! - [`TaskLock`] - blocking mutual exclusion between tasks, and
//!   [`TaskMutex`] for a value behind one

mod latch;
mod lock;
mod rendezvous;
mod transaction;

pub use latch::EventLatch;
pub use lock::{TaskLock, TaskLockGuard, TaskMutex, TaskMutexGuard};
pub use rendezvous::{Rendezvous, WaitResult};
pub use transaction::{Transaction, TransactionState};
