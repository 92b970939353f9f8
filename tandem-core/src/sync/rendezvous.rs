//! One-shot wake-up from interrupt context to a waiting task.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{BinarySemaphore, Timeout};

/// Outcome of [`Rendezvous::wait`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitResult {
    Signaled,
    TimedOut,
}

/// Binary rendezvous between one signaller and one waiter
///
/// Signals saturate at one: any number of signals before a wait satisfy
/// exactly that wait. A signal that arrives after a wait timed out does not
/// change the timed-out result; it is kept for the next wait, so callers
/// that start a new exchange should [`clear`](Self::clear) first.
pub struct Rendezvous<S> {
    semaphore: S,
    waiting: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl<S: BinarySemaphore> Rendezvous<S> {
    pub fn new() -> Self {
        Self {
            semaphore: S::default(),
            waiting: Mutex::new(Cell::new(false)),
        }
    }

    /// Wake the waiter, or remember the signal for the next wait
    ///
    /// Safe to call from interrupt context.
    pub fn signal(&self) {
        self.semaphore.give();
    }

    /// Block until signaled or until `timeout` elapses
    ///
    /// Task context only, and only one task may wait at a time.
    pub fn wait(&self, timeout: Timeout) -> WaitResult {
        let already_waiting = self.waiting.lock(|w| w.replace(true));
        debug_assert!(!already_waiting, "rendezvous has a second waiter");

        let taken = self.semaphore.take(timeout);
        self.waiting.lock(|w| w.set(false));

        if taken {
            WaitResult::Signaled
        } else {
            WaitResult::TimedOut
        }
    }

    /// Consume a remembered signal without blocking
    ///
    /// Returns whether one was pending.
    pub fn clear(&self) -> bool {
        self.semaphore.take(Timeout::NONE)
    }
}

impl<S: BinarySemaphore> Default for Rendezvous<S> {
    fn default() -> Self {
        Self::new()
    }
}
