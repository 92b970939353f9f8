//! Transfer state shared by a driver call and its interrupt handler.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{BinarySemaphore, StartError, Timeout};

use super::Rendezvous;
use crate::driver::TransferError;

/// State of one transfer direction
///
/// ```text
///          begin            complete
///   Idle ─────────► Pending ─────────► Completed ─┐
///    ▲  ◄──────────    │    fail                  │
///    │   cancel        └──────────► Failed(F) ────┤
///    └─────────────────── finish ─────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionState<F> {
    /// No transfer in flight
    Idle,
    /// Transfer started, waiting for its interrupt
    Pending,
    /// Interrupt reported success
    Completed,
    /// Interrupt reported a hardware fault
    Failed(F),
}

/// One transfer direction of a driver
///
/// Task side: [`begin`](Self::begin), start the hardware, then
/// [`finish`](Self::finish). Interrupt side: [`complete`](Self::complete) or
/// [`fail`](Self::fail). Interrupt-side calls are only accepted while
/// Pending, so a completion that arrives after the task gave up is dropped.
pub struct Transaction<S, F> {
    state: Mutex<CriticalSectionRawMutex, Cell<TransactionState<F>>>,
    rendezvous: Rendezvous<S>,
}

impl<S: BinarySemaphore, F: Copy + Send> Transaction<S, F> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(TransactionState::Idle)),
            rendezvous: Rendezvous::new(),
        }
    }

    pub fn state(&self) -> TransactionState<F> {
        self.state.lock(Cell::get)
    }

    /// Claim the direction for a new transfer
    ///
    /// Fails with `Busy` if a transfer is already in flight; that transfer
    /// is left untouched.
    pub fn begin(&self) -> Result<(), TransferError<F>> {
        let claimed = self.state.lock(|state| match state.get() {
            TransactionState::Idle => {
                state.set(TransactionState::Pending);
                true
            }
            _ => false,
        });
        if !claimed {
            return Err(TransferError::Busy);
        }
        // A signal left over from an abandoned transfer must not satisfy this one.
        self.rendezvous.clear();
        Ok(())
    }

    /// Give the direction back after the hardware refused to start
    pub fn cancel(&self) {
        self.state.lock(|state| state.set(TransactionState::Idle));
    }

    /// Claim, then run `start`; a refused start returns the direction to Idle
    pub fn start(
        &self,
        start: impl FnOnce() -> Result<(), StartError>,
    ) -> Result<(), TransferError<F>> {
        self.begin()?;
        start().map_err(|e| {
            self.cancel();
            TransferError::Rejected(e)
        })
    }

    /// Settle as successful. Interrupt context.
    ///
    /// Returns `false` if no transfer was pending (the event is dropped).
    pub fn complete(&self) -> bool {
        self.settle(TransactionState::Completed)
    }

    /// Settle as failed with `fault`. Interrupt context.
    ///
    /// Returns `false` if no transfer was pending (the event is dropped).
    pub fn fail(&self, fault: F) -> bool {
        self.settle(TransactionState::Failed(fault))
    }

    fn settle(&self, outcome: TransactionState<F>) -> bool {
        let accepted = self.state.lock(|state| {
            if matches!(state.get(), TransactionState::Pending) {
                state.set(outcome);
                true
            } else {
                false
            }
        });
        if accepted {
            self.rendezvous.signal();
        }
        accepted
    }

    /// Wait for the interrupt, then return the direction to Idle
    ///
    /// A completion that lands between the timeout and the state check is
    /// reported as success.
    pub fn finish(&self, timeout: Timeout) -> Result<(), TransferError<F>> {
        self.rendezvous.wait(timeout);
        let outcome = self.state.lock(|state| state.replace(TransactionState::Idle));
        match outcome {
            TransactionState::Completed => Ok(()),
            TransactionState::Failed(fault) => Err(TransferError::Hardware(fault)),
            TransactionState::Pending | TransactionState::Idle => Err(TransferError::Timeout),
        }
    }
}

impl<S: BinarySemaphore, F: Copy + Send> Default for Transaction<S, F> {
    fn default() -> Self {
        Self::new()
    }
}
