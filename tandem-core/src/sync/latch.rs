//! Task-side wait for an external pin edge.

use tandem_hal::{BinarySemaphore, PinId, Timeout};

use super::{Rendezvous, WaitResult};
use crate::dispatch::PinHandler;

/// Lets a task block until an edge on one external interrupt line
///
/// Releases saturate: several edges before a wait release exactly one wait.
pub struct EventLatch<S> {
    pin: PinId,
    rendezvous: Rendezvous<S>,
}

impl<S: BinarySemaphore> EventLatch<S> {
    pub fn new(pin: PinId) -> Self {
        Self {
            pin,
            rendezvous: Rendezvous::new(),
        }
    }

    /// Line this latch listens to
    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Block until released
    pub fn wait(&self) {
        while self.rendezvous.wait(Timeout::Forever) != WaitResult::Signaled {}
    }

    /// Block until released or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Timeout) -> WaitResult {
        self.rendezvous.wait(timeout)
    }

    /// Release the waiter. Interrupt context.
    pub fn release(&self) {
        self.rendezvous.signal();
    }
}

impl<S: BinarySemaphore> PinHandler for EventLatch<S> {
    fn on_edge(&self) {
        self.release();
    }
}
