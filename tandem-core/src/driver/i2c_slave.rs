//! I2C controller answering an external master.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{
    BinarySemaphore, Family, I2cFault, I2cSlavePort, IrqEvent, PeripheralHandle, Timeout,
};

use super::{I2cError, TransferError};
use crate::dispatch::{InterruptHandler, Peripheral};
use crate::sync::Transaction;

/// Blocking I2C slave
///
/// A call arms the port and waits for the external master to read or write
/// it. One transfer at a time.
pub struct I2cSlave<S, P> {
    handle: PeripheralHandle,
    port: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    xfer: Transaction<S, I2cFault>,
}

impl<S: BinarySemaphore, P: I2cSlavePort + Send> I2cSlave<S, P> {
    pub fn new(port: P) -> Self {
        Self {
            handle: port.handle(),
            port: Mutex::new(RefCell::new(port)),
            xfer: Transaction::new(),
        }
    }

    fn with_port<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        self.port.lock(|port| f(&mut *port.borrow_mut()))
    }

    fn settle(&self, timeout: Timeout) -> Result<(), I2cError> {
        let result = self.xfer.finish(timeout);
        if result == Err(TransferError::Timeout) {
            self.with_port(|port| port.abort());
        }
        result
    }

    /// Hand `data` to the master on its next read
    pub fn transmit(&self, data: &[u8], timeout: Timeout) -> Result<(), I2cError> {
        self.xfer
            .start(|| self.with_port(|port| port.start_transmit(data)))?;
        self.settle(timeout).inspect_err(|e| {
            debug!("i2c slave {}: transmit failed: {:?}", self.handle.raw(), e)
        })
    }

    /// Take the master's next write into `buf`
    ///
    /// Returns how many bytes the master wrote, at most `buf.len()`.
    pub fn receive(&self, buf: &mut [u8], timeout: Timeout) -> Result<usize, I2cError> {
        self.xfer
            .start(|| self.with_port(|port| port.start_receive(buf.len())))?;
        self.settle(timeout).inspect_err(|e| {
            debug!("i2c slave {}: receive failed: {:?}", self.handle.raw(), e)
        })?;
        Ok(self.with_port(|port| port.read_received(buf)))
    }
}

impl<S: BinarySemaphore, P: I2cSlavePort + Send> InterruptHandler for I2cSlave<S, P> {
    fn on_interrupt(&self, event: IrqEvent) {
        match event {
            IrqEvent::TransmitComplete | IrqEvent::ReceiveComplete | IrqEvent::TransferComplete => {
                self.xfer.complete();
            }
            IrqEvent::Error => {
                let fault = self
                    .with_port(|port| port.take_fault())
                    .unwrap_or(I2cFault::Other);
                self.xfer.fail(fault);
            }
        }
    }
}

impl<S: BinarySemaphore, P: I2cSlavePort + Send> Peripheral for I2cSlave<S, P> {
    const FAMILY: Family = Family::I2c;

    fn handle(&self) -> PeripheralHandle {
        self.handle
    }
}
