//! SPI controller clocked by an external master.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{
    BinarySemaphore, Family, IrqEvent, PeripheralHandle, SpiFault, SpiSlavePort, StartError,
    Timeout,
};

use super::{SpiError, TransferError};
use crate::dispatch::{InterruptHandler, Peripheral};
use crate::sync::Transaction;

/// Blocking SPI slave
///
/// The master owns the clock and chip select, so a call only arms the port
/// and waits for the master to run the transfer.
pub struct SpiSlave<S, P> {
    handle: PeripheralHandle,
    port: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    xfer: Transaction<S, SpiFault>,
}

impl<S: BinarySemaphore, P: SpiSlavePort + Send> SpiSlave<S, P> {
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

    /// Shift `tx` out while the master fills `rx`
    ///
    /// Both buffers must have the same length.
    pub fn transmit_and_receive(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), SpiError> {
        if tx.len() != rx.len() {
            return Err(TransferError::Rejected(StartError::InvalidArgument));
        }
        self.transfer(tx, timeout)?;
        self.with_port(|port| port.read_received(rx));
        Ok(())
    }

    /// Shift `tx` out, discarding what the master sends
    pub fn transmit(&self, tx: &[u8], timeout: Timeout) -> Result<(), SpiError> {
        self.transfer(tx, timeout)
    }

    fn transfer(&self, tx: &[u8], timeout: Timeout) -> Result<(), SpiError> {
        self.xfer
            .start(|| self.with_port(|port| port.start_transfer(tx)))?;
        let result = self.xfer.finish(timeout);
        if result == Err(TransferError::Timeout) {
            self.with_port(|port| port.abort());
        }
        result.inspect_err(|e| debug!("spi slave {}: transfer failed: {:?}", self.handle.raw(), e))
    }
}

impl<S: BinarySemaphore, P: SpiSlavePort + Send> InterruptHandler for SpiSlave<S, P> {
    fn on_interrupt(&self, event: IrqEvent) {
        match event {
            IrqEvent::TransferComplete | IrqEvent::TransmitComplete | IrqEvent::ReceiveComplete => {
                self.xfer.complete();
            }
            IrqEvent::Error => {
                let fault = self
                    .with_port(|port| port.take_fault())
                    .unwrap_or(SpiFault::Other);
                self.xfer.fail(fault);
            }
        }
    }
}

impl<S: BinarySemaphore, P: SpiSlavePort + Send> Peripheral for SpiSlave<S, P> {
    const FAMILY: Family = Family::Spi;

    fn handle(&self) -> PeripheralHandle {
        self.handle
    }
}
