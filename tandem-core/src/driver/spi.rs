//! SPI bus master and the chip-select side of its slaves.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::OutputPin;
use tandem_hal::{
    BinarySemaphore, Family, IrqEvent, Mode, PeripheralHandle, Phase, Polarity, SpiFault, SpiPort,
    StartError, Timeout,
};

use super::{SpiError, TransferError};
use crate::dispatch::{InterruptHandler, Peripheral};
use crate::sync::Transaction;

/// What the master needs to know to talk to one slave
pub trait SlaveSelect {
    /// Clock polarity and phase the slave expects
    fn mode(&self) -> Mode;

    /// Assert the slave's chip select
    fn select(&mut self) -> Result<(), SpiFault>;

    /// Release the slave's chip select
    fn deselect(&mut self) -> Result<(), SpiFault>;
}

/// Slave behind an active-low chip select pin
pub struct SpiSlaveSpecifier<CS> {
    mode: Mode,
    cs: CS,
}

impl<CS: OutputPin> SpiSlaveSpecifier<CS> {
    /// `cs` should already be driven high (inactive)
    pub fn new(mode: Mode, cs: CS) -> Self {
        Self { mode, cs }
    }

    /// Same as [`new`](Self::new), for datasheets that give CPOL/CPHA
    pub fn with_clock(polarity: Polarity, phase: Phase, cs: CS) -> Self {
        Self::new(Mode::new(polarity, phase), cs)
    }
}

impl<CS: OutputPin> SlaveSelect for SpiSlaveSpecifier<CS> {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn select(&mut self) -> Result<(), SpiFault> {
        self.cs.set_low().map_err(|_| SpiFault::ChipSelectFault)
    }

    fn deselect(&mut self) -> Result<(), SpiFault> {
        self.cs.set_high().map_err(|_| SpiFault::ChipSelectFault)
    }
}

/// Blocking SPI bus master
///
/// Each call reconfigures the clock mode for the addressed slave, so slaves
/// with different modes can share the bus.
pub struct SpiMaster<S, P> {
    handle: PeripheralHandle,
    port: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    xfer: Transaction<S, SpiFault>,
}

impl<S: BinarySemaphore, P: SpiPort + Send> SpiMaster<S, P> {
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

    /// Full-duplex transfer: send `tx` while filling `rx`
    ///
    /// Both buffers must have the same length. Chip select is released
    /// whatever the outcome.
    pub fn transmit_and_receive(
        &self,
        slave: &mut impl SlaveSelect,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), SpiError> {
        if tx.len() != rx.len() {
            return Err(TransferError::Rejected(StartError::InvalidArgument));
        }
        self.transfer(slave, tx, timeout)?;
        self.with_port(|port| port.read_received(rx));
        Ok(())
    }

    /// Send `tx`, discarding what the slave shifts out
    pub fn transmit(
        &self,
        slave: &mut impl SlaveSelect,
        tx: &[u8],
        timeout: Timeout,
    ) -> Result<(), SpiError> {
        self.transfer(slave, tx, timeout)
    }

    fn transfer(
        &self,
        slave: &mut impl SlaveSelect,
        tx: &[u8],
        timeout: Timeout,
    ) -> Result<(), SpiError> {
        self.xfer.start(|| self.with_port(|port| port.set_mode(slave.mode())))?;
        // The transaction is Pending from here on; every exit must settle it.
        if let Err(fault) = slave.select() {
            self.xfer.cancel();
            return Err(TransferError::Hardware(fault));
        }

        let result = match self.with_port(|port| port.start_transfer(tx)) {
            Ok(()) => {
                let result = self.xfer.finish(timeout);
                if result == Err(TransferError::Timeout) {
                    self.with_port(|port| port.abort());
                }
                result
            }
            Err(e) => {
                self.xfer.cancel();
                Err(TransferError::Rejected(e))
            }
        };

        let released = slave.deselect();
        if let Err(e) = result {
            debug!("spi {}: transfer failed: {:?}", self.handle.raw(), e);
            return Err(e);
        }
        released.map_err(TransferError::Hardware)
    }
}

impl<S: BinarySemaphore, P: SpiPort + Send> InterruptHandler for SpiMaster<S, P> {
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

impl<S: BinarySemaphore, P: SpiPort + Send> Peripheral for SpiMaster<S, P> {
    const FAMILY: Family = Family::Spi;

    fn handle(&self) -> PeripheralHandle {
        self.handle
    }
}
