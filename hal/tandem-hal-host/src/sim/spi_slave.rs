use std::sync::{Arc, Mutex};
use std::time::Duration;

use tandem_hal::{Interrupt, IrqEvent, PeripheralHandle, SpiFault, SpiSlavePort, StartError};

use super::{lock, MAX_TRANSFER};
use crate::irq::IrqLine;

#[derive(Default)]
struct Target {
    /// Bytes to shift out during the next transfer, once armed
    armed: Option<Vec<u8>>,
    received: Vec<u8>,
    fault: Option<SpiFault>,
    delay: Duration,
}

/// Simulated SPI controller in slave mode
pub struct SimSpiSlave {
    handle: PeripheralHandle,
    line: IrqLine,
    target: Arc<Mutex<Target>>,
}

/// The external master clocking a [`SimSpiSlave`]
#[derive(Clone)]
pub struct SpiSlaveRemote {
    handle: PeripheralHandle,
    line: IrqLine,
    target: Arc<Mutex<Target>>,
}

impl SimSpiSlave {
    pub fn new(handle: PeripheralHandle, line: IrqLine) -> (Self, SpiSlaveRemote) {
        let target = Arc::new(Mutex::new(Target::default()));
        let remote = SpiSlaveRemote {
            handle,
            line: line.clone(),
            target: Arc::clone(&target),
        };
        (
            Self {
                handle,
                line,
                target,
            },
            remote,
        )
    }
}

impl SpiSlavePort for SimSpiSlave {
    fn handle(&self) -> PeripheralHandle {
        self.handle
    }

    fn start_transfer(&mut self, tx: &[u8]) -> Result<(), StartError> {
        if tx.len() > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut target = lock(&self.target);
        if target.armed.is_some() {
            return Err(StartError::Busy);
        }
        target.armed = Some(tx.to_vec());
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) -> usize {
        let target = lock(&self.target);
        let n = buf.len().min(target.received.len());
        buf[..n].copy_from_slice(&target.received[..n]);
        n
    }

    fn abort(&mut self) {
        lock(&self.target).armed = None;
    }

    fn take_fault(&mut self) -> Option<SpiFault> {
        lock(&self.target).fault.take()
    }
}

impl SpiSlaveRemote {
    /// Master selects the slave and clocks `mosi` through it
    ///
    /// Returns what the slave shifted out, or `None` if no transfer was
    /// armed. Clocking past the armed data yields 0xFF.
    pub fn clock(&self, mosi: &[u8]) -> Option<Vec<u8>> {
        let mut target = lock(&self.target);
        let miso = target.armed.take()?;
        target.received = mosi.to_vec();
        self.line.raise_after(
            Interrupt::spi(self.handle, IrqEvent::TransferComplete),
            target.delay,
        );
        Some(
            miso.into_iter()
                .chain(std::iter::repeat(0xFF))
                .take(mosi.len())
                .collect(),
        )
    }

    /// Whether a transfer is armed and waiting for the master
    pub fn is_armed(&self) -> bool {
        lock(&self.target).armed.is_some()
    }

    /// Latch a fault (e.g. overrun) and raise the error interrupt
    pub fn inject_fault(&self, fault: SpiFault) {
        let mut target = lock(&self.target);
        target.fault = Some(fault);
        target.armed = None;
        self.line.raise(Interrupt::spi(self.handle, IrqEvent::Error));
    }

    /// Time between the master's transfer and the completion interrupt
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.target).delay = delay;
    }
}
