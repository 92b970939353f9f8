use std::sync::{Arc, Mutex};
use std::time::Duration;

use tandem_hal::{I2cFault, I2cSlavePort, Interrupt, IrqEvent, PeripheralHandle, StartError};

use super::{lock, MAX_TRANSFER};
use crate::irq::IrqLine;

/// What the slave is ready for
enum Armed {
    Idle,
    Transmit(Vec<u8>),
    Receive(usize),
}

struct Target {
    armed: Armed,
    received: Vec<u8>,
    fault: Option<I2cFault>,
    delay: Duration,
}

/// Simulated I2C controller in slave mode
pub struct SimI2cSlave {
    handle: PeripheralHandle,
    line: IrqLine,
    target: Arc<Mutex<Target>>,
}

/// The external master talking to a [`SimI2cSlave`]
#[derive(Clone)]
pub struct I2cSlaveRemote {
    handle: PeripheralHandle,
    line: IrqLine,
    target: Arc<Mutex<Target>>,
}

impl SimI2cSlave {
    pub fn new(handle: PeripheralHandle, line: IrqLine) -> (Self, I2cSlaveRemote) {
        let target = Arc::new(Mutex::new(Target {
            armed: Armed::Idle,
            received: Vec::new(),
            fault: None,
            delay: Duration::ZERO,
        }));
        let remote = I2cSlaveRemote {
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

impl I2cSlavePort for SimI2cSlave {
    fn handle(&self) -> PeripheralHandle {
        self.handle
    }

    fn start_transmit(&mut self, data: &[u8]) -> Result<(), StartError> {
        if data.len() > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut target = lock(&self.target);
        if !matches!(target.armed, Armed::Idle) {
            return Err(StartError::Busy);
        }
        target.armed = Armed::Transmit(data.to_vec());
        Ok(())
    }

    fn start_receive(&mut self, len: usize) -> Result<(), StartError> {
        if len > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut target = lock(&self.target);
        if !matches!(target.armed, Armed::Idle) {
            return Err(StartError::Busy);
        }
        target.armed = Armed::Receive(len);
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) -> usize {
        let target = lock(&self.target);
        let n = buf.len().min(target.received.len());
        buf[..n].copy_from_slice(&target.received[..n]);
        n
    }

    fn abort(&mut self) {
        lock(&self.target).armed = Armed::Idle;
    }

    fn take_fault(&mut self) -> Option<I2cFault> {
        lock(&self.target).fault.take()
    }
}

impl I2cSlaveRemote {
    /// Master writes `bytes` to the slave
    ///
    /// Returns `false` (address not acknowledged) unless a receive is armed.
    /// Bytes beyond the armed length are dropped.
    pub fn master_write(&self, bytes: &[u8]) -> bool {
        let mut target = lock(&self.target);
        let Armed::Receive(len) = target.armed else {
            return false;
        };
        target.armed = Armed::Idle;
        target.received = bytes.iter().copied().take(len).collect();
        self.line.raise_after(
            Interrupt::i2c(self.handle, IrqEvent::ReceiveComplete),
            target.delay,
        );
        true
    }

    /// Master reads `len` bytes from the slave
    ///
    /// Returns `None` (address not acknowledged) unless a transmit is armed.
    /// Reading past the armed data yields 0xFF.
    pub fn master_read(&self, len: usize) -> Option<Vec<u8>> {
        let mut target = lock(&self.target);
        let Armed::Transmit(data) = std::mem::replace(&mut target.armed, Armed::Idle) else {
            return None;
        };
        self.line.raise_after(
            Interrupt::i2c(self.handle, IrqEvent::TransmitComplete),
            target.delay,
        );
        Some(
            data.into_iter()
                .chain(std::iter::repeat(0xFF))
                .take(len)
                .collect(),
        )
    }

    /// Whether a transfer is armed and waiting for the master
    pub fn is_armed(&self) -> bool {
        !matches!(lock(&self.target).armed, Armed::Idle)
    }

    /// Latch a bus fault and raise the error interrupt
    pub fn inject_fault(&self, fault: I2cFault) {
        let mut target = lock(&self.target);
        target.fault = Some(fault);
        target.armed = Armed::Idle;
        self.line.raise(Interrupt::i2c(self.handle, IrqEvent::Error));
    }

    /// Time between the master's access and the completion interrupt
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.target).delay = delay;
    }
}
