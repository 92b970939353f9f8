use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tandem_hal::i2c::{NoAcknowledgeSource, MAX_ADDRESS};
use tandem_hal::{AfterWrite, I2cFault, I2cPort, Interrupt, IrqEvent, PeripheralHandle, StartError};

use super::{lock, MAX_TRANSFER};
use crate::irq::IrqLine;

#[derive(Default)]
struct Device {
    writes: Vec<(Vec<u8>, AfterWrite)>,
    response: Vec<u8>,
}

enum Addressed {
    Acknowledged,
    Faulted,
    Stalled,
}

#[derive(Default)]
struct Bus {
    devices: BTreeMap<u8, Device>,
    received: Vec<u8>,
    fault: Option<I2cFault>,
    forced: Option<I2cFault>,
    stalled: bool,
    delay: Duration,
}

/// Simulated I2C bus master with a set of attached devices
///
/// Addressing a device that is not attached fails with
/// `NoAcknowledge(Address)`, like an empty bus position.
pub struct SimI2c {
    handle: PeripheralHandle,
    line: IrqLine,
    bus: Arc<Mutex<Bus>>,
}

/// Device-side control of a [`SimI2c`] bus
#[derive(Clone)]
pub struct I2cRemote {
    bus: Arc<Mutex<Bus>>,
}

impl SimI2c {
    pub fn new(handle: PeripheralHandle, line: IrqLine) -> (Self, I2cRemote) {
        let bus = Arc::new(Mutex::new(Bus::default()));
        let remote = I2cRemote {
            bus: Arc::clone(&bus),
        };
        (Self { handle, line, bus }, remote)
    }

    /// Decide how addressing `address` plays out, latching a fault if any
    fn address(bus: &mut Bus, address: u8) -> Addressed {
        if bus.stalled {
            return Addressed::Stalled;
        }
        if let Some(fault) = bus.forced {
            bus.fault = Some(fault);
            return Addressed::Faulted;
        }
        if !bus.devices.contains_key(&address) {
            bus.fault = Some(I2cFault::NoAcknowledge(NoAcknowledgeSource::Address));
            return Addressed::Faulted;
        }
        Addressed::Acknowledged
    }

    fn raise(&self, event: IrqEvent, delay: Duration) {
        self.line.raise_after(Interrupt::i2c(self.handle, event), delay);
    }
}

impl I2cPort for SimI2c {
    fn handle(&self) -> PeripheralHandle {
        self.handle
    }

    fn start_write(
        &mut self,
        address: u8,
        data: &[u8],
        after: AfterWrite,
    ) -> Result<(), StartError> {
        if address > MAX_ADDRESS {
            return Err(StartError::InvalidAddress);
        }
        if data.len() > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut bus = lock(&self.bus);
        let delay = bus.delay;
        match Self::address(&mut bus, address) {
            Addressed::Stalled => return Ok(()),
            Addressed::Faulted => {
                self.raise(IrqEvent::Error, delay);
                return Ok(());
            }
            Addressed::Acknowledged => {}
        }
        if let Some(device) = bus.devices.get_mut(&address) {
            device.writes.push((data.to_vec(), after));
        }
        self.raise(IrqEvent::TransmitComplete, delay);
        Ok(())
    }

    fn start_read(&mut self, address: u8, len: usize) -> Result<(), StartError> {
        if address > MAX_ADDRESS {
            return Err(StartError::InvalidAddress);
        }
        if len > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut bus = lock(&self.bus);
        let delay = bus.delay;
        match Self::address(&mut bus, address) {
            Addressed::Stalled => return Ok(()),
            Addressed::Faulted => {
                self.raise(IrqEvent::Error, delay);
                return Ok(());
            }
            Addressed::Acknowledged => {}
        }
        let response = bus
            .devices
            .get(&address)
            .map(|device| device.response.clone())
            .unwrap_or_default();
        bus.received = response
            .into_iter()
            .chain(core::iter::repeat(0xFF))
            .take(len)
            .collect();
        self.raise(IrqEvent::ReceiveComplete, delay);
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) -> usize {
        let bus = lock(&self.bus);
        let n = buf.len().min(bus.received.len());
        buf[..n].copy_from_slice(&bus.received[..n]);
        n
    }

    fn abort(&mut self) {
        lock(&self.bus).received.clear();
    }

    fn take_fault(&mut self) -> Option<I2cFault> {
        lock(&self.bus).fault.take()
    }
}

impl I2cRemote {
    /// Attach a device that acknowledges `address`
    pub fn add_device(&self, address: u8) {
        lock(&self.bus).devices.entry(address).or_default();
    }

    /// Detach the device at `address`
    pub fn remove_device(&self, address: u8) {
        lock(&self.bus).devices.remove(&address);
    }

    /// Bytes the device at `address` returns on reads (padded with 0xFF)
    pub fn set_response(&self, address: u8, bytes: &[u8]) {
        lock(&self.bus).devices.entry(address).or_default().response = bytes.to_vec();
    }

    /// Writes the device at `address` has seen, with how each one ended
    pub fn writes(&self, address: u8) -> Vec<(Vec<u8>, AfterWrite)> {
        lock(&self.bus)
            .devices
            .get(&address)
            .map(|device| device.writes.clone())
            .unwrap_or_default()
    }

    /// Fail every transfer with `fault` until cleared with `None`
    pub fn force_fault(&self, fault: Option<I2cFault>) {
        lock(&self.bus).forced = fault;
    }

    /// Stop raising completion interrupts
    pub fn set_stalled(&self, stalled: bool) {
        lock(&self.bus).stalled = stalled;
    }

    /// Time between starting a transfer and its completion interrupt
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.bus).delay = delay;
    }
}
