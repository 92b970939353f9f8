//! I2C bus master, including the address scan.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::i2c::MAX_ADDRESS;
use tandem_hal::{
    AfterWrite, BinarySemaphore, Family, I2cFault, I2cPort, IrqEvent, PeripheralHandle,
    StartError, Timeout,
};

use super::{I2cError, TransferError};
use crate::dispatch::{InterruptHandler, Peripheral};
use crate::scan::{self, Probe, ScanTable};
use crate::sync::Transaction;

/// Blocking I2C bus master
///
/// One transfer at a time: write, read and write-then-read share a single
/// transaction.
pub struct I2cMaster<S, P> {
    handle: PeripheralHandle,
    port: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    xfer: Transaction<S, I2cFault>,
}

impl<S: BinarySemaphore, P: I2cPort + Send> I2cMaster<S, P> {
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

    fn check_address(address: u8) -> Result<(), I2cError> {
        if address > MAX_ADDRESS {
            return Err(TransferError::Rejected(StartError::InvalidAddress));
        }
        Ok(())
    }

    fn write(
        &self,
        address: u8,
        data: &[u8],
        after: AfterWrite,
        timeout: Timeout,
    ) -> Result<(), I2cError> {
        self.xfer
            .start(|| self.with_port(|port| port.start_write(address, data, after)))?;
        self.settle(timeout)
    }

    fn read(&self, address: u8, buf: &mut [u8], timeout: Timeout) -> Result<(), I2cError> {
        self.xfer
            .start(|| self.with_port(|port| port.start_read(address, buf.len())))?;
        self.settle(timeout)?;
        self.with_port(|port| port.read_received(buf));
        Ok(())
    }

    fn settle(&self, timeout: Timeout) -> Result<(), I2cError> {
        let result = self.xfer.finish(timeout);
        if result == Err(TransferError::Timeout) {
            self.with_port(|port| port.abort());
        }
        result
    }

    /// Write `data` to the device at `address`
    pub fn transmit(&self, address: u8, data: &[u8], timeout: Timeout) -> Result<(), I2cError> {
        Self::check_address(address)?;
        self.write(address, data, AfterWrite::Stop, timeout)
            .inspect_err(|e| {
                debug!("i2c {}: write to {} failed: {:?}", self.handle.raw(), address, e)
            })
    }

    /// Read `buf.len()` bytes from the device at `address`
    pub fn receive(&self, address: u8, buf: &mut [u8], timeout: Timeout) -> Result<(), I2cError> {
        Self::check_address(address)?;
        self.read(address, buf, timeout).inspect_err(|e| {
            debug!("i2c {}: read from {} failed: {:?}", self.handle.raw(), address, e)
        })
    }

    /// Write `tx`, keep the bus with a repeated start, then read into `rx`
    ///
    /// The usual register read: `tx` holds the register address. `timeout`
    /// applies to each phase.
    pub fn transmit_then_receive(
        &self,
        address: u8,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), I2cError> {
        Self::check_address(address)?;
        self.write(address, tx, AfterWrite::RepeatedStart, timeout)?;
        self.read(address, rx, timeout)
    }

    /// Address the device with a zero-length write
    pub fn probe(&self, address: u8, timeout: Timeout) -> Probe {
        let result = Self::check_address(address)
            .and_then(|()| self.write(address, &[], AfterWrite::Stop, timeout));
        Probe::classify(&result)
    }

    /// Probe every 7-bit address
    pub fn scan(&self, timeout: Timeout) -> ScanTable {
        let table = scan::scan(|address| self.probe(address, timeout));
        info!(
            "i2c {}: scan found {} devices",
            self.handle.raw(),
            table.responders().count()
        );
        table
    }
}

impl<S: BinarySemaphore, P: I2cPort + Send> InterruptHandler for I2cMaster<S, P> {
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

impl<S: BinarySemaphore, P: I2cPort + Send> Peripheral for I2cMaster<S, P> {
    const FAMILY: Family = Family::I2c;

    fn handle(&self) -> PeripheralHandle {
        self.handle
    }
}
