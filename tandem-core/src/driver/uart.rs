//! Full-duplex UART with independent transmit and receive directions.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tandem_hal::{BinarySemaphore, Family, IrqEvent, PeripheralHandle, Timeout, UartFault, UartPort};

use super::{TransferError, UartError};
use crate::dispatch::{InterruptHandler, Peripheral};
use crate::sync::Transaction;

/// Blocking UART over an interrupt-driven port
///
/// Transmit and receive are independent: one task may send while another
/// receives. An error interrupt fails whichever direction is pending.
pub struct Uart<S, P> {
    handle: PeripheralHandle,
    port: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    tx: Transaction<S, UartFault>,
    rx: Transaction<S, UartFault>,
}

impl<S: BinarySemaphore, P: UartPort + Send> Uart<S, P> {
    pub fn new(port: P) -> Self {
        Self {
            handle: port.handle(),
            port: Mutex::new(RefCell::new(port)),
            tx: Transaction::new(),
            rx: Transaction::new(),
        }
    }

    fn with_port<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        self.port.lock(|port| f(&mut *port.borrow_mut()))
    }

    /// Send `data`, blocking until the controller reports it sent
    pub fn transmit(&self, data: &[u8], timeout: Timeout) -> Result<(), UartError> {
        self.tx.start(|| self.with_port(|port| port.start_transmit(data)))?;
        let result = self.tx.finish(timeout);
        if result == Err(TransferError::Timeout) {
            self.with_port(|port| port.abort_transmit());
            warn!("uart {}: transmit timed out", self.handle.raw());
        }
        result
    }

    /// Fill `buf` from the line, blocking until all of it arrived
    ///
    /// Returns the number of bytes received.
    pub fn receive(&self, buf: &mut [u8], timeout: Timeout) -> Result<usize, UartError> {
        self.rx.start(|| self.with_port(|port| port.start_receive(buf.len())))?;
        match self.rx.finish(timeout) {
            Ok(()) => Ok(self.with_port(|port| port.read_received(buf))),
            Err(e) => {
                if e == TransferError::Timeout {
                    self.with_port(|port| port.abort_receive());
                }
                Err(e)
            }
        }
    }

    /// Send `data` by polling, bypassing interrupts and transactions
    ///
    /// For fatal-error reporting only. Output is dropped if the port is
    /// already borrowed by the code that failed.
    pub fn transmit_polling(&self, data: &[u8]) {
        self.port.lock(|port| {
            if let Ok(mut port) = port.try_borrow_mut() {
                port.write_polling(data);
            }
        });
    }
}

impl<S: BinarySemaphore, P: UartPort + Send> InterruptHandler for Uart<S, P> {
    fn on_interrupt(&self, event: IrqEvent) {
        match event {
            IrqEvent::TransmitComplete => {
                self.tx.complete();
            }
            IrqEvent::ReceiveComplete => {
                self.rx.complete();
            }
            IrqEvent::Error => {
                let fault = self
                    .with_port(|port| port.take_fault())
                    .unwrap_or(UartFault::Unknown);
                self.tx.fail(fault);
                self.rx.fail(fault);
            }
            IrqEvent::TransferComplete => {}
        }
    }
}

impl<S: BinarySemaphore, P: UartPort + Send> Peripheral for Uart<S, P> {
    const FAMILY: Family = Family::Uart;

    fn handle(&self) -> PeripheralHandle {
        self.handle
    }
}
