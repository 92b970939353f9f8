use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tandem_hal::{Interrupt, IrqEvent, PeripheralHandle, StartError, UartFault, UartPort};

use super::{lock, MAX_TRANSFER};
use crate::irq::IrqLine;

#[derive(Default)]
struct Wire {
    /// Bytes that arrived but no receive has claimed yet
    inbound: VecDeque<u8>,
    /// Every byte the port ever sent
    sent: Vec<u8>,
    /// Length of the receive in flight
    receiving: Option<usize>,
    received: Vec<u8>,
    fault: Option<UartFault>,
    stalled: bool,
    delay: Duration,
    mirror: bool,
}

/// Simulated UART port
pub struct SimUart {
    handle: PeripheralHandle,
    line: IrqLine,
    wire: Arc<Mutex<Wire>>,
}

/// Far end of a [`SimUart`]
#[derive(Clone)]
pub struct UartRemote {
    handle: PeripheralHandle,
    line: IrqLine,
    wire: Arc<Mutex<Wire>>,
}

impl SimUart {
    pub fn new(handle: PeripheralHandle, line: IrqLine) -> (Self, UartRemote) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let remote = UartRemote {
            handle,
            line: line.clone(),
            wire: Arc::clone(&wire),
        };
        (Self { handle, line, wire }, remote)
    }
}

impl UartPort for SimUart {
    fn handle(&self) -> PeripheralHandle {
        self.handle
    }

    fn start_transmit(&mut self, data: &[u8]) -> Result<(), StartError> {
        if data.len() > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut wire = lock(&self.wire);
        if wire.stalled {
            return Ok(());
        }
        wire.sent.extend_from_slice(data);
        if wire.mirror {
            let mut out = std::io::stdout();
            let _ = out.write_all(data);
            let _ = out.flush();
        }
        self.line.raise_after(
            Interrupt::uart(self.handle, IrqEvent::TransmitComplete),
            wire.delay,
        );
        Ok(())
    }

    fn start_receive(&mut self, len: usize) -> Result<(), StartError> {
        if len > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut wire = lock(&self.wire);
        if wire.receiving.is_some() {
            return Err(StartError::Busy);
        }
        wire.receiving = Some(len);
        wire.try_complete_receive(self.handle, &self.line);
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) -> usize {
        let wire = lock(&self.wire);
        let n = buf.len().min(wire.received.len());
        buf[..n].copy_from_slice(&wire.received[..n]);
        n
    }

    fn abort_transmit(&mut self) {}

    fn abort_receive(&mut self) {
        lock(&self.wire).receiving = None;
    }

    fn take_fault(&mut self) -> Option<UartFault> {
        lock(&self.wire).fault.take()
    }

    fn write_polling(&mut self, data: &[u8]) {
        let mut wire = lock(&self.wire);
        wire.sent.extend_from_slice(data);
        if wire.mirror {
            let mut out = std::io::stdout();
            let _ = out.write_all(data);
            let _ = out.flush();
        }
    }
}

impl Wire {
    fn try_complete_receive(&mut self, handle: PeripheralHandle, line: &IrqLine) {
        let Some(len) = self.receiving else {
            return;
        };
        if self.stalled || self.inbound.len() < len {
            return;
        }
        self.received.clear();
        self.received.extend(self.inbound.drain(..len));
        self.receiving = None;
        line.raise_after(Interrupt::uart(handle, IrqEvent::ReceiveComplete), self.delay);
    }
}

impl UartRemote {
    /// Bytes arriving on the RX pin
    pub fn feed(&self, bytes: &[u8]) {
        let mut wire = lock(&self.wire);
        wire.inbound.extend(bytes.iter().copied());
        wire.try_complete_receive(self.handle, &self.line);
    }

    /// Everything transmitted so far
    pub fn sent(&self) -> Vec<u8> {
        lock(&self.wire).sent.clone()
    }

    /// Transmitted bytes as text
    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&lock(&self.wire).sent).into_owned()
    }

    /// Forget transmitted bytes
    pub fn clear_sent(&self) {
        lock(&self.wire).sent.clear();
    }

    /// Latch a line fault and raise the error interrupt
    pub fn inject_fault(&self, fault: UartFault) {
        let mut wire = lock(&self.wire);
        wire.fault = Some(fault);
        wire.receiving = None;
        self.line.raise(Interrupt::uart(self.handle, IrqEvent::Error));
    }

    /// Stop raising completion interrupts
    pub fn set_stalled(&self, stalled: bool) {
        lock(&self.wire).stalled = stalled;
    }

    /// Time between starting a transfer and its completion interrupt
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.wire).delay = delay;
    }

    /// Copy transmitted bytes to the process's stdout
    pub fn set_mirror(&self, mirror: bool) {
        lock(&self.wire).mirror = mirror;
    }
}
