use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tandem_hal::{Interrupt, IrqEvent, Mode, PeripheralHandle, SpiFault, SpiPort, StartError};

use super::{lock, MAX_TRANSFER};
use crate::irq::IrqLine;

#[derive(Default)]
struct Bus {
    mode: Mode,
    /// Each transfer's outbound bytes with the mode it was clocked in
    sent: Vec<(Mode, Vec<u8>)>,
    /// Scripted replies, one per transfer; loopback when empty
    replies: VecDeque<Vec<u8>>,
    received: Vec<u8>,
    fault: Option<SpiFault>,
    forced: Option<SpiFault>,
    stalled: bool,
    delay: Duration,
}

/// Simulated SPI bus master
pub struct SimSpi {
    handle: PeripheralHandle,
    line: IrqLine,
    bus: Arc<Mutex<Bus>>,
}

/// Slave-side control of a [`SimSpi`] bus
#[derive(Clone)]
pub struct SpiRemote {
    bus: Arc<Mutex<Bus>>,
}

impl SimSpi {
    pub fn new(handle: PeripheralHandle, line: IrqLine) -> (Self, SpiRemote) {
        let bus = Arc::new(Mutex::new(Bus::default()));
        let remote = SpiRemote {
            bus: Arc::clone(&bus),
        };
        (Self { handle, line, bus }, remote)
    }
}

impl SpiPort for SimSpi {
    fn handle(&self) -> PeripheralHandle {
        self.handle
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), StartError> {
        lock(&self.bus).mode = mode;
        Ok(())
    }

    fn start_transfer(&mut self, tx: &[u8]) -> Result<(), StartError> {
        if tx.len() > MAX_TRANSFER {
            return Err(StartError::TooLong);
        }
        let mut bus = lock(&self.bus);
        if bus.stalled {
            return Ok(());
        }
        let event = if let Some(fault) = bus.forced {
            bus.fault = Some(fault);
            IrqEvent::Error
        } else {
            let mode = bus.mode;
            bus.sent.push((mode, tx.to_vec()));
            let reply = bus.replies.pop_front().unwrap_or_else(|| tx.to_vec());
            bus.received = reply
                .into_iter()
                .chain(core::iter::repeat(0xFF))
                .take(tx.len())
                .collect();
            IrqEvent::TransferComplete
        };
        self.line.raise_after(Interrupt::spi(self.handle, event), bus.delay);
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

    fn take_fault(&mut self) -> Option<SpiFault> {
        lock(&self.bus).fault.take()
    }
}

impl SpiRemote {
    /// Bytes the slave shifts out during the next transfer
    pub fn queue_reply(&self, bytes: &[u8]) {
        lock(&self.bus).replies.push_back(bytes.to_vec());
    }

    /// Every transfer so far with the mode it used
    pub fn sent(&self) -> Vec<(Mode, Vec<u8>)> {
        lock(&self.bus).sent.clone()
    }

    /// Fail every transfer with `fault` until cleared with `None`
    pub fn force_fault(&self, fault: Option<SpiFault>) {
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
