//! UART abstractions
//!
//! A [`UartPort`] starts interrupt-driven transfers and returns immediately.
//! The vendor layer later raises `TransmitComplete`, `ReceiveComplete` or
//! `Error` for the port's handle. The port owns its staging buffers, so a
//! completion arriving after the caller gave up never touches caller memory.

use core::fmt;

use crate::peripheral::{PeripheralHandle, StartError};

/// Line fault reported by a UART error interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartFault {
    /// Parity bit mismatch
    Parity,
    /// Noise detected on the line
    Noise,
    /// Missing stop bit
    Framing,
    /// Receive data register overwritten before it was read
    Overrun,
    /// DMA transfer error
    Dma,
    /// Error flag the port could not classify
    Unknown,
}

impl fmt::Display for UartFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UartFault::Parity => "parity error",
            UartFault::Noise => "noise error",
            UartFault::Framing => "framing error",
            UartFault::Overrun => "overrun error",
            UartFault::Dma => "DMA error",
            UartFault::Unknown => "unknown UART error",
        };
        f.write_str(text)
    }
}

/// Interrupt-driven UART controller
pub trait UartPort {
    /// Identity the vendor layer passes to this port's interrupts
    fn handle(&self) -> PeripheralHandle;

    /// Copy `data` into the transmit buffer and start sending
    fn start_transmit(&mut self, data: &[u8]) -> Result<(), StartError>;

    /// Start receiving exactly `len` bytes
    fn start_receive(&mut self, len: usize) -> Result<(), StartError>;

    /// Copy the bytes of the last finished receive into `buf`
    ///
    /// Returns the number of bytes copied.
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Abandon an unfinished transmit
    fn abort_transmit(&mut self);

    /// Abandon an unfinished receive
    fn abort_receive(&mut self);

    /// Fault latched by the last error interrupt, cleared on read
    fn take_fault(&mut self) -> Option<UartFault>;

    /// Send `data` by busy-waiting on the controller, without interrupts
    ///
    /// Used when the scheduler can no longer be trusted (post-mortem).
    fn write_polling(&mut self, data: &[u8]);
}
