//! I2C abstractions
//!
//! An [`I2cPort`] is a bus master that starts interrupt-driven transfers.
//! An [`I2cSlavePort`] answers at its own address and only arms transfers;
//! the external master decides when they happen. Completion arrives as
//! `TransmitComplete` / `ReceiveComplete`, failures as `Error` with the
//! details latched in the port.
//!
//! Faults reuse the `embedded-hal` classification so that drivers written
//! against `embedded_hal::i2c` can inspect them directly.

use crate::peripheral::{PeripheralHandle, StartError};

pub use embedded_hal::i2c::{ErrorKind as I2cFault, NoAcknowledgeSource};

/// Highest 7-bit device address
pub const MAX_ADDRESS: u8 = 0x7F;

/// What the master does on the bus after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfterWrite {
    /// Release the bus with a STOP condition
    Stop,
    /// Keep the bus for a following read (repeated START)
    RepeatedStart,
}

/// Interrupt-driven I2C bus master
pub trait I2cPort {
    /// Identity the vendor layer passes to this port's interrupts
    fn handle(&self) -> PeripheralHandle;

    /// Copy `data` into the port and start writing it to `address`
    fn start_write(
        &mut self,
        address: u8,
        data: &[u8],
        after: AfterWrite,
    ) -> Result<(), StartError>;

    /// Start reading `len` bytes from `address`
    fn start_read(&mut self, address: u8, len: usize) -> Result<(), StartError>;

    /// Copy the bytes of the last finished read into `buf`
    ///
    /// Returns the number of bytes copied.
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Abandon an unfinished transfer and release the bus
    fn abort(&mut self);

    /// Fault latched by the last error interrupt, cleared on read
    fn take_fault(&mut self) -> Option<I2cFault>;
}

/// Interrupt-driven I2C controller addressed by an external master
///
/// The own address is part of bring-up configuration.
pub trait I2cSlavePort {
    /// Identity the vendor layer passes to this port's interrupts
    fn handle(&self) -> PeripheralHandle;

    /// Copy `data` into the port; it goes out when the master next reads
    fn start_transmit(&mut self, data: &[u8]) -> Result<(), StartError>;

    /// Accept up to `len` bytes from the master's next write
    fn start_receive(&mut self, len: usize) -> Result<(), StartError>;

    /// Copy the bytes of the last finished receive into `buf`
    ///
    /// Returns the number of bytes copied, which may be less than the
    /// armed length if the master stopped early.
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Disarm an unfinished transfer
    fn abort(&mut self);

    /// Fault latched by the last error interrupt, cleared on read
    fn take_fault(&mut self) -> Option<I2cFault>;
}
