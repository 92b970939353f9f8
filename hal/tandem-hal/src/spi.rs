//! SPI abstractions
//!
//! An [`SpiPort`] is a bus master that clocks full-duplex transfers under
//! interrupt control. Chip select is not part of the port: each slave
//! drives its own select line around the transfer. An [`SpiSlavePort`] is
//! clocked by an external master; it arms a transfer and waits.

use crate::peripheral::{PeripheralHandle, StartError};

pub use embedded_hal::spi::ErrorKind as SpiFault;

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Mode from explicit polarity and phase
    pub const fn new(polarity: Polarity, phase: Phase) -> Self {
        match (polarity, phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

/// Interrupt-driven SPI bus master
pub trait SpiPort {
    /// Identity the vendor layer passes to this port's interrupts
    fn handle(&self) -> PeripheralHandle;

    /// Reconfigure clock polarity and phase before the next transfer
    fn set_mode(&mut self, mode: Mode) -> Result<(), StartError>;

    /// Copy `tx` into the port and start a full-duplex transfer of the same length
    fn start_transfer(&mut self, tx: &[u8]) -> Result<(), StartError>;

    /// Copy the bytes clocked in by the last finished transfer into `buf`
    ///
    /// Returns the number of bytes copied.
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Abandon an unfinished transfer
    fn abort(&mut self);

    /// Fault latched by the last error interrupt, cleared on read
    fn take_fault(&mut self) -> Option<SpiFault>;
}

/// Interrupt-driven SPI controller clocked by an external master
///
/// Clock mode and select line are fixed at bring-up.
pub trait SpiSlavePort {
    /// Identity the vendor layer passes to this port's interrupts
    fn handle(&self) -> PeripheralHandle;

    /// Copy `tx` into the port and arm a full-duplex transfer of the same length
    fn start_transfer(&mut self, tx: &[u8]) -> Result<(), StartError>;

    /// Copy the bytes clocked in by the last finished transfer into `buf`
    ///
    /// Returns the number of bytes copied.
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Disarm an unfinished transfer
    fn abort(&mut self);

    /// Fault latched by the last error interrupt, cleared on read
    fn take_fault(&mut self) -> Option<SpiFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_polarity_phase() {
        for mode in [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3] {
            let (polarity, phase) = mode.into();
            assert_eq!(Mode::new(polarity, phase), mode);
        }
    }
}
