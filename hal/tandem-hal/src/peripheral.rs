//! Peripheral identity
//!
//! Handles and pin identifiers are created by board bring-up code. The core
//! stores and compares them but never invents one.

use core::fmt;

/// Opaque identifier of one physical controller instance
///
/// On a vendor HAL this is typically the address of the controller's handle
/// structure (one per UART, I2C or SPI controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralHandle(usize);

impl PeripheralHandle {
    /// Wrap a raw handle value supplied by board bring-up
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Use the address of a vendor handle structure as the identity
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Raw handle value
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for PeripheralHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// External interrupt line identifier (the pin mask a GPIO EXTI reports)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u16);

/// Why a port refused to start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// Controller still busy with a previous transfer
    Busy,
    /// Transfer longer than the port's staging buffer
    TooLong,
    /// Bus address outside the addressable range
    InvalidAddress,
    /// Arguments the controller cannot accept (e.g. mismatched lengths)
    InvalidArgument,
    /// Vendor HAL reported a generic start failure
    Hardware,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StartError::Busy => "controller busy",
            StartError::TooLong => "transfer too long",
            StartError::InvalidAddress => "invalid address",
            StartError::InvalidArgument => "invalid argument",
            StartError::Hardware => "hardware refused start",
        };
        f.write_str(text)
    }
}
