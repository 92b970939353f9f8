//! Interrupt events raised by the vendor layer
//!
//! The vendor HAL calls one entry point per event kind and peripheral
//! family, passing the handle of the controller that fired. [`Interrupt`]
//! is the same information as a value, for platforms that queue interrupts.

use crate::peripheral::{PeripheralHandle, PinId};

/// Peripheral family a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    Uart,
    I2c,
    Spi,
}

/// Kind of completion notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqEvent {
    /// Outbound transfer finished
    TransmitComplete,
    /// Inbound transfer finished
    ReceiveComplete,
    /// Full-duplex transfer finished
    TransferComplete,
    /// Controller flagged an error; the port holds the details
    Error,
}

/// One interrupt, as delivered to the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// Completion or error on a bus controller
    Peripheral {
        family: Family,
        handle: PeripheralHandle,
        event: IrqEvent,
    },
    /// Edge on an external interrupt line
    Exti(PinId),
}

impl Interrupt {
    pub const fn uart(handle: PeripheralHandle, event: IrqEvent) -> Self {
        Interrupt::Peripheral {
            family: Family::Uart,
            handle,
            event,
        }
    }

    pub const fn i2c(handle: PeripheralHandle, event: IrqEvent) -> Self {
        Interrupt::Peripheral {
            family: Family::I2c,
            handle,
            event,
        }
    }

    pub const fn spi(handle: PeripheralHandle, event: IrqEvent) -> Self {
        Interrupt::Peripheral {
            family: Family::Spi,
            handle,
            event,
        }
    }
}
