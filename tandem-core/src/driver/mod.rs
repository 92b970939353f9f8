//! Blocking peripheral drivers
//!
//! Each driver owns one port and one [`Transaction`](crate::sync::Transaction)
//! per transfer direction. A call claims the direction, starts the port,
//! suspends the calling task until the interrupt settles the transaction or
//! the timeout elapses, and returns the outcome. The driver's
//! [`InterruptHandler`](crate::dispatch::InterruptHandler) impl is the
//! interrupt side of the same transaction.
//!
//! [`I2cSlave`] and [`SpiSlave`] run the same cycle with the roles swapped:
//! the call arms the port and the external master decides when the
//! transfer happens.
//!
//! Ports sit inside a critical-section mutex because both the calling task
//! and the interrupt handler (fault capture) touch them.

mod error;
mod i2c;
mod i2c_slave;
mod spi;
mod spi_slave;
mod uart;

pub use error::{I2cError, ProgrammingFault, SpiError, TransferError, UartError};
pub use i2c::I2cMaster;
pub use i2c_slave::I2cSlave;
pub use spi::{SlaveSelect, SpiMaster, SpiSlaveSpecifier};
pub use spi_slave::SpiSlave;
pub use uart::Uart;
