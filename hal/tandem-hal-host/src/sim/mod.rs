//! Simulated controllers
//!
//! Each simulated port is split in two: the port itself, which is moved into
//! a driver, and a remote that stays with the test or demo to play the part
//! of the wire and the devices on it. Both sides share one locked state.

mod button;
mod i2c;
mod i2c_slave;
mod pin;
mod spi;
mod spi_slave;
mod uart;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use button::SimButton;
pub use i2c::{I2cRemote, SimI2c};
pub use i2c_slave::{I2cSlaveRemote, SimI2cSlave};
pub use pin::{PinFault, SimPin};
pub use spi::{SimSpi, SpiRemote};
pub use spi_slave::{SimSpiSlave, SpiSlaveRemote};
pub use uart::{SimUart, UartRemote};

/// Largest single transfer any simulated controller accepts
pub const MAX_TRANSFER: usize = 256;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
