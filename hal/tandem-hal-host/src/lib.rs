//! Host platform for the Tandem peripheral layer
//!
//! Runs the peripheral layer on a desktop OS so it can be exercised without
//! hardware:
//!
//! - [`kernel`] - Binary semaphore and task spawner on std threads
//! - [`irq`] - Interrupt controller that delivers events on one thread,
//!   like a single-core NVIC
//! - [`sim`] - Simulated UART, I2C and SPI controllers (master and slave
//!   mode), chip-select pins
//!   and a push button, each with a remote handle for scripting the
//!   "hardware" side

pub mod irq;
pub mod kernel;
pub mod sim;

pub use irq::{InterruptController, IrqLine};
pub use kernel::{HostSemaphore, ThreadSpawner};
pub use sim::{
    I2cRemote, I2cSlaveRemote, PinFault, SimButton, SimI2c, SimI2cSlave, SimPin, SimSpi,
    SimSpiSlave, SimUart, SpiRemote, SpiSlaveRemote, UartRemote,
};

/// Handle the host platform gives its first UART
pub const UART1: tandem_hal::PeripheralHandle = tandem_hal::PeripheralHandle::from_raw(0x4000_4400);
/// Handle the host platform gives its first I2C controller
pub const I2C1: tandem_hal::PeripheralHandle = tandem_hal::PeripheralHandle::from_raw(0x4000_5400);
/// Handle the host platform gives its first SPI controller
pub const SPI1: tandem_hal::PeripheralHandle = tandem_hal::PeripheralHandle::from_raw(0x4001_3000);
/// Handle the host platform gives its second I2C controller (slave mode)
pub const I2C2: tandem_hal::PeripheralHandle = tandem_hal::PeripheralHandle::from_raw(0x4000_5800);
/// Handle the host platform gives its second SPI controller (slave mode)
pub const SPI2: tandem_hal::PeripheralHandle = tandem_hal::PeripheralHandle::from_raw(0x4000_3800);
