//! Simulated board shared by the integration tests
//!
//! Every test gets its own drivers, router and interrupt thread. Drivers
//! are leaked to get the `'static` lifetime a firmware image gives them.

#![allow(dead_code)]

use std::time::Duration;

use tandem_core::dispatch::InterruptRouter;
use tandem_core::driver::{I2cMaster, I2cSlave, SpiMaster, SpiSlave, Uart};
use tandem_core::sync::EventLatch;
pub use tandem_hal::Timeout;
use tandem_hal::{PeripheralHandle, PinId};
use tandem_hal_host::{
    HostSemaphore, I2cRemote, I2cSlaveRemote, InterruptController, SimButton, SimI2c,
    SimI2cSlave, SimSpi, SimSpiSlave, SimUart, SpiRemote, SpiSlaveRemote, UartRemote, I2C1, I2C2,
    SPI1, SPI2, UART1,
};

pub type Sem = HostSemaphore;
pub type HostUart = Uart<Sem, SimUart>;
pub type HostI2c = I2cMaster<Sem, SimI2c>;
pub type HostSpi = SpiMaster<Sem, SimSpi>;
pub type HostI2cSlave = I2cSlave<Sem, SimI2cSlave>;
pub type HostSpiSlave = SpiSlave<Sem, SimSpiSlave>;

pub const UART2: PeripheralHandle = PeripheralHandle::from_raw(0x4000_4800);
pub const USER_BUTTON: PinId = PinId(1 << 13);
pub const OTHER_BUTTON: PinId = PinId(1 << 2);

/// Generous bound for transfers that are expected to complete
pub const LONG: Timeout = Timeout::Millis(2_000);
/// Bound for transfers that are expected to time out
pub const SHORT: Timeout = Timeout::Millis(30);

pub struct Board {
    pub uart: &'static HostUart,
    pub uart_wire: UartRemote,
    pub uart2: &'static HostUart,
    pub uart2_wire: UartRemote,
    pub i2c: &'static HostI2c,
    pub i2c_bus: I2cRemote,
    pub spi: &'static HostSpi,
    pub spi_bus: SpiRemote,
    pub i2c_slave: &'static HostI2cSlave,
    pub i2c_master: I2cSlaveRemote,
    pub spi_slave: &'static HostSpiSlave,
    pub spi_master: SpiSlaveRemote,
    pub button: SimButton,
    pub other_button: SimButton,
    pub latch: &'static EventLatch<Sem>,
    pub other_latch: &'static EventLatch<Sem>,
}

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

pub fn board() -> Board {
    let controller = InterruptController::new();

    let (uart_port, uart_wire) = SimUart::new(UART1, controller.line());
    let (uart2_port, uart2_wire) = SimUart::new(UART2, controller.line());
    let (i2c_port, i2c_bus) = SimI2c::new(I2C1, controller.line());
    let (spi_port, spi_bus) = SimSpi::new(SPI1, controller.line());
    let (i2c_slave_port, i2c_master) = SimI2cSlave::new(I2C2, controller.line());
    let (spi_slave_port, spi_master) = SimSpiSlave::new(SPI2, controller.line());
    let button = SimButton::new(USER_BUTTON, controller.line());
    let other_button = SimButton::new(OTHER_BUTTON, controller.line());

    let uart = leak(Uart::new(uart_port));
    let uart2 = leak(Uart::new(uart2_port));
    let i2c = leak(I2cMaster::new(i2c_port));
    let spi = leak(SpiMaster::new(spi_port));
    let i2c_slave = leak(I2cSlave::new(i2c_slave_port));
    let spi_slave = leak(SpiSlave::new(spi_slave_port));
    let latch = leak(EventLatch::new(USER_BUTTON));
    let other_latch = leak(EventLatch::new(OTHER_BUTTON));

    let mut router = InterruptRouter::new();
    router.attach(uart).unwrap();
    router.attach(uart2).unwrap();
    router.attach(i2c).unwrap();
    router.attach(spi).unwrap();
    router.attach(i2c_slave).unwrap();
    router.attach(spi_slave).unwrap();
    router.attach_latch(latch).unwrap();
    router.attach_latch(other_latch).unwrap();
    let router: &'static InterruptRouter<'static> = leak(router);

    controller
        .run(move |irq| {
            router.dispatch(irq);
        })
        .unwrap();

    Board {
        uart,
        uart_wire,
        uart2,
        uart2_wire,
        i2c,
        i2c_bus,
        spi,
        spi_bus,
        i2c_slave,
        i2c_master,
        spi_slave,
        spi_master,
        button,
        other_button,
        latch,
        other_latch,
    }
}

pub fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
