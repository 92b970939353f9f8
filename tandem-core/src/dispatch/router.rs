//! Vendor callback entry points and the per-family registries behind them.

use tandem_hal::{BinarySemaphore, Family, Interrupt, IrqEvent, PeripheralHandle, PinId};

use super::{HandleRegistry, InterruptHandler, Peripheral, PinHandler, PinRegistry, RegistryError};
use crate::sync::EventLatch;

/// Routes vendor interrupt callbacks to the owning driver
///
/// The vendor layer calls one entry point per callback kind, passing the
/// handle of the controller that fired. Events for handles nobody
/// registered are dropped.
pub struct InterruptRouter<'a> {
    uart: HandleRegistry<'a>,
    i2c: HandleRegistry<'a>,
    spi: HandleRegistry<'a>,
    exti: PinRegistry<'a>,
}

impl<'a> InterruptRouter<'a> {
    pub const fn new() -> Self {
        Self {
            uart: HandleRegistry::new(),
            i2c: HandleRegistry::new(),
            spi: HandleRegistry::new(),
            exti: PinRegistry::new(),
        }
    }

    fn family(&self, family: Family) -> &HandleRegistry<'a> {
        match family {
            Family::Uart => &self.uart,
            Family::I2c => &self.i2c,
            Family::Spi => &self.spi,
        }
    }

    fn family_mut(&mut self, family: Family) -> &mut HandleRegistry<'a> {
        match family {
            Family::Uart => &mut self.uart,
            Family::I2c => &mut self.i2c,
            Family::Spi => &mut self.spi,
        }
    }

    /// Register `handler` for the controller `handle` of `family`
    pub fn register(
        &mut self,
        family: Family,
        handle: PeripheralHandle,
        handler: &'a dyn InterruptHandler,
    ) -> Result<(), RegistryError> {
        self.family_mut(family).register(handle, handler)?;
        debug!("router: {:?} {} registered", family, handle.raw());
        Ok(())
    }

    /// Register a driver under its own handle and family
    pub fn attach<D: Peripheral + 'a>(&mut self, driver: &'a D) -> Result<(), RegistryError> {
        self.register(D::FAMILY, driver.handle(), driver)
    }

    /// Register `handler` for edges on `pin`
    pub fn register_pin(
        &mut self,
        pin: PinId,
        handler: &'a dyn PinHandler,
    ) -> Result<(), RegistryError> {
        self.exti.register(pin, handler)?;
        debug!("router: exti {} registered", pin.0);
        Ok(())
    }

    /// Register a latch on the line it was created for
    pub fn attach_latch<S: BinarySemaphore + 'a>(
        &mut self,
        latch: &'a EventLatch<S>,
    ) -> Result<(), RegistryError> {
        self.register_pin(latch.pin(), latch)
    }

    // Vendor entry points. Interrupt context.

    pub fn uart_tx_complete(&self, handle: PeripheralHandle) -> bool {
        self.uart.route(handle, IrqEvent::TransmitComplete)
    }

    pub fn uart_rx_complete(&self, handle: PeripheralHandle) -> bool {
        self.uart.route(handle, IrqEvent::ReceiveComplete)
    }

    pub fn uart_error(&self, handle: PeripheralHandle) -> bool {
        self.uart.route(handle, IrqEvent::Error)
    }

    pub fn i2c_tx_complete(&self, handle: PeripheralHandle) -> bool {
        self.i2c.route(handle, IrqEvent::TransmitComplete)
    }

    pub fn i2c_rx_complete(&self, handle: PeripheralHandle) -> bool {
        self.i2c.route(handle, IrqEvent::ReceiveComplete)
    }

    /// Slave-mode controllers share the I2C registry with masters
    pub fn i2c_slave_tx_complete(&self, handle: PeripheralHandle) -> bool {
        self.i2c.route(handle, IrqEvent::TransmitComplete)
    }

    pub fn i2c_slave_rx_complete(&self, handle: PeripheralHandle) -> bool {
        self.i2c.route(handle, IrqEvent::ReceiveComplete)
    }

    pub fn i2c_error(&self, handle: PeripheralHandle) -> bool {
        self.i2c.route(handle, IrqEvent::Error)
    }

    pub fn spi_transfer_complete(&self, handle: PeripheralHandle) -> bool {
        self.spi.route(handle, IrqEvent::TransferComplete)
    }

    pub fn spi_error(&self, handle: PeripheralHandle) -> bool {
        self.spi.route(handle, IrqEvent::Error)
    }

    pub fn gpio_exti(&self, pin: PinId) -> bool {
        self.exti.route(pin)
    }

    /// Route a queued interrupt value
    pub fn dispatch(&self, irq: Interrupt) -> bool {
        match irq {
            Interrupt::Peripheral {
                family,
                handle,
                event,
            } => self.family(family).route(handle, event),
            Interrupt::Exti(pin) => self.gpio_exti(pin),
        }
    }
}

impl Default for InterruptRouter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
