use std::time::Duration;

use tandem_hal::{Interrupt, PinId};

use crate::irq::IrqLine;

/// Simulated push button wired to an external interrupt line
#[derive(Clone)]
pub struct SimButton {
    pin: PinId,
    line: IrqLine,
}

impl SimButton {
    pub fn new(pin: PinId, line: IrqLine) -> Self {
        Self { pin, line }
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Falling edge now
    pub fn press(&self) {
        self.line.raise(Interrupt::Exti(self.pin));
    }

    /// Falling edge once `delay` has elapsed
    pub fn press_after(&self, delay: Duration) {
        self.line.raise_after(Interrupt::Exti(self.pin), delay);
    }
}
