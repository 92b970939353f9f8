//! Interrupt dispatch
//!
//! Vendor interrupt entry points report *which* controller fired by its
//! [`PeripheralHandle`]. The [`InterruptRouter`] keeps one handle-keyed
//! table per peripheral family and forwards each event to the one driver
//! that owns that handle.
//!
//! Tables are filled during platform initialization through `&mut` and only
//! read afterwards, so routing takes no lock. Routing and every handler it
//! reaches must not block, allocate or log.

mod registry;
mod router;

use tandem_hal::{Family, IrqEvent, PeripheralHandle};

pub use registry::{
    DispatchTable, HandleRegistry, PinRegistry, RegistryError, MAX_CONTROLLERS, MAX_PINS,
};
pub use router::InterruptRouter;

/// Receiver of controller interrupts
pub trait InterruptHandler: Sync {
    /// Interrupt context: must not block
    fn on_interrupt(&self, event: IrqEvent);
}

/// Receiver of external line edges
pub trait PinHandler: Sync {
    /// Interrupt context: must not block
    fn on_edge(&self);
}

/// A driver bound to one controller
pub trait Peripheral: InterruptHandler {
    /// Family whose interrupts this driver receives
    const FAMILY: Family;

    /// Handle of the controller the driver owns
    fn handle(&self) -> PeripheralHandle;
}
