//! Blocking peripheral transactions over interrupt completion
//!
//! Application tasks call ordinary blocking methods (transmit, receive,
//! wait for a button) while the hardware finishes the work under interrupt
//! control. The pieces:
//!
//! - [`sync`] - Rendezvous between an interrupt and one waiting task, the
//!   per-direction transaction state machine, the external event latch and
//!   a task-level lock
//! - [`dispatch`] - Handle-keyed dispatch tables and the interrupt router
//!   that vendor interrupt entry points call into
//! - [`driver`] - UART, I2C master and SPI master drivers
//! - [`task`] - Task wrapper over the kernel's spawner
//! - [`console`] - Line editor and the debugger console with post-mortem
//! - [`scan`] - I2C bus scan and its table rendering
//! - [`config`] - Platform configuration
//!
//! Nothing here owns a global: board bring-up creates every driver once and
//! hands out `&'static` references.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod console;
pub mod dispatch;
pub mod driver;
pub mod scan;
pub mod sync;
pub mod task;

pub use tandem_hal as hal;
