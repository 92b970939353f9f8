//! Tandem Hardware Abstraction Layer
//!
//! This crate defines the boundary between the Tandem peripheral layer and
//! the two collaborators it never implements itself: the vendor HAL that
//! starts transfers and raises interrupts, and the RTOS that suspends and
//! spawns tasks. Chip or host platforms implement these traits; the same
//! driver code then runs on any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application tasks (tandem-demo, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-core (drivers, router, console) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ tandem-hal-   │       │  chip port    │
//! │    host       │       │  (vendor HAL) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartPort`] - Interrupt-driven serial transfers
//! - [`i2c::I2cPort`], [`i2c::I2cSlavePort`] - Interrupt-driven I2C
//!   master and slave transfers
//! - [`spi::SpiPort`], [`spi::SpiSlavePort`] - Interrupt-driven SPI master
//!   and slave transfers
//! - [`rtos::BinarySemaphore`], [`rtos::TaskSpawner`] - Kernel services

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod irq;
pub mod peripheral;
pub mod rtos;
pub mod spi;
pub mod uart;

// Re-export key types at crate root for convenience
pub use i2c::{AfterWrite, I2cFault, I2cPort, I2cSlavePort};
pub use irq::{Family, Interrupt, IrqEvent};
pub use peripheral::{PeripheralHandle, PinId, StartError};
pub use rtos::{BinarySemaphore, Priority, SpawnError, TaskParams, TaskSpawner, Timeout};
pub use spi::{Mode, Phase, Polarity, SpiFault, SpiPort, SpiSlavePort};
pub use uart::{UartFault, UartPort};
