use std::sync::{Arc, Mutex};

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use super::lock;

/// Output that refused to change level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct Level {
    history: Vec<bool>,
    failing: bool,
}

/// Simulated push-pull output, e.g. a chip-select line
///
/// Clones observe the same pin. Starts high (inactive for active-low use).
#[derive(Clone, Default)]
pub struct SimPin {
    level: Arc<Mutex<Level>>,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level; high until first driven
    pub fn is_high(&self) -> bool {
        lock(&self.level).history.last().copied().unwrap_or(true)
    }

    /// Every level the pin has been driven to, in order
    pub fn history(&self) -> Vec<bool> {
        lock(&self.level).history.clone()
    }

    /// Make every following level change fail
    pub fn set_failing(&self, failing: bool) {
        lock(&self.level).failing = failing;
    }

    fn drive(&mut self, high: bool) -> Result<(), PinFault> {
        let mut level = lock(&self.level);
        if level.failing {
            return Err(PinFault);
        }
        level.history.push(high);
        Ok(())
    }
}

impl ErrorType for SimPin {
    type Error = PinFault;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}
