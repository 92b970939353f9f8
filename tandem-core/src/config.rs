//! Platform configuration
//!
//! Default timeouts for each peripheral family and console options. A
//! timeout of 0 ms means "wait forever", except for bus probing, which must
//! be bounded so a scan always finishes.

use core::fmt;

use heapless::String;
use tandem_hal::Timeout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum console prompt length
pub const MAX_PROMPT_LEN: usize = 8;

/// Console options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsoleConfig {
    /// Repeat the last command on an empty line
    pub auto_re_print: bool,
    /// Printed before each command line
    pub prompt: String<MAX_PROMPT_LEN>,
    /// Bound on each console transmit chunk (0 = forever)
    pub transmit_timeout_ms: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let mut prompt = String::new();
        let _ = prompt.push_str("> ");
        Self {
            auto_re_print: true,
            prompt,
            transmit_timeout_ms: 1_000,
        }
    }
}

/// Default blocking timeouts per peripheral family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimeoutConfig {
    pub uart_ms: u32,
    pub i2c_ms: u32,
    pub spi_ms: u32,
    /// Per-address timeout during a bus scan
    pub probe_ms: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            uart_ms: 1_000,
            i2c_ms: 100,
            spi_ms: 100,
            probe_ms: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn uart(&self) -> Timeout {
        to_timeout(self.uart_ms)
    }

    pub fn i2c(&self) -> Timeout {
        to_timeout(self.i2c_ms)
    }

    pub fn spi(&self) -> Timeout {
        to_timeout(self.spi_ms)
    }

    pub fn probe(&self) -> Timeout {
        Timeout::Millis(self.probe_ms)
    }
}

/// Whole platform configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlatformConfig {
    pub console: ConsoleConfig,
    pub timeouts: TimeoutConfig,
}

impl PlatformConfig {
    pub fn console_timeout(&self) -> Timeout {
        to_timeout(self.console.transmit_timeout_ms)
    }

    /// Check the values a parser cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeouts.probe_ms == 0 {
            return Err(ConfigError::UnboundedProbe);
        }
        if !self.console.prompt.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return Err(ConfigError::InvalidPrompt);
        }
        Ok(())
    }
}

fn to_timeout(ms: u32) -> Timeout {
    match ms {
        0 => Timeout::Forever,
        ms => Timeout::Millis(ms),
    }
}

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Probe timeout of 0 would let a scan hang on a stuck bus
    UnboundedProbe,
    /// Prompt contains non-printable characters
    InvalidPrompt,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnboundedProbe => f.write_str("timeouts.probe_ms must be non-zero"),
            ConfigError::InvalidPrompt => f.write_str("console.prompt must be printable ASCII"),
        }
    }
}
