//! I2C bus scan
//!
//! Probes every 7-bit address with a zero-length write and renders the
//! result as the familiar 8 x 16 grid:
//!
//! ```text
//!    | 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F
//! ---+------------------------------------------------
//!  0 | -- -- -- -- -- -- -- -- -- -- -- -- -- -- -- --
//! 10 | -- -- -- -- -- -- -- -- -- -- 1A -- -- -- -- --
//! ...
//! ```
//!
//! Cells show ` XX` for a device, ` --` for silence and ` ??` for errors.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

use crate::driver::{I2cError, TransferError};

/// Addresses per table row
pub const COLUMNS: usize = 16;
/// Table rows
pub const ROWS: usize = 8;
/// Number of 7-bit addresses
pub const ADDRESSES: usize = COLUMNS * ROWS;

/// What one address did when probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Probe {
    /// A device acknowledged its address
    Acknowledge,
    /// Nobody answered
    #[default]
    NoAcknowledge,
    /// Anything else went wrong (bus fault, timeout, ...)
    Error,
}

impl Probe {
    /// Classify the outcome of a probing write
    pub fn classify(result: &Result<(), I2cError>) -> Self {
        match result {
            Ok(()) => Probe::Acknowledge,
            Err(TransferError::Hardware(ErrorKind::NoAcknowledge(_))) => Probe::NoAcknowledge,
            Err(_) => Probe::Error,
        }
    }
}

/// Result of probing every address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTable {
    cells: [Probe; ADDRESSES],
}

impl ScanTable {
    /// Probe outcome for `address`; out-of-range addresses never answer
    pub fn get(&self, address: u8) -> Probe {
        self.cells
            .get(usize::from(address))
            .copied()
            .unwrap_or(Probe::NoAcknowledge)
    }

    /// Addresses that acknowledged, ascending
    pub fn responders(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX)
            .zip(self.cells.iter())
            .filter(|(_, probe)| **probe == Probe::Acknowledge)
            .map(|(address, _)| address)
    }
}

/// Probe addresses 0 to 127 in ascending order
pub fn scan(mut probe: impl FnMut(u8) -> Probe) -> ScanTable {
    let mut cells = [Probe::NoAcknowledge; ADDRESSES];
    for (address, cell) in (0u8..).zip(cells.iter_mut()) {
        *cell = probe(address);
    }
    ScanTable { cells }
}

impl fmt::Display for ScanTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("   |")?;
        for column in 0..COLUMNS {
            write!(f, " {:02X}", column)?;
        }
        f.write_str("\r\n---+")?;
        for _ in 0..COLUMNS {
            f.write_str("---")?;
        }
        f.write_str("\r\n")?;

        for (row, cells) in self.cells.chunks(COLUMNS).enumerate() {
            let base = row * COLUMNS;
            write!(f, "{:2x} |", base)?;
            for (column, probe) in cells.iter().enumerate() {
                match probe {
                    Probe::Acknowledge => write!(f, " {:02X}", base + column)?,
                    Probe::NoAcknowledge => f.write_str(" --")?,
                    Probe::Error => f.write_str(" ??")?,
                }
            }
            f.write_str("\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;
    use proptest::prelude::*;
    use std::string::ToString;
    use tandem_hal::StartError;

    fn devices_at(addresses: &'static [u8]) -> impl FnMut(u8) -> Probe {
        move |address| {
            if addresses.contains(&address) {
                Probe::Acknowledge
            } else {
                Probe::NoAcknowledge
            }
        }
    }

    #[test]
    fn test_scan_probes_every_address_in_order() {
        let mut seen = std::vec::Vec::new();
        scan(|address| {
            seen.push(address);
            Probe::NoAcknowledge
        });
        assert_eq!(seen, (0..128).collect::<std::vec::Vec<u8>>());
    }

    #[test]
    fn test_two_devices_render_in_their_cells() {
        let table = scan(devices_at(&[0x1A, 0x50]));
        let text = table.to_string();
        let lines: std::vec::Vec<&str> = text.split("\r\n").collect();

        // header, separator, 8 rows, trailing empty split
        assert_eq!(lines.len(), 2 + ROWS + 1);
        assert_eq!(
            lines[0],
            "   | 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[1], format!("---+{}", "-".repeat(48)));
        assert_eq!(
            lines[2],
            " 0 | -- -- -- -- -- -- -- -- -- -- -- -- -- -- -- --"
        );
        assert_eq!(
            lines[3],
            "10 | -- -- -- -- -- -- -- -- -- -- 1A -- -- -- -- --"
        );
        assert_eq!(
            lines[7],
            "50 | 50 -- -- -- -- -- -- -- -- -- -- -- -- -- -- --"
        );

        let shown: usize = lines[2..2 + ROWS]
            .iter()
            .map(|line| line[4..].split(' ').filter(|c| !c.is_empty() && *c != "--").count())
            .sum();
        assert_eq!(shown, 2);
        assert_eq!(table.responders().collect::<std::vec::Vec<_>>(), vec![0x1A, 0x50]);
    }

    #[test]
    fn test_errors_render_as_question_marks() {
        let table = scan(|address| if address == 0x7F { Probe::Error } else { Probe::NoAcknowledge });
        let text = table.to_string();
        assert!(text.ends_with("70 | -- -- -- -- -- -- -- -- -- -- -- -- -- -- -- ??\r\n"));
        assert_eq!(table.get(0x7F), Probe::Error);
        assert_eq!(table.get(0xFF), Probe::NoAcknowledge);
    }

    fn any_i2c_fault() -> impl Strategy<Value = embedded_hal::i2c::ErrorKind> {
        prop_oneof![
            Just(ErrorKind::Bus),
            Just(ErrorKind::ArbitrationLoss),
            Just(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            Just(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
            Just(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)),
            Just(ErrorKind::Overrun),
            Just(ErrorKind::Other),
        ]
    }

    fn any_start_error() -> impl Strategy<Value = StartError> {
        prop_oneof![
            Just(StartError::Busy),
            Just(StartError::TooLong),
            Just(StartError::InvalidAddress),
            Just(StartError::InvalidArgument),
            Just(StartError::Hardware),
        ]
    }

    fn any_outcome() -> impl Strategy<Value = Result<(), I2cError>> {
        prop_oneof![
            Just(Ok(())),
            Just(Err(TransferError::Busy)),
            Just(Err(TransferError::Timeout)),
            any_start_error().prop_map(|e| Err(TransferError::Rejected(e))),
            any_i2c_fault().prop_map(|f| Err(TransferError::Hardware(f))),
        ]
    }

    proptest! {
        #[test]
        fn prop_classify_is_total(outcome in any_outcome()) {
            let probe = Probe::classify(&outcome);
            let expected = match outcome {
                Ok(()) => Probe::Acknowledge,
                Err(TransferError::Hardware(ErrorKind::NoAcknowledge(_))) => Probe::NoAcknowledge,
                Err(_) => Probe::Error,
            };
            prop_assert_eq!(probe, expected);
        }
    }
}
