//! Transfer errors shared by all drivers.

use core::fmt;

use tandem_hal::{I2cFault, SpiFault, StartError, UartFault};

/// Outcome of a failed blocking transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError<F> {
    /// A transfer in this direction is already in flight
    Busy,
    /// The port refused to start the transfer
    Rejected(StartError),
    /// No completion interrupt before the timeout
    Timeout,
    /// The controller reported a fault
    Hardware(F),
}

pub type UartError = TransferError<UartFault>;
pub type I2cError = TransferError<I2cFault>;
pub type SpiError = TransferError<SpiFault>;

impl<F: fmt::Display> fmt::Display for TransferError<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Busy => f.write_str("transfer already in progress"),
            TransferError::Rejected(e) => write!(f, "transfer not started: {}", e),
            TransferError::Timeout => f.write_str("transfer timed out"),
            TransferError::Hardware(fault) => write!(f, "hardware fault: {}", fault),
        }
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> I2cFault {
        match self {
            TransferError::Hardware(kind) => *kind,
            _ => I2cFault::Other,
        }
    }
}

impl embedded_hal::spi::Error for SpiError {
    fn kind(&self) -> SpiFault {
        match self {
            TransferError::Hardware(kind) => *kind,
            _ => SpiFault::Other,
        }
    }
}

/// Errors that can only come from a mistake in the calling code
///
/// Those are not worth handling at run time; the debugger console turns
/// them into a post-mortem.
pub trait ProgrammingFault {
    fn is_programming_error(&self) -> bool;
}

impl<F> ProgrammingFault for TransferError<F> {
    fn is_programming_error(&self) -> bool {
        matches!(
            self,
            TransferError::Busy
                | TransferError::Rejected(
                    StartError::TooLong | StartError::InvalidAddress | StartError::InvalidArgument
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error as _, NoAcknowledgeSource};

    #[test]
    fn test_i2c_kind_passes_hardware_fault_through() {
        let err: I2cError = TransferError::Hardware(I2cFault::ArbitrationLoss);
        assert_eq!(err.kind(), I2cFault::ArbitrationLoss);

        let err: I2cError = TransferError::Timeout;
        assert_eq!(err.kind(), I2cFault::Other);
    }

    #[test]
    fn test_programming_errors() {
        assert!(UartError::Busy.is_programming_error());
        assert!(I2cError::Rejected(StartError::InvalidAddress).is_programming_error());
        assert!(!I2cError::Rejected(StartError::Busy).is_programming_error());
        assert!(!I2cError::Timeout.is_programming_error());
        assert!(
            !I2cError::Hardware(I2cFault::NoAcknowledge(NoAcknowledgeSource::Address))
                .is_programming_error()
        );
    }

    #[test]
    fn test_display() {
        use std::string::ToString;
        let err: UartError = TransferError::Hardware(UartFault::Framing);
        assert_eq!(err.to_string(), "hardware fault: framing error");
    }
}
