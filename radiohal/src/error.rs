//! Error types.

use core::fmt;

use embedded_hal::{digital, spi};
use radiohal_time::WaitConfigError;

#[cfg(feature = "defmt-03")]
use crate::defmt;

/// A violated configuration precondition.
///
/// These are build or board configuration bugs, detected once at
/// initialization. See [`RadioHal::new_or_fail`](crate::RadioHal::new_or_fail).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum ConfigError {
    /// DIO0 is mandatory but has no pin.
    Dio0Unset,
    /// Neither DIO1 (LoRa) nor DIO2 (FSK) has a pin.
    Dio1AndDio2Unset,
    /// Invalid busy-wait tuning.
    Wait(WaitConfigError),
    /// Chip select could not be deasserted.
    Nss(digital::ErrorKind),
}

impl From<WaitConfigError> for ConfigError {
    fn from(err: WaitConfigError) -> Self {
        Self::Wait(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dio0Unset => f.write_str("DIO0 pin is required"),
            Self::Dio1AndDio2Unset => f.write_str("DIO1 or DIO2 pin is required"),
            Self::Wait(err) => write!(f, "invalid wait config: {}", err),
            Self::Nss(kind) => write!(f, "NSS pin could not be deasserted: {}", kind),
        }
    }
}

/// A failed bus or pin operation of the radio pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// The SPI bus reported an error.
    Spi(spi::ErrorKind),
    /// A control pin reported an error.
    Pin(digital::ErrorKind),
}

impl Error {
    pub(crate) fn spi<E: spi::Error>(err: E) -> Self {
        Self::Spi(err.kind())
    }

    pub(crate) fn pin<E: digital::Error>(err: E) -> Self {
        Self::Pin(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi(kind) => write!(f, "spi: {}", kind),
            Self::Pin(kind) => write!(f, "pin: {}", kind),
        }
    }
}
