use core::fmt;

use airsense_api::StageError;

use crate::sensor::DhtStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    TransportError,
    FrameDesynchronized { position: usize, byte: u8 },
    ChecksumMismatch { expected: u16, actual: u16 },
    InvalidFrameLength(u16),
    IncompleteFrame { consumed: usize },
    SensorStatus(DhtStatus),
    NonFiniteMeasurement,
    InvalidTimestamp(i64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportError => write!(f, "Transport error"),
            Error::FrameDesynchronized { position, byte } => {
                write!(f, "Unexpected byte 0x{:02X} at frame position {}", byte, position)
            }
            Error::ChecksumMismatch { expected, actual } => write!(
                f,
                "Frame checksum mismatch: expected 0x{:04X}, got 0x{:04X}",
                expected, actual
            ),
            Error::InvalidFrameLength(length) => write!(f, "Invalid frame length: {}", length),
            Error::IncompleteFrame { consumed } => {
                write!(f, "Incomplete frame after {} bytes", consumed)
            }
            Error::SensorStatus(status) => write!(f, "Sensor reported status {:?}", status),
            Error::NonFiniteMeasurement => write!(f, "Sensor returned non-finite values"),
            Error::InvalidTimestamp(ms) => write!(f, "Invalid timestamp: {} ms", ms),
        }
    }
}

impl Error {
    /// Cycle outcome this error maps to.
    pub fn stage_error(&self) -> StageError {
        match self {
            Error::IncompleteFrame { .. } => StageError::Unknown,
            _ => StageError::FailedToSensor,
        }
    }
}

impl From<Error> for StageError {
    fn from(err: Error) -> Self {
        err.stage_error()
    }
}

impl embedded_hal_nb::serial::Error for Error {
    fn kind(&self) -> embedded_hal_nb::serial::ErrorKind {
        embedded_hal_nb::serial::ErrorKind::Other
    }
}

pub type Result<T> = core::result::Result<T, Error>;
