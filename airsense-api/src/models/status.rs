use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one acquisition stage or of a whole cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkStatus {
    /// Stage produced its data
    Success,
    /// A device reported a bad reading or the frame decoder lost sync
    FailedToSensor,
    /// The remote store rejected or could not accept the record
    FailedToPublish,
    /// Not enough data arrived this cycle
    Unknown,
}

impl WorkStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkStatus::Success)
    }

    pub fn from_result<T>(result: &Result<T, StageError>) -> Self {
        match result {
            Ok(_) => WorkStatus::Success,
            Err(e) => (*e).into(),
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkStatus::Success => write!(f, "Success"),
            WorkStatus::FailedToSensor => write!(f, "Failed to sensor"),
            WorkStatus::FailedToPublish => write!(f, "Failed to publish"),
            WorkStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The non-success half of [`WorkStatus`].
///
/// Stages return `Result<T, StageError>` so a successful status always carries
/// its data and a failed one never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageError {
    FailedToSensor,
    FailedToPublish,
    Unknown,
}

impl From<StageError> for WorkStatus {
    fn from(err: StageError) -> Self {
        match err {
            StageError::FailedToSensor => WorkStatus::FailedToSensor,
            StageError::FailedToPublish => WorkStatus::FailedToPublish,
            StageError::Unknown => WorkStatus::Unknown,
        }
    }
}

impl<T> From<Result<T, StageError>> for WorkStatus {
    fn from(result: Result<T, StageError>) -> Self {
        WorkStatus::from_result(&result)
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        WorkStatus::from(*self).fmt(f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StageError {}
