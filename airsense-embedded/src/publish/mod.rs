use alloc::string::String;

use airsense_api::{SensorReading, SensorRecord, StageError};

/// Database path records are pushed under.
pub const DEFAULT_PUBLISH_PATH: &str = "/ENV-DATA-LOG";

/// Client for a remote store that appends records under a path.
#[allow(async_fn_in_trait)]
pub trait CloudPush {
    type Error: core::fmt::Debug;

    /// Appends `record` under `path` and returns the key the store assigned.
    async fn push(&mut self, path: &str, record: &SensorRecord) -> Result<String, Self::Error>;
}

/// Turns completed readings into records and hands them to a push client.
pub struct ReadingPublisher<C> {
    client: C,
    path: String,
}

impl<C> ReadingPublisher<C>
where
    C: CloudPush,
{
    pub fn new(client: C) -> Self {
        Self::with_path(client, DEFAULT_PUBLISH_PATH)
    }

    pub fn with_path(client: C, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub async fn publish(&mut self, reading: SensorReading) -> Result<String, StageError> {
        let record = SensorRecord::from(reading);

        match self.client.push(&self.path, &record).await {
            Ok(key) => {
                log::info!("{}\t-\tpushed: {}/{}", record.time, self.path, key);
                Ok(key)
            }
            Err(e) => {
                log::error!("Failed to push to {}: {:?}", self.path, e);
                Err(StageError::FailedToPublish)
            }
        }
    }
}
