mod controller;
mod dht;
mod pms3003;
mod schedule;
mod stream;

pub use controller::*;
pub use dht::{ClimateSensor, DhtMeasurement, DhtModel, DhtStatus};
pub use pms3003::{
    FIELD_FRAME_LEN, Feed, FrameDecoder, FrameState, FrameValidation, MAGIC, PMS3003_FRAME_LEN,
    Pms3003, encode_frame,
};
pub use schedule::SettlingSchedule;
pub use stream::{ByteStream, IoStream, NbSerialStream};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub schedule: SettlingSchedule,
    pub validation: FrameValidation,
}
