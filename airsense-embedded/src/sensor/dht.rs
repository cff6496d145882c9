use airsense_api::{ClimateReading, StageError};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported single-wire humidity/temperature sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DhtModel {
    Dht11,
    Dht22,
}

impl DhtModel {
    /// Shortest interval between two valid measurements.
    pub fn minimum_sampling_period_ms(&self) -> u32 {
        match self {
            DhtModel::Dht11 => 1000,
            DhtModel::Dht22 => 2000,
        }
    }
}

/// Condition reported by the driver alongside every measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DhtStatus {
    Ok,
    Timeout,
    Checksum,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtMeasurement {
    pub humidity: f32,
    pub temperature: f32,
    pub status: DhtStatus,
}

impl DhtMeasurement {
    pub fn new(humidity: f32, temperature: f32, status: DhtStatus) -> Self {
        Self {
            humidity,
            temperature,
            status,
        }
    }

    pub fn timeout() -> Self {
        Self::new(f32::NAN, f32::NAN, DhtStatus::Timeout)
    }

    /// Decodes the 40-bit payload clocked out of the sensor.
    ///
    /// The last byte must equal the low byte of the sum of the first four.
    pub fn from_raw(model: DhtModel, data: [u8; 5]) -> Self {
        let sum = data[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        if sum != data[4] {
            return Self::new(f32::NAN, f32::NAN, DhtStatus::Checksum);
        }

        let (humidity, temperature) = match model {
            DhtModel::Dht11 => {
                let humidity = data[0] as f32 + data[1] as f32 * 0.1;
                let magnitude = data[2] as f32 + (data[3] & 0x7F) as f32 * 0.1;
                let temperature = if data[3] & 0x80 != 0 {
                    -magnitude
                } else {
                    magnitude
                };
                (humidity, temperature)
            }
            DhtModel::Dht22 => {
                let humidity = u16::from_be_bytes([data[0], data[1]]) as f32 * 0.1;
                let magnitude = u16::from_be_bytes([data[2] & 0x7F, data[3]]) as f32 * 0.1;
                let temperature = if data[2] & 0x80 != 0 {
                    -magnitude
                } else {
                    magnitude
                };
                (humidity, temperature)
            }
        };

        Self::new(humidity, temperature, DhtStatus::Ok)
    }

    /// Keeps the values only when the device reported `Ok`.
    pub fn into_reading(self) -> core::result::Result<ClimateReading, StageError> {
        self.validate().map_err(|e| {
            log::warn!("Climate sensor: {}", e);
            e.stage_error()
        })
    }

    /// Same as [`into_reading`](Self::into_reading) with the detailed error.
    pub fn validate(self) -> Result<ClimateReading> {
        if self.status != DhtStatus::Ok {
            return Err(Error::SensorStatus(self.status));
        }

        if !self.humidity.is_finite() || !self.temperature.is_finite() {
            return Err(Error::NonFiniteMeasurement);
        }

        Ok(ClimateReading {
            humidity: self.humidity,
            temperature: self.temperature,
        })
    }
}

/// Humidity/temperature driver owned by the control loop.
pub trait ClimateSensor {
    fn model(&self) -> DhtModel;

    fn read(&mut self) -> DhtMeasurement;
}

impl<T: ClimateSensor + ?Sized> ClimateSensor for &mut T {
    fn model(&self) -> DhtModel {
        (**self).model()
    }

    fn read(&mut self) -> DhtMeasurement {
        (**self).read()
    }
}
