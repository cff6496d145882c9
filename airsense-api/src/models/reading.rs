use alloc::string::String;

use serde::{Deserialize, Serialize};

/// The six concentration fields of one particulate frame, in µg/m³.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticulateFields {
    /// PM1.0, CF=1 (factory calibration)
    pub cf_pm1_0: u16,
    /// PM2.5, CF=1
    pub cf_pm2_5: u16,
    /// PM10, CF=1
    pub cf_pm10: u16,
    /// PM1.0 under atmospheric environment
    pub atm_pm1_0: u16,
    /// PM2.5 under atmospheric environment
    pub atm_pm2_5: u16,
    /// PM10 under atmospheric environment
    pub atm_pm10: u16,
}

/// Humidity and temperature from a successful climate read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    /// Relative humidity percentage
    pub humidity: f32,
    /// Temperature in Celsius
    pub temperature: f32,
}

/// Result of one complete acquisition cycle.
///
/// Only assembled from two successful stages. Fields are private so a reading
/// cannot change between assembly and publication.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    climate: ClimateReading,
    particulate: ParticulateFields,
    timestamp: String,
}

impl SensorReading {
    pub fn new(climate: ClimateReading, particulate: ParticulateFields, timestamp: String) -> Self {
        Self {
            climate,
            particulate,
            timestamp,
        }
    }

    pub fn humidity(&self) -> f32 {
        self.climate.humidity
    }

    pub fn temperature(&self) -> f32 {
        self.climate.temperature
    }

    pub fn climate(&self) -> &ClimateReading {
        &self.climate
    }

    pub fn particulate(&self) -> &ParticulateFields {
        &self.particulate
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn into_record(self) -> SensorRecord {
        SensorRecord::from(self)
    }
}

/// Flat record pushed to the remote store.
///
/// Only the atmospheric PM values are transmitted; CF=1 values stay local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub humidity: f32,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f32,
    #[serde(rename = "PM1_0")]
    pub pm1_0: u16,
    #[serde(rename = "PM2_5")]
    pub pm2_5: u16,
    #[serde(rename = "PM10")]
    pub pm10: u16,
    pub time: String,
}

impl From<SensorReading> for SensorRecord {
    fn from(reading: SensorReading) -> Self {
        let SensorReading {
            climate,
            particulate,
            timestamp,
        } = reading;

        Self {
            humidity: climate.humidity,
            temperature_c: climate.temperature,
            pm1_0: particulate.atm_pm1_0,
            pm2_5: particulate.atm_pm2_5,
            pm10: particulate.atm_pm10,
            time: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> SensorReading {
        SensorReading::new(
            ClimateReading {
                humidity: 41.0,
                temperature: 23.5,
            },
            ParticulateFields {
                cf_pm1_0: 1,
                cf_pm2_5: 2,
                cf_pm10: 3,
                atm_pm1_0: 10,
                atm_pm2_5: 11,
                atm_pm10: 12,
            },
            "2024-3-7 9:5:3".into(),
        )
    }

    #[test]
    fn test_record_uses_atmospheric_fields() {
        let record = sample_reading().into_record();

        assert_eq!(record.pm1_0, 10);
        assert_eq!(record.pm2_5, 11);
        assert_eq!(record.pm10, 12);
        assert_eq!(record.temperature_c, 23.5);
        assert_eq!(record.time, "2024-3-7 9:5:3");
    }

    #[test]
    fn test_record_field_names() {
        let value = serde_json::to_value(sample_reading().into_record()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: alloc::vec::Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["PM10", "PM1_0", "PM2_5", "humidity", "temperature_C", "time"]
        );
        assert_eq!(object["PM2_5"], 11);
        assert_eq!(object["humidity"], 41.0);
    }

    #[test]
    fn test_reading_accessors() {
        let reading = sample_reading();

        assert_eq!(reading.humidity(), 41.0);
        assert_eq!(reading.temperature(), 23.5);
        assert_eq!(reading.particulate().cf_pm10, 3);
        assert_eq!(reading.timestamp(), "2024-3-7 9:5:3");
    }
}
