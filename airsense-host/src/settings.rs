use std::path::PathBuf;
use std::{env, fs, io};

use airsense_embedded::{DhtModel, FrameValidation, SensorConfig, SettlingSchedule};
use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::error::{Error, Result};

/// Environment variable naming a settings file that replaces the defaults.
pub const CONFIG_ENV: &str = "AIRSENSE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    pub utc_offset_hours: i8,
}

impl Clock {
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map_err(|e| Error::config(format!("utc_offset_hours: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub cycle_interval_secs: u64,
    #[serde(flatten)]
    pub settling: SettlingSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Climate {
    pub model: DhtModel,
    #[serde(default)]
    pub failure_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParticulateSource {
    Serial {
        #[serde(default)]
        port_path: Option<String>,
        baud_rate: u32,
    },
    Simulated { corruption_rate: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particulate {
    #[serde(default)]
    pub validation: FrameValidation,
    pub source: ParticulateSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Publish {
    Firebase {
        host: String,
        auth: String,
        path: String,
    },
    Log {
        path: String,
    },
}

impl Publish {
    pub fn path(&self) -> &str {
        match self {
            Publish::Firebase { path, .. } | Publish::Log { path } => path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub clock: Clock,
    pub schedule: Schedule,
    pub climate: Climate,
    pub particulate: Particulate,
    pub publish: Publish,
}

impl Settings {
    pub fn new() -> Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) => {
                let path = Self::normalize_path(&path)?;
                let contents = fs::read_to_string(&path).map_err(|e| {
                    Error::config(format!("failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&contents)
            }
            Err(_) => Self::from_toml(include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../",
                "configs/default.toml"
            ))),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig {
            schedule: self.schedule.settling,
            validation: self.particulate.validation,
        }
    }

    fn validate(&self) -> Result<()> {
        self.clock.utc_offset()?;

        if self.schedule.cycle_interval_secs == 0 {
            return Err(Error::config("cycle_interval_secs must be positive"));
        }

        if let ParticulateSource::Simulated { corruption_rate } = self.particulate.source {
            if !(0.0..=1.0).contains(&corruption_rate) {
                return Err(Error::config("corruption_rate must be within 0..=1"));
            }
        }

        if !(0.0..=1.0).contains(&self.climate.failure_rate) {
            return Err(Error::config("failure_rate must be within 0..=1"));
        }

        if !self.publish.path().starts_with('/') {
            return Err(Error::config("publish path must start with '/'"));
        }

        Ok(())
    }

    fn normalize_path(path: &str) -> io::Result<PathBuf> {
        let path_buf = PathBuf::from(path);

        Ok(if path_buf.is_absolute() {
            path_buf
        } else {
            env::current_dir()?.join(path_buf)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../",
        "configs/default.toml"
    ));

    #[test]
    fn test_default_settings() {
        let settings = Settings::from_toml(DEFAULT).unwrap();

        assert_eq!(settings.logger.level, "info");
        assert_eq!(settings.clock.utc_offset().unwrap().whole_hours(), 9);
        assert_eq!(settings.schedule.settling, SettlingSchedule::default());
        assert_eq!(settings.climate.model, DhtModel::Dht11);
        assert_eq!(settings.particulate.validation, FrameValidation::MagicOnly);
        assert!(matches!(
            settings.particulate.source,
            ParticulateSource::Simulated { .. }
        ));
        assert_eq!(settings.publish.path(), "/ENV-DATA-LOG");
    }

    #[test]
    fn test_serial_and_firebase_settings() {
        let settings = Settings::from_toml(
            r#"
            [logger]
            level = "debug"

            [clock]
            utc_offset_hours = -5

            [schedule]
            cycle_interval_secs = 300
            particulate_settle_ms = 2000

            [climate]
            model = "Dht22"

            [particulate]
            validation = "Checksum"

            [particulate.source]
            type = "Serial"
            port_path = "/dev/ttyAMA0"
            baud_rate = 9600

            [publish]
            type = "Firebase"
            host = "example.firebaseio.com"
            auth = "secret"
            path = "/readings"
            "#,
        )
        .unwrap();

        let config = settings.sensor_config();
        assert_eq!(config.validation, FrameValidation::Checksum);
        assert_eq!(config.schedule.particulate_settle_ms, 2000);
        assert_eq!(config.schedule.climate_margin_ms, 500);
        assert_eq!(settings.climate.failure_rate, 0.0);
        match settings.particulate.source {
            ParticulateSource::Serial { port_path, baud_rate } => {
                assert_eq!(port_path.as_deref(), Some("/dev/ttyAMA0"));
                assert_eq!(baud_rate, 9600);
            }
            other => panic!("unexpected source {other:?}"),
        }
        assert!(matches!(settings.publish, Publish::Firebase { .. }));
    }

    #[test]
    fn test_invalid_settings() {
        let bad_rate = DEFAULT.replace("corruption_rate = 0.05", "corruption_rate = 1.5");
        assert!(matches!(
            Settings::from_toml(&bad_rate),
            Err(Error::Config { .. })
        ));

        let bad_offset = DEFAULT.replace("utc_offset_hours = 9", "utc_offset_hours = 30");
        assert!(Settings::from_toml(&bad_offset).is_err());

        let bad_path = DEFAULT.replace("path = \"/ENV-DATA-LOG\"", "path = \"ENV\"");
        assert!(Settings::from_toml(&bad_path).is_err());

        assert!(Settings::from_toml("[logger]\nlevel = 1").is_err());
    }
}
