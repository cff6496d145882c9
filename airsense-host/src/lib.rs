use std::time::Duration;

use airsense_api::{SensorRecord, WorkStatus};
use airsense_embedded::{AcquisitionController, ByteStream, CloudPush, ReadingPublisher};
use tokio::time::{self, MissedTickBehavior};

use crate::clock::SystemClock;
use crate::delay::TokioDelay;
use crate::error::Result;
use crate::publish::{FirebaseClient, LogPush};
use crate::serial::SerialPortStream;
use crate::settings::{ParticulateSource, Publish, Settings};
use crate::simulate::{SimulatedClimate, SimulatedPms};

pub mod clock;
pub mod delay;
pub mod error;
pub mod publish;
pub mod serial;
pub mod settings;
pub mod simulate;

/// Particulate byte source selected in the settings.
pub enum ParticulateStream {
    Serial(SerialPortStream),
    Simulated(SimulatedPms),
}

impl ByteStream for ParticulateStream {
    type Error = error::Error;

    fn bytes_available(&mut self) -> Result<usize> {
        match self {
            ParticulateStream::Serial(s) => s.bytes_available(),
            ParticulateStream::Simulated(s) => s.bytes_available(),
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        match self {
            ParticulateStream::Serial(s) => s.read_byte(),
            ParticulateStream::Simulated(s) => s.read_byte(),
        }
    }
}

/// Publication target selected in the settings.
pub enum PushTarget {
    Firebase(FirebaseClient),
    Log(LogPush),
}

impl CloudPush for PushTarget {
    type Error = error::Error;

    async fn push(&mut self, path: &str, record: &SensorRecord) -> Result<String> {
        match self {
            PushTarget::Firebase(c) => c.push(path, record).await,
            PushTarget::Log(c) => c.push(path, record).await,
        }
    }
}

pub type HostController =
    AcquisitionController<SimulatedClimate, ParticulateStream, SystemClock, PushTarget, TokioDelay>;

pub fn build_controller(settings: &Settings) -> Result<HostController> {
    let climate = SimulatedClimate::new(settings.climate.model, settings.climate.failure_rate);

    let stream = match &settings.particulate.source {
        ParticulateSource::Serial {
            port_path,
            baud_rate,
        } => ParticulateStream::Serial(SerialPortStream::open(port_path.as_deref(), *baud_rate)?),
        ParticulateSource::Simulated { corruption_rate } => {
            ParticulateStream::Simulated(SimulatedPms::new(*corruption_rate))
        }
    };

    let target = match &settings.publish {
        Publish::Firebase { host, auth, .. } => {
            PushTarget::Firebase(FirebaseClient::new(host, auth)?)
        }
        Publish::Log { .. } => PushTarget::Log(LogPush::new()),
    };
    let publisher = ReadingPublisher::with_path(target, settings.publish.path());

    let clock = SystemClock::new(settings.clock.utc_offset()?);

    Ok(AcquisitionController::new(
        climate,
        stream,
        clock,
        publisher,
        TokioDelay,
        settings.sensor_config(),
    ))
}

pub async fn run(settings: &Settings) -> Result<()> {
    let mut controller = build_controller(settings)?;

    let cycle = Duration::from_secs(settings.schedule.cycle_interval_secs);
    let mut interval = time::interval(cycle);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Sampling every {:?}, {:?} validation, publishing to {}",
        cycle,
        settings.particulate.validation,
        settings.publish.path()
    );

    loop {
        interval.tick().await;

        match controller.run_cycle().await {
            WorkStatus::Success => tracing::debug!("Cycle complete"),
            status => tracing::warn!("Cycle ended with {}", status),
        }
    }
}
