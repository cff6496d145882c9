use airsense_api::{
    ClimateReading, ParticulateFields, SensorReading, StageError, TimestampSource, WorkStatus,
};
use embedded_hal_async::delay::DelayNs;

use crate::publish::{CloudPush, ReadingPublisher};

use super::SensorConfig;
use super::dht::ClimateSensor;
use super::pms3003::Pms3003;
use super::schedule::SettlingSchedule;
use super::stream::ByteStream;

/// Runs acquisition cycles: climate read, particulate decode, publication.
///
/// Holds only long-lived handles. Every cycle builds its reading from scratch
/// and short-circuits on the first failing stage.
pub struct AcquisitionController<H, S, T, C, D> {
    climate: H,
    particulate: Pms3003<S>,
    clock: T,
    publisher: ReadingPublisher<C>,
    delay: D,
    schedule: SettlingSchedule,
}

impl<H, S, T, C, D> AcquisitionController<H, S, T, C, D>
where
    H: ClimateSensor,
    S: ByteStream,
    T: TimestampSource,
    C: CloudPush,
    D: DelayNs,
{
    pub fn new(
        climate: H,
        stream: S,
        clock: T,
        publisher: ReadingPublisher<C>,
        delay: D,
        config: SensorConfig,
    ) -> Self {
        Self {
            climate,
            particulate: Pms3003::new(stream).with_validation(config.validation),
            clock,
            publisher,
            delay,
            schedule: config.schedule,
        }
    }

    pub fn climate(&self) -> &H {
        &self.climate
    }

    pub fn particulate(&self) -> &Pms3003<S> {
        &self.particulate
    }

    pub fn particulate_mut(&mut self) -> &mut Pms3003<S> {
        &mut self.particulate
    }

    pub fn publisher(&self) -> &ReadingPublisher<C> {
        &self.publisher
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn schedule(&self) -> &SettlingSchedule {
        &self.schedule
    }

    /// One full cycle, classified.
    pub async fn run_cycle(&mut self) -> WorkStatus {
        let reading = match self.acquire().await {
            Ok(reading) => reading,
            Err(e) => return e.into(),
        };

        self.publisher.publish(reading).await.into()
    }

    /// Both sensor stages; a reading only exists when both succeeded.
    pub async fn acquire(&mut self) -> Result<SensorReading, StageError> {
        let climate = self.read_climate().await.inspect_err(|e| {
            log::warn!("Failed to read climate sensor: {}", e);
        })?;

        let particulate = self.read_particulate().await.inspect_err(|e| {
            log::warn!("Failed to read particulate sensor: {}", e);
        })?;

        Ok(SensorReading::new(climate, particulate, self.clock.now()))
    }

    pub async fn read_climate(&mut self) -> Result<ClimateReading, StageError> {
        let settle_ms = self.schedule.climate_settle_ms(self.climate.model());
        self.delay.delay_ms(settle_ms).await;

        let measurement = self.climate.read();
        log::debug!(
            "Climate: {:.1} %RH, {:.1} C, {:?}",
            measurement.humidity,
            measurement.temperature,
            measurement.status
        );

        measurement.into_reading()
    }

    pub async fn read_particulate(&mut self) -> Result<ParticulateFields, StageError> {
        self.delay
            .delay_ms(self.schedule.particulate_settle_ms)
            .await;

        let result = self.particulate.read_frame();
        if let Ok(fields) = &result {
            log::debug!(
                "Particulate: PM1.0 {} / PM2.5 {} / PM10 {} ug/m3",
                fields.atm_pm1_0,
                fields.atm_pm2_5,
                fields.atm_pm10
            );
        }

        self.delay.delay_ms(self.schedule.post_decode_ms).await;
        result
    }
}
