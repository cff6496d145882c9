use std::collections::VecDeque;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

use airsense_api::ParticulateFields;
use airsense_embedded::{
    ByteStream, ClimateSensor, DhtMeasurement, DhtModel, FIELD_FRAME_LEN, encode_frame,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;

/// Interval between two frames emitted by a PMS3003 in active mode.
pub const FRAME_PERIOD: Duration = Duration::from_millis(900);

/// Seconds elapsed today as a fraction of a day.
pub fn day_fraction() -> f64 {
    let now = time::OffsetDateTime::now_utc();
    let seconds = now.hour() as u32 * 3600 + now.minute() as u32 * 60 + now.second() as u32;
    seconds as f64 / 86400.0
}

pub fn simulated_humidity(day_fraction: f64) -> f64 {
    let radians = day_fraction * 2.0 * PI;

    if (0.3..=0.7).contains(&day_fraction) {
        ((radians.sin().max(0.0) * 25.0) + 65.0).round()
    } else {
        ((radians.cos().max(0.0) * 30.0) + 60.0).round()
    }
}

pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = day_fraction * 2.0 * PI;
    radians.sin().max(0.0) * 20.0 + 10.0
}

/// Fine dust concentration peaking during the morning and evening rush.
pub fn simulated_pm2_5(day_fraction: f64) -> f64 {
    let rush = |center: f64| (-((day_fraction - center) / 0.05).powi(2)).exp();
    12.0 + 30.0 * rush(0.33) + 25.0 * rush(0.75)
}

/// Packs a measurement the way the sensor clocks it out.
pub fn raw_payload(model: DhtModel, humidity: f64, temperature: f64) -> [u8; 5] {
    let mut data = [0u8; 5];
    match model {
        DhtModel::Dht11 => {
            let humidity = humidity.clamp(0.0, 99.9);
            let magnitude = temperature.abs().min(99.9);
            data[0] = humidity.trunc() as u8;
            data[1] = ((humidity.fract() * 10.0).round() as u8).min(9);
            data[2] = magnitude.trunc() as u8;
            data[3] = ((magnitude.fract() * 10.0).round() as u8).min(9);
            if temperature < 0.0 {
                data[3] |= 0x80;
            }
        }
        DhtModel::Dht22 => {
            let humidity = (humidity.clamp(0.0, 100.0) * 10.0).round() as u16;
            let magnitude = ((temperature.abs() * 10.0).round() as u16).min(0x7FFF);
            data[..2].copy_from_slice(&humidity.to_be_bytes());
            data[2..4].copy_from_slice(&magnitude.to_be_bytes());
            if temperature < 0.0 {
                data[2] |= 0x80;
            }
        }
    }
    data[4] = data[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    data
}

/// Climate sensor following a daily curve, with random read failures.
pub struct SimulatedClimate {
    model: DhtModel,
    failure_rate: f64,
    rng: StdRng,
}

impl SimulatedClimate {
    pub fn new(model: DhtModel, failure_rate: f64) -> Self {
        Self::with_rng(model, failure_rate, StdRng::from_os_rng())
    }

    pub fn with_rng(model: DhtModel, failure_rate: f64, rng: StdRng) -> Self {
        Self {
            model,
            failure_rate,
            rng,
        }
    }

    pub fn measure_at(&mut self, day_fraction: f64) -> DhtMeasurement {
        if self.rng.random_bool(self.failure_rate) {
            return DhtMeasurement::timeout();
        }

        let humidity = simulated_humidity(day_fraction);
        let temperature = simulated_temperature(day_fraction) + self.rng.random_range(-0.5..0.5);
        DhtMeasurement::from_raw(self.model, raw_payload(self.model, humidity, temperature))
    }
}

impl ClimateSensor for SimulatedClimate {
    fn model(&self) -> DhtModel {
        self.model
    }

    fn read(&mut self) -> DhtMeasurement {
        self.measure_at(day_fraction())
    }
}

/// PMS3003 emitting a full frame every [`FRAME_PERIOD`].
///
/// A share of frames is damaged: a magic byte is flipped, the frame is cut
/// short before its field section ends, or line noise precedes it.
pub struct SimulatedPms {
    corruption_rate: f64,
    last_frame: Option<Instant>,
    pending: VecDeque<u8>,
    rng: StdRng,
}

impl SimulatedPms {
    pub fn new(corruption_rate: f64) -> Self {
        Self::with_rng(corruption_rate, StdRng::from_os_rng())
    }

    pub fn with_rng(corruption_rate: f64, rng: StdRng) -> Self {
        Self {
            corruption_rate,
            last_frame: None,
            pending: VecDeque::new(),
            rng,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn poll_sensor(&mut self) {
        let due = self
            .last_frame
            .is_none_or(|at| at.elapsed() >= FRAME_PERIOD);
        if !self.pending.is_empty() || !due {
            return;
        }

        self.last_frame = Some(Instant::now());
        let frame = self.next_frame(day_fraction());
        self.pending.extend(frame);
    }

    pub fn next_frame(&mut self, day_fraction: f64) -> Vec<u8> {
        let pm2_5 = simulated_pm2_5(day_fraction) + self.rng.random_range(-2.0..2.0);
        let pm2_5 = pm2_5.max(0.0).round() as u16;
        let pm1_0 = pm2_5 * 2 / 3;
        let pm10 = pm2_5 + pm2_5 / 2 + self.rng.random_range(0..4);

        let fields = ParticulateFields {
            cf_pm1_0: pm1_0,
            cf_pm2_5: pm2_5,
            cf_pm10: pm10,
            atm_pm1_0: pm1_0,
            atm_pm2_5: pm2_5,
            atm_pm10: pm10,
        };
        let mut frame = encode_frame(&fields).to_vec();

        if self.rng.random_bool(self.corruption_rate) {
            match self.rng.random_range(0..3) {
                0 => {
                    let index = self.rng.random_range(0..2);
                    frame[index] ^= 0xFF;
                }
                1 => frame.truncate(self.rng.random_range(1..FIELD_FRAME_LEN)),
                _ => {
                    let garbage = self.rng.random_range(1..8);
                    let mut noisy: Vec<u8> = (0..garbage)
                        .map(|_| self.rng.random_range(0x50..=0xFF))
                        .collect();
                    noisy.append(&mut frame);
                    frame = noisy;
                }
            }
            tracing::trace!("Emitting damaged frame: {:02X?}", frame);
        }

        frame
    }
}

impl ByteStream for SimulatedPms {
    type Error = Error;

    fn bytes_available(&mut self) -> Result<usize, Error> {
        self.poll_sensor();
        Ok(self.pending.len())
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        self.pending
            .pop_front()
            .ok_or_else(|| Error::connection("simulated sensor has no pending byte"))
    }
}
