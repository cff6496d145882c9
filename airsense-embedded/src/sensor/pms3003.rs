//! Plantower PMS3003 particulate sensor over UART.
//!
//! A frame starts with the magic bytes `0x42 0x4D`, followed by a 16-bit frame
//! length, six big-endian concentration fields at offsets 4..16, reserved
//! words, and a trailing 16-bit checksum. By default only the magic bytes and
//! the first 16 bytes are interpreted; [`FrameValidation::Checksum`] opts in to
//! length and checksum checks, which rejects more corrupted input.

use airsense_api::{ParticulateFields, StageError};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::stream::ByteStream;

pub const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Bytes needed to reach the last concentration field.
pub const FIELD_FRAME_LEN: usize = 16;

/// Full PMS3003 frame: header, length, 20 bytes of body.
pub const PMS3003_FRAME_LEN: usize = 24;

const FIELD_COUNT: usize = 6;
const FIELDS_START: usize = 4;
const MIN_BODY_LENGTH: u16 = (FIELD_FRAME_LEN - FIELDS_START + 2) as u16;
const MAX_BODY_LENGTH: u16 = 60;
/// Bytes arriving during a drain that are discarded on top of the backlog.
const MAX_LATE_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameValidation {
    /// Magic bytes and a fixed 16 byte prefix
    #[default]
    MagicOnly,
    /// Also honour the length field and verify the trailing checksum
    Checksum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    ExpectMagic0,
    ExpectMagic1,
    /// Next byte lands at this offset from frame start
    Collecting(usize),
    Complete,
    Desynced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    NeedMore,
    Complete(ParticulateFields),
    Desynced(Error),
    /// The decoder already reached a terminal state
    Finished,
}

/// Byte-at-a-time frame state machine for a single decode attempt.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: FrameState,
    validation: FrameValidation,
    consumed: usize,
    high: u8,
    fields: [u16; FIELD_COUNT],
    body_length: u16,
    sum: u16,
    checksum_high: u8,
}

impl FrameDecoder {
    pub fn new(validation: FrameValidation) -> Self {
        Self {
            state: FrameState::ExpectMagic0,
            validation,
            consumed: 0,
            high: 0,
            fields: [0; FIELD_COUNT],
            body_length: 0,
            sum: 0,
            checksum_high: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Bytes interpreted so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        let position = match self.state {
            FrameState::Complete | FrameState::Desynced => return Feed::Finished,
            FrameState::ExpectMagic0 => 0,
            FrameState::ExpectMagic1 => 1,
            FrameState::Collecting(position) => position,
        };
        self.consumed += 1;

        match self.state {
            FrameState::ExpectMagic0 | FrameState::ExpectMagic1 => {
                if byte != MAGIC[position] {
                    return self.desync(Error::FrameDesynchronized { position, byte });
                }
                self.sum = self.sum.wrapping_add(byte as u16);
                self.state = if position == 0 {
                    FrameState::ExpectMagic1
                } else {
                    FrameState::Collecting(2)
                };
                Feed::NeedMore
            }
            FrameState::Collecting(position) => self.collect(position, byte),
            FrameState::Complete | FrameState::Desynced => Feed::Finished,
        }
    }

    fn collect(&mut self, position: usize, byte: u8) -> Feed {
        let frame_end = self.frame_end();
        let in_checksum = matches!(self.validation, FrameValidation::Checksum)
            && position + 2 >= frame_end;

        if !in_checksum {
            self.sum = self.sum.wrapping_add(byte as u16);
        }

        match position {
            2 => self.body_length = (byte as u16) << 8,
            3 => {
                self.body_length |= byte as u16;
                if self.validation == FrameValidation::Checksum
                    && !(MIN_BODY_LENGTH..=MAX_BODY_LENGTH).contains(&self.body_length)
                {
                    return self.desync(Error::InvalidFrameLength(self.body_length));
                }
            }
            p if (FIELDS_START..FIELD_FRAME_LEN).contains(&p) => {
                if p % 2 == 0 {
                    self.high = byte;
                } else {
                    self.fields[(p - FIELDS_START) / 2] = u16::from_be_bytes([self.high, byte]);
                }
            }
            _ => {}
        }

        if in_checksum {
            if position + 2 == frame_end {
                self.checksum_high = byte;
            } else {
                let expected = u16::from_be_bytes([self.checksum_high, byte]);
                if expected != self.sum {
                    return self.desync(Error::ChecksumMismatch {
                        expected,
                        actual: self.sum,
                    });
                }
            }
        }

        if position + 1 == self.frame_end() {
            self.state = FrameState::Complete;
            return Feed::Complete(self.particulate());
        }

        self.state = FrameState::Collecting(position + 1);
        Feed::NeedMore
    }

    /// Offset one past the last byte this decoder will interpret.
    fn frame_end(&self) -> usize {
        match self.validation {
            FrameValidation::MagicOnly => FIELD_FRAME_LEN,
            FrameValidation::Checksum if self.consumed > 4 => 4 + self.body_length as usize,
            // Length not known yet, assume the shortest legal frame
            FrameValidation::Checksum => 4 + MIN_BODY_LENGTH as usize,
        }
    }

    fn desync(&mut self, error: Error) -> Feed {
        self.state = FrameState::Desynced;
        Feed::Desynced(error)
    }

    fn particulate(&self) -> ParticulateFields {
        let [cf_pm1_0, cf_pm2_5, cf_pm10, atm_pm1_0, atm_pm2_5, atm_pm10] = self.fields;
        ParticulateFields {
            cf_pm1_0,
            cf_pm2_5,
            cf_pm10,
            atm_pm1_0,
            atm_pm2_5,
            atm_pm10,
        }
    }
}

/// Builds a complete PMS3003 frame with a valid length field and checksum.
pub fn encode_frame(fields: &ParticulateFields) -> [u8; PMS3003_FRAME_LEN] {
    let mut frame = [0u8; PMS3003_FRAME_LEN];
    frame[..2].copy_from_slice(&MAGIC);
    frame[2..4].copy_from_slice(&((PMS3003_FRAME_LEN - 4) as u16).to_be_bytes());

    let values = [
        fields.cf_pm1_0,
        fields.cf_pm2_5,
        fields.cf_pm10,
        fields.atm_pm1_0,
        fields.atm_pm2_5,
        fields.atm_pm10,
    ];
    for (i, value) in values.iter().enumerate() {
        let offset = FIELDS_START + i * 2;
        frame[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    let checksum = frame[..PMS3003_FRAME_LEN - 2]
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    frame[PMS3003_FRAME_LEN - 2..].copy_from_slice(&checksum.to_be_bytes());
    frame
}

/// PMS3003 reader owning the UART byte stream.
///
/// Each call interprets only the bytes already buffered, then discards
/// whatever is left so the next cycle starts on a clean buffer.
pub struct Pms3003<S> {
    stream: S,
    validation: FrameValidation,
}

impl<S> Pms3003<S>
where
    S: ByteStream,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            validation: FrameValidation::default(),
        }
    }

    pub fn with_validation(mut self, validation: FrameValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn validation(&self) -> FrameValidation {
        self.validation
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Decodes one frame and reports the cycle outcome.
    pub fn read_frame(&mut self) -> core::result::Result<ParticulateFields, StageError> {
        self.decode_frame().map_err(|e| {
            match e.stage_error() {
                StageError::Unknown => log::debug!("PMS3003: {}", e),
                _ => log::warn!("PMS3003: {}", e),
            }
            e.stage_error()
        })
    }

    /// Same as [`read_frame`](Self::read_frame) with the detailed error.
    pub fn decode_frame(&mut self) -> Result<ParticulateFields> {
        let outcome = self.decode();
        let discarded = self.drain();
        if discarded > 0 {
            log::debug!("PMS3003: discarded {} pending bytes", discarded);
        }
        outcome
    }

    fn decode(&mut self) -> Result<ParticulateFields> {
        let mut decoder = FrameDecoder::new(self.validation);

        while self.available()? > 0 {
            let byte = self.stream.read_byte().map_err(|e| {
                log::warn!("PMS3003: read failed: {:?}", e);
                Error::TransportError
            })?;

            match decoder.feed(byte) {
                Feed::Complete(fields) => return Ok(fields),
                Feed::Desynced(e) => return Err(e),
                Feed::NeedMore | Feed::Finished => {}
            }
        }

        Err(Error::IncompleteFrame {
            consumed: decoder.consumed(),
        })
    }

    fn available(&mut self) -> Result<usize> {
        self.stream.bytes_available().map_err(|e| {
            log::warn!("PMS3003: availability check failed: {:?}", e);
            Error::TransportError
        })
    }

    /// Discards the whole backlog pending when the drain starts, then at most
    /// `MAX_LATE_BYTES` more, so a stream that never runs dry still returns.
    fn drain(&mut self) -> usize {
        let backlog = match self.stream.bytes_available() {
            Ok(pending) => pending,
            Err(_) => return 0,
        };
        let limit = backlog.saturating_add(MAX_LATE_BYTES);

        let mut discarded = 0;
        while discarded < limit {
            match self.stream.bytes_available() {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if self.stream.read_byte().is_err() {
                break;
            }
            discarded += 1;
        }
        discarded
    }
}
