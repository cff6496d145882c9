use airsense_api::{TimestampSource, format_timestamp};
use time::{OffsetDateTime, UtcOffset};

/// Wall clock shifted to a fixed offset, for hosts with a synchronized RTC.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn now_datetime(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(UtcOffset::from_whole_seconds(9 * 3600).unwrap_or(UtcOffset::UTC))
    }
}

impl TimestampSource for SystemClock {
    fn now(&self) -> String {
        format_timestamp(self.now_datetime())
    }
}
