use alloc::string::String;

use airsense_api::{TimeProvider, TimestampSource, format_timestamp};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::error::{Error, Result};

/// Wall clock derived from one synchronization point and monotonic uptime.
///
/// Only constructed from a known Unix time, so it never reports an
/// unsynchronized timestamp.
#[derive(Debug, Clone)]
pub struct SyncedClock<P> {
    provider: P,
    offset: UtcOffset,
    reference: OffsetDateTime,
    reference_uptime_ms: u64,
}

impl<P> SyncedClock<P>
where
    P: TimeProvider,
{
    pub fn new(provider: P, offset: UtcOffset, unix_ms: i64) -> Result<Self> {
        let reference = from_unix_ms(unix_ms)?;
        let reference_uptime_ms = provider.uptime_ms();

        Ok(Self {
            provider,
            offset,
            reference,
            reference_uptime_ms,
        })
    }

    /// Replaces the synchronization point, e.g. after a new SNTP response.
    pub fn resync(&mut self, unix_ms: i64) -> Result<()> {
        self.reference = from_unix_ms(unix_ms)?;
        self.reference_uptime_ms = self.provider.uptime_ms();
        Ok(())
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn now_datetime(&self) -> OffsetDateTime {
        let elapsed = self
            .provider
            .uptime_ms()
            .saturating_sub(self.reference_uptime_ms);
        let elapsed = Duration::milliseconds(i64::try_from(elapsed).unwrap_or(i64::MAX));

        self.reference
            .checked_add(elapsed)
            .unwrap_or(self.reference)
            .to_offset(self.offset)
    }
}

impl<P> TimestampSource for SyncedClock<P>
where
    P: TimeProvider,
{
    fn now(&self) -> String {
        format_timestamp(self.now_datetime())
    }
}

fn from_unix_ms(unix_ms: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(unix_ms as i128 * 1_000_000).map_err(|_| {
        log::error!("Rejected out of range sync time {}", unix_ms);
        Error::InvalidTimestamp(unix_ms)
    })
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    struct ManualProvider {
        uptime_ms: Cell<u64>,
    }

    impl TimeProvider for &ManualProvider {
        fn uptime_ms(&self) -> u64 {
            self.uptime_ms.get()
        }
    }

    #[test]
    fn test_clock_advances_with_uptime() {
        let provider = ManualProvider {
            uptime_ms: Cell::new(5_000),
        };
        let offset = UtcOffset::from_hms(9, 0, 0).unwrap();
        // 2024-03-07 00:05:03 UTC
        let clock = SyncedClock::new(&provider, offset, 1_709_769_903_000).unwrap();

        assert_eq!(clock.now(), "2024-3-7 9:5:3");

        provider.uptime_ms.set(5_000 + 61_000);
        assert_eq!(clock.now(), "2024-3-7 9:6:4");
    }

    #[test]
    fn test_resync_replaces_reference() {
        let provider = ManualProvider {
            uptime_ms: Cell::new(0),
        };
        let mut clock = SyncedClock::new(&provider, UtcOffset::UTC, 0).unwrap();
        assert_eq!(clock.now(), "1970-1-1 0:0:0");

        provider.uptime_ms.set(10_000);
        clock.resync(86_400_000).unwrap();
        assert_eq!(clock.now(), "1970-1-2 0:0:0");
    }

    #[test]
    fn test_rejects_out_of_range_time() {
        let provider = ManualProvider {
            uptime_ms: Cell::new(0),
        };

        assert!(matches!(
            SyncedClock::new(&provider, UtcOffset::UTC, i64::MAX),
            Err(Error::InvalidTimestamp(_))
        ));
    }
}
