use alloc::format;
use alloc::string::String;

use time::OffsetDateTime;

/// Monotonic milliseconds since boot.
pub trait TimeProvider {
    fn uptime_ms(&self) -> u64;
}

/// Wall-clock source backed by an already synchronized clock.
pub trait TimestampSource {
    /// Current local time as `Y-M-D h:m:s`
    fn now(&self) -> String;
}

/// Formats a date-time the way records are stored remotely.
///
/// Components are not zero padded, e.g. `2024-3-7 9:5:3`.
pub fn format_timestamp(datetime: OffsetDateTime) -> String {
    format!(
        "{}-{}-{} {}:{}:{}",
        datetime.year(),
        u8::from(datetime.month()),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second()
    )
}
