use airsense_api::TimeProvider;
use embassy_time::Instant;

/// Monotonic uptime counted from an `embassy_time` instant, normally boot.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedTimeProvider {
    origin: Instant,
}

impl EmbeddedTimeProvider {
    pub fn new() -> Self {
        Self::since(Instant::now())
    }

    pub fn since(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl TimeProvider for EmbeddedTimeProvider {
    /// Zero while `origin` still lies in the future.
    fn uptime_ms(&self) -> u64 {
        Instant::now()
            .checked_duration_since(self.origin)
            .map_or(0, |elapsed| elapsed.as_millis())
    }
}

impl Default for EmbeddedTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}
