use std::time::Duration;

use embedded_hal_async::delay::DelayNs;

/// Settling delays backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl DelayNs for TokioDelay {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(Duration::from_nanos(ns as u64)).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        tokio::time::sleep(Duration::from_millis(ms as u64)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delay_advances_timer() {
        let start = tokio::time::Instant::now();
        TokioDelay.delay_ms(1500).await;
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }
}
