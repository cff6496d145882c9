use serde::{Deserialize, Serialize};

use super::dht::DhtModel;

/// Minimum settling times around each sensor access in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlingSchedule {
    /// Added on top of the climate sensor's minimum sampling period
    pub climate_margin_ms: u32,
    /// Lets the particulate sensor fill the UART buffer before decoding
    pub particulate_settle_ms: u32,
    /// Pause after each decode attempt
    pub post_decode_ms: u32,
}

impl SettlingSchedule {
    pub fn climate_settle_ms(&self, model: DhtModel) -> u32 {
        model
            .minimum_sampling_period_ms()
            .saturating_add(self.climate_margin_ms)
    }

    /// Earliest offset from cycle start at which the particulate frame may be read.
    pub fn particulate_ready_ms(&self, model: DhtModel) -> u32 {
        self.climate_settle_ms(model)
            .saturating_add(self.particulate_settle_ms)
    }

    /// Total delay of a cycle that reaches the decoder.
    pub fn full_cycle_ms(&self, model: DhtModel) -> u32 {
        self.particulate_ready_ms(model)
            .saturating_add(self.post_decode_ms)
    }
}

impl Default for SettlingSchedule {
    fn default() -> Self {
        Self {
            climate_margin_ms: 500,
            particulate_settle_ms: 1000,
            post_decode_ms: 500,
        }
    }
}

#[cfg(test)]
pub mod mock {
    use core::cell::Cell;

    use alloc::rc::Rc;

    use embedded_hal_async::delay::DelayNs;

    /// Delay that advances a shared virtual clock instead of sleeping.
    #[derive(Debug, Clone, Default)]
    pub struct VirtualDelay {
        now_ns: Rc<Cell<u64>>,
    }

    impl VirtualDelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now_ms(&self) -> u64 {
            self.now_ns.get() / 1_000_000
        }
    }

    impl DelayNs for VirtualDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.now_ns.set(self.now_ns.get() + ns as u64);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.now_ns.set(self.now_ns.get() + ms as u64 * 1_000_000);
        }
    }
}
