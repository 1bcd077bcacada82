//! Configuration primitives for the HX711 driver.

use crate::params::{Gain, PulseTiming};

/// Interval used by blocking helpers when polling for completion.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// User-facing configuration for the HX711 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Channel and gain selected at [`begin`](crate::Hx711::begin).
    pub gain: Gain,
    /// Clock pulse pacing of the bit-banged transport.
    pub pulse_timing: PulseTiming,
    /// Poll period of [`tare`](crate::Hx711::tare) and the `wait_ready*` helpers.
    pub poll_interval_ms: u32,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the initial gain selection.
    pub fn gain(mut self, gain: Gain) -> Self {
        self.config.gain = gain;
        self
    }

    /// Overrides the clock pulse pacing.
    pub fn pulse_timing(mut self, timing: PulseTiming) -> Self {
        self.config.pulse_timing = timing;
        self
    }

    /// Overrides the completion poll period. Zero is clamped to one millisecond.
    pub fn poll_interval_ms(mut self, interval: u32) -> Self {
        self.config.poll_interval_ms = interval.max(1);
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gain: Gain::A128,
            pulse_timing: PulseTiming::Compensated,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
