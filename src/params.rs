//! Strongly typed parameter enumerations for the HX711 driver.
//!
//! These enums map directly to datasheet encodings and are used across
//! [`Config`](crate::config::Config) and the high-level driver APIs.
//!
//! # Examples
//!
//! ```rust
//! use hx711_irq::params::{Gain, SampleMode};
//!
//! let gain = Gain::A128;
//! assert_eq!(gain.pulses(), 1);
//! assert_eq!(Gain::try_from(64u8), Ok(Gain::A64));
//! let _ = SampleMode::ScaledUnits;
//! ```

/// Input channel and amplification selected for the next conversion.
///
/// The discriminant is the number of clock pulses issued after the 24 data
/// bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    /// Channel A, gain 128.
    A128 = 1,
    /// Channel B, gain 32.
    B32 = 2,
    /// Channel A, gain 64.
    A64 = 3,
}

impl Gain {
    /// Number of extra clock pulses that select this gain.
    pub const fn pulses(self) -> u8 {
        self as u8
    }

    /// Amplification factor applied by the front end.
    pub const fn factor(self) -> u8 {
        match self {
            Self::A128 => 128,
            Self::B32 => 32,
            Self::A64 => 64,
        }
    }

    /// Maps an amplification factor to its gain selection.
    pub const fn from_factor(factor: u8) -> Option<Self> {
        match factor {
            128 => Some(Self::A128),
            64 => Some(Self::A64),
            32 => Some(Self::B32),
            _ => None,
        }
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::A128
    }
}

/// Rejected amplification factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidGain(pub u8);

impl TryFrom<u8> for Gain {
    type Error = InvalidGain;

    fn try_from(factor: u8) -> core::result::Result<Self, Self::Error> {
        Self::from_factor(factor).ok_or(InvalidGain(factor))
    }
}

/// Finalization formula applied when an acquisition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleMode {
    /// Plain average of the raw readings.
    RawAverage,
    /// Average minus the tare offset.
    OffsetValue,
    /// Average minus the tare offset, divided by the scale.
    ScaledUnits,
}

/// Clock pulse pacing used by the bit-banged transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseTiming {
    /// Rely on GPIO access latency; suitable for slow cores such as AVR.
    Natural,
    /// Hold every clock edge for [`PULSE_HOLD_US`] microseconds.
    Compensated,
}

/// Hold time applied after each clock edge in [`PulseTiming::Compensated`].
pub const PULSE_HOLD_US: u32 = 1;

impl PulseTiming {
    /// Returns the delay inserted after each clock edge, if any.
    pub const fn hold_us(self) -> Option<u32> {
        match self {
            Self::Natural => None,
            Self::Compensated => Some(PULSE_HOLD_US),
        }
    }
}
