//! Transport abstraction for the HX711 serial link.

pub mod bitbang;

use crate::params::Gain;

/// Abstraction over the low-level line access required by the driver.
pub trait Hx711Interface {
    /// Error type produced by the concrete line implementation.
    type Error;

    /// Clocks out one conversion, MSB first, and returns it sign-extended.
    ///
    /// The converter must already have signalled readiness.
    fn read_raw(&mut self) -> core::result::Result<i32, Self::Error>;

    /// Issues the pulses that select channel and gain for the next conversion.
    fn select_gain(&mut self, gain: Gain) -> core::result::Result<(), Self::Error>;

    /// Releases the clock line so the converter starts converting.
    fn power_up(&mut self) -> core::result::Result<(), Self::Error>;

    /// Holds the clock line high so the converter enters power-down.
    fn power_down(&mut self) -> core::result::Result<(), Self::Error>;

    /// Returns `true` while the data line is held low by the converter.
    fn is_ready(&mut self) -> core::result::Result<bool, Self::Error>;

    /// Reads one conversion and programs the next gain in a single protected window.
    ///
    /// Any interruption while the clock is high stretches the pulse; past
    /// 60 us the converter powers down and the remaining bits read as ones.
    fn read_conversion(&mut self, gain: Gain) -> core::result::Result<i32, Self::Error> {
        critical_section::with(|_cs| {
            let value = self.read_raw()?;
            self.select_gain(gain)?;
            Ok(value)
        })
    }
}
