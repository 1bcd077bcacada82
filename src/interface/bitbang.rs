//! Bit-banged interface built on top of `embedded-hal` digital pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::Hx711Interface;
use crate::conversion::{ConversionWord, CONVERSION_BYTES};
use crate::params::{Gain, PulseTiming};

/// GPIO-based interface implementation for the HX711 driver.
pub struct BitBangInterface<CLK, DATA, D> {
    clock: CLK,
    data: DATA,
    delay: D,
    timing: PulseTiming,
}

impl<CLK, DATA, D> BitBangInterface<CLK, DATA, D> {
    /// Creates a new interface from the clock (`PD_SCK`) and data (`DOUT`) lines.
    pub const fn new(clock: CLK, data: DATA, delay: D, timing: PulseTiming) -> Self {
        Self {
            clock,
            data,
            delay,
            timing,
        }
    }

    /// Returns the configured pulse pacing.
    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    /// Changes the pulse pacing.
    pub fn set_timing(&mut self, timing: PulseTiming) {
        self.timing = timing;
    }

    /// Provides mutable access to the wrapped data line.
    pub fn data_mut(&mut self) -> &mut DATA {
        &mut self.data
    }

    /// Consumes the interface and returns the owned lines and delay.
    pub fn release(self) -> (CLK, DATA, D) {
        (self.clock, self.data, self.delay)
    }
}

impl<CLK, DATA, D, E> BitBangInterface<CLK, DATA, D>
where
    CLK: OutputPin<Error = E>,
    DATA: InputPin<Error = E>,
    D: DelayNs,
{
    #[inline]
    fn hold(&mut self) {
        if let Some(us) = self.timing.hold_us() {
            self.delay.delay_us(us);
        }
    }

    fn pulse(&mut self) -> core::result::Result<(), E> {
        self.clock.set_high()?;
        self.hold();
        self.clock.set_low()?;
        self.hold();
        Ok(())
    }

    fn shift_in_byte(&mut self) -> core::result::Result<u8, E> {
        let mut value = 0u8;
        for _ in 0..8 {
            self.clock.set_high()?;
            self.hold();
            value = (value << 1) | u8::from(self.data.is_high()?);
            self.clock.set_low()?;
            self.hold();
        }
        Ok(value)
    }
}

impl<CLK, DATA, D, E> Hx711Interface for BitBangInterface<CLK, DATA, D>
where
    CLK: OutputPin<Error = E>,
    DATA: InputPin<Error = E>,
    D: DelayNs,
{
    type Error = E;

    fn read_raw(&mut self) -> core::result::Result<i32, Self::Error> {
        let mut bytes = [0u8; CONVERSION_BYTES];
        for byte in bytes.iter_mut() {
            *byte = self.shift_in_byte()?;
        }
        Ok(ConversionWord::from_be_bytes(bytes).value())
    }

    fn select_gain(&mut self, gain: Gain) -> core::result::Result<(), Self::Error> {
        for _ in 0..gain.pulses() {
            self.pulse()?;
        }
        Ok(())
    }

    fn power_up(&mut self) -> core::result::Result<(), Self::Error> {
        self.clock.set_low()
    }

    fn power_down(&mut self) -> core::result::Result<(), Self::Error> {
        self.clock.set_low()?;
        self.clock.set_high()
    }

    fn is_ready(&mut self) -> core::result::Result<bool, Self::Error> {
        self.data.is_low()
    }
}

#[cfg(test)]
mod tests {
    use super::BitBangInterface;
    use crate::interface::Hx711Interface;
    use crate::params::{Gain, PulseTiming};
    use embedded_hal::delay::DelayNs;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[derive(Default)]
    struct CountingDelay {
        total_ns: u64,
        calls: usize,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
            self.calls += 1;
        }
    }

    fn clock_pulses(count: usize) -> Vec<Transaction> {
        let mut expectations = Vec::with_capacity(count * 2);
        for _ in 0..count {
            expectations.push(Transaction::set(State::High));
            expectations.push(Transaction::set(State::Low));
        }
        expectations
    }

    fn data_bits(bytes: [u8; 3]) -> Vec<Transaction> {
        bytes
            .iter()
            .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1 == 1))
            .map(|high| Transaction::get(if high { State::High } else { State::Low }))
            .collect()
    }

    #[test]
    fn read_raw_shifts_msb_first_and_sign_extends() {
        let mut clock = PinMock::new(&clock_pulses(24));
        let mut data = PinMock::new(&data_bits([0xFF, 0xFF, 0xFE]));
        let mut interface =
            BitBangInterface::new(clock.clone(), data.clone(), NoopDelay::new(), PulseTiming::Natural);

        assert_eq!(interface.read_raw().unwrap(), -2);

        clock.done();
        data.done();
    }

    #[test]
    fn read_conversion_appends_gain_pulses() {
        let mut clock = PinMock::new(&clock_pulses(24 + 3));
        let mut data = PinMock::new(&data_bits([0x00, 0x01, 0x00]));
        let mut interface =
            BitBangInterface::new(clock.clone(), data.clone(), NoopDelay::new(), PulseTiming::Natural);

        assert_eq!(interface.read_conversion(Gain::A64).unwrap(), 0x100);

        clock.done();
        data.done();
    }

    #[test]
    fn select_gain_pulses_once_per_code() {
        let mut clock = PinMock::new(&clock_pulses(2));
        let mut data = PinMock::new(&[] as &[Transaction]);
        let mut interface =
            BitBangInterface::new(clock.clone(), data.clone(), NoopDelay::new(), PulseTiming::Natural);

        interface.select_gain(Gain::B32).unwrap();

        clock.done();
        data.done();
    }

    #[test]
    fn compensated_timing_holds_every_edge() {
        let mut clock = PinMock::new(&clock_pulses(24 + 1));
        let mut data = PinMock::new(&data_bits([0x00, 0x00, 0x00]));
        let mut interface = BitBangInterface::new(
            clock.clone(),
            data.clone(),
            CountingDelay::default(),
            PulseTiming::Compensated,
        );

        interface.read_conversion(Gain::A128).unwrap();
        let (_, _, delay) = interface.release();
        assert_eq!(delay.calls, 50);
        assert_eq!(delay.total_ns, 50_000);

        clock.done();
        data.done();
    }

    #[test]
    fn power_transitions_drive_clock_line() {
        let mut clock = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut data = PinMock::new(&[
            Transaction::get(State::High),
            Transaction::get(State::Low),
        ]);
        let mut interface =
            BitBangInterface::new(clock.clone(), data.clone(), NoopDelay::new(), PulseTiming::Natural);

        interface.power_down().unwrap();
        interface.power_up().unwrap();
        assert!(!interface.is_ready().unwrap());
        assert!(interface.is_ready().unwrap());

        clock.done();
        data.done();
    }
}
