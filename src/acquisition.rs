//! Sample accumulation and finalization state machine.
//!
//! This module is free of any I/O: the driver feeds it one raw conversion per
//! ready edge and asks it to finalize once the requested count is reached.

use core::num::NonZeroU16;

use crate::params::SampleMode;

/// Callback invoked with the finalized result of an acquisition.
///
/// Runs in the context of the read handler, which is usually an ISR.
pub type CompletionSink = fn(f32);

/// Externally visible phase of the acquisition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionState {
    /// No acquisition in flight.
    Idle,
    /// Waiting for `remaining` more conversions.
    Acquiring {
        /// Conversions still to accumulate.
        remaining: u16,
    },
}

/// Zero reference and conversion factor applied at finalization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Raw reading that corresponds to an empty load cell.
    pub offset: i32,
    /// Raw counts per output unit.
    pub scale: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset: 0,
            scale: 1.0,
        }
    }
}

impl Calibration {
    /// Applies the finalization formula for `mode` to an averaged raw reading.
    ///
    /// No validation is performed: a zero scale yields an infinite or NaN result.
    pub fn apply(&self, mode: SampleMode, average: i32) -> f32 {
        let centered = i64::from(average) - i64::from(self.offset);
        match mode {
            SampleMode::RawAverage => average as f32,
            SampleMode::OffsetValue => centered as f32,
            SampleMode::ScaledUnits => centered as f32 / self.scale,
        }
    }
}

/// Running state of one acquisition plus the last finalized result.
#[derive(Debug, Clone, Copy)]
pub struct Acquisition {
    mode: SampleMode,
    remaining: u16,
    requested: u16,
    accumulator: i64,
    average: i32,
    result: f32,
    result_ready: bool,
    sink: Option<CompletionSink>,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition {
    /// Creates an idle state machine with a zeroed result.
    pub const fn new() -> Self {
        Self {
            mode: SampleMode::RawAverage,
            remaining: 0,
            requested: 0,
            accumulator: 0,
            average: 0,
            result: 0.0,
            result_ready: false,
            sink: None,
        }
    }

    /// Returns the current phase.
    pub fn state(&self) -> AcquisitionState {
        if self.remaining == 0 {
            AcquisitionState::Idle
        } else {
            AcquisitionState::Acquiring {
                remaining: self.remaining,
            }
        }
    }

    /// Returns `true` while conversions are still expected.
    pub fn is_active(&self) -> bool {
        self.remaining != 0
    }

    /// Mode of the current or last acquisition.
    pub fn mode(&self) -> SampleMode {
        self.mode
    }

    /// Sample count of the current or last acquisition.
    pub fn requested(&self) -> u16 {
        self.requested
    }

    /// Conversions still to accumulate.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// Resets accumulation and arms the state machine for `count` conversions.
    pub fn start(&mut self, mode: SampleMode, count: NonZeroU16, sink: Option<CompletionSink>) {
        self.mode = mode;
        self.remaining = count.get();
        self.requested = count.get();
        self.accumulator = 0;
        self.result_ready = false;
        self.sink = sink;
    }

    /// Adds one raw conversion and returns how many are still expected.
    ///
    /// Readings arriving while idle are ignored.
    pub fn record(&mut self, raw: i32) -> u16 {
        if self.remaining == 0 {
            return 0;
        }

        self.accumulator += i64::from(raw);
        self.remaining -= 1;
        self.remaining
    }

    /// Computes the result, raises the ready flag and notifies the sink.
    ///
    /// Must only be called once [`record`](Self::record) has returned zero.
    pub fn finalize(&mut self, calibration: &Calibration) -> f32 {
        let divisor = i64::from(self.requested.max(1));
        // Integer division truncates toward zero; the quotient of 24-bit
        // readings always fits in an i32.
        self.average = (self.accumulator / divisor) as i32;
        self.result = calibration.apply(self.mode, self.average);
        self.result_ready = true;

        if let Some(sink) = self.sink {
            sink(self.result);
        }

        self.result
    }

    /// Drops the in-flight acquisition without producing a result.
    pub fn abandon(&mut self) {
        self.remaining = 0;
        self.accumulator = 0;
    }

    /// Returns `true` when a finalized result has not been consumed yet.
    pub fn is_result_ready(&self) -> bool {
        self.result_ready
    }

    /// Returns the last finalized result and clears the ready flag.
    pub fn consume_result(&mut self) -> f32 {
        self.result_ready = false;
        self.result
    }

    /// Integer average behind the last finalized result.
    pub fn average(&self) -> i32 {
        self.average
    }
}
