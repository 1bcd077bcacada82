//! High-level HX711 device driver implementation.

use core::num::NonZeroU16;

use crate::acquisition::{Acquisition, AcquisitionState, Calibration, CompletionSink};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::bitbang::BitBangInterface;
use crate::interface::Hx711Interface;
use crate::irq::ReadyInterrupt;
use crate::log::{log_debug, log_trace, log_warn};
use crate::params::{Gain, SampleMode};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Interrupt-driven driver for the HX711 load-cell converter.
///
/// Acquisitions are started from mainline code and progress one conversion
/// per ready edge through [`on_ready`](Self::on_ready). Only one acquisition
/// may be in flight at a time.
pub struct Hx711<IFACE, IRQ> {
    interface: IFACE,
    irq: IRQ,
    config: Config,
    gain: Gain,
    calibration: Calibration,
    acquisition: Acquisition,
}

impl<IFACE, IRQ> Hx711<IFACE, IRQ> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided transport and edge source.
    pub fn new(interface: IFACE, irq: IRQ, config: Config) -> Self {
        Self {
            interface,
            irq,
            gain: config.gain,
            config,
            calibration: Calibration::default(),
            acquisition: Acquisition::new(),
        }
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Provides mutable access to the ready-edge source.
    pub fn irq_mut(&mut self) -> &mut IRQ {
        &mut self.irq
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================================================================
    // == Gain & Calibration ============================================
    // ==================================================================
    /// Selects channel and gain from an amplification factor.
    ///
    /// Accepts 128 (channel A), 64 (channel A) and 32 (channel B). Any other
    /// factor leaves the current selection untouched. The new selection is
    /// clocked out after the next conversion and applies to the one after it.
    pub fn set_gain(&mut self, factor: u8) {
        match Gain::from_factor(factor) {
            Some(gain) => self.gain = gain,
            None => log_warn!("hx711: ignoring unsupported gain factor {}", factor),
        }
    }

    /// Selects channel and gain.
    pub fn set_gain_selection(&mut self, gain: Gain) {
        self.gain = gain;
    }

    /// Returns the current channel and gain selection.
    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Sets the divisor used by [`start_units`](Self::start_units). Not validated.
    pub fn set_scale(&mut self, scale: f32) {
        self.calibration.scale = scale;
    }

    /// Returns the units divisor.
    pub fn scale(&self) -> f32 {
        self.calibration.scale
    }

    /// Sets the zero reference subtracted by value and units acquisitions.
    pub fn set_offset(&mut self, offset: i32) {
        self.calibration.offset = offset;
    }

    /// Returns the zero reference.
    pub fn offset(&self) -> i32 {
        self.calibration.offset
    }

    /// Returns offset and scale together.
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    // ==================================================================
    // == Result Access =================================================
    // ==================================================================
    /// Returns the phase of the acquisition state machine.
    pub fn state(&self) -> AcquisitionState {
        self.acquisition.state()
    }

    /// Returns `true` when a finalized result has not been consumed yet.
    pub fn is_result_ready(&self) -> bool {
        self.acquisition.is_result_ready()
    }

    /// Returns the last finalized result and clears the ready flag.
    ///
    /// Before any acquisition completes this returns `0.0`; check
    /// [`is_result_ready`](Self::is_result_ready) first.
    pub fn consume_result(&mut self) -> f32 {
        self.acquisition.consume_result()
    }

    /// Integer average behind the last finalized result, before calibration.
    pub fn last_average(&self) -> i32 {
        self.acquisition.average()
    }
}

impl<CLK, DATA, D, IRQ, E> Hx711<BitBangInterface<CLK, DATA, D>, IRQ>
where
    CLK: OutputPin<Error = E>,
    DATA: InputPin<Error = E>,
    D: DelayNs,
{
    // ==================================================================
    // == Bit-Bang Convenience Constructors =============================
    // ==================================================================
    /// Convenience constructor for GPIO transports.
    pub fn new_bitbang(clock: CLK, data: DATA, delay: D, irq: IRQ, config: Config) -> Self {
        let interface = BitBangInterface::new(clock, data, delay, config.pulse_timing);
        Self::new(interface, irq, config)
    }
}

impl<IFACE, IRQ, E> Hx711<IFACE, IRQ>
where
    IFACE: Hx711Interface<Error = E>,
    IRQ: ReadyInterrupt,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Applies the configured gain, powers the converter down and arms the ready edge.
    pub fn begin(&mut self) -> Result<(), E> {
        self.gain = self.config.gain;
        self.interface.power_down()?;
        self.irq.arm();
        log_debug!("hx711: ready, gain {}", self.gain);
        Ok(())
    }

    /// Disarms the ready edge and returns the owned parts.
    pub fn release(mut self) -> (IFACE, IRQ, Config) {
        self.irq.disarm();
        (self.interface, self.irq, self.config)
    }

    /// Wakes the converter. A conversion becomes available after its settling time.
    pub fn power_up(&mut self) -> Result<(), E> {
        self.interface.power_up().map_err(Error::from)
    }

    /// Puts the converter into power-down.
    pub fn power_down(&mut self) -> Result<(), E> {
        self.interface.power_down().map_err(Error::from)
    }

    /// Returns `true` while the converter holds the data line low.
    pub fn is_ready(&mut self) -> Result<bool, E> {
        self.interface.is_ready().map_err(Error::from)
    }

    // ==================================================================
    // == Asynchronous Acquisition ======================================
    // ==================================================================
    /// Starts averaging `count` raw conversions.
    pub fn start_average(&mut self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::RawAverage, count, sink)
    }

    /// Starts averaging `count` conversions and subtracting the offset.
    pub fn start_value(&mut self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::OffsetValue, count, sink)
    }

    /// Starts averaging `count` conversions, subtracting the offset and dividing by the scale.
    pub fn start_units(&mut self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::ScaledUnits, count, sink)
    }

    /// Starts an acquisition and returns without waiting for it.
    ///
    /// The result is produced by [`on_ready`](Self::on_ready) after `count`
    /// ready edges; `sink` is then called with it from the handler context.
    pub fn start(
        &mut self,
        mode: SampleMode,
        count: u16,
        sink: Option<CompletionSink>,
    ) -> Result<(), E> {
        if self.acquisition.is_active() {
            return Err(Error::Busy);
        }
        let count = NonZeroU16::new(count).ok_or(Error::NoSamples)?;

        self.acquisition.start(mode, count, sink);
        log_debug!("hx711: start {} x{}", mode, count.get());

        if let Err(err) = self.interface.power_up() {
            self.acquisition.abandon();
            return Err(Error::Interface(err));
        }
        self.irq.arm();
        Ok(())
    }

    /// Ready-edge handler: reads one conversion and advances the acquisition.
    ///
    /// Call this from the falling-edge ISR of the data line. The edge source is
    /// disarmed for the duration of the read and re-armed only while more
    /// conversions are needed. An edge that arrives while the data line is
    /// high is treated as stale and only re-arms the source. On a line error
    /// the acquisition is abandoned.
    pub fn on_ready(&mut self) -> Result<(), E> {
        self.irq.disarm();

        if !self.acquisition.is_active() {
            log_warn!("hx711: ready edge with no acquisition in flight");
            return Ok(());
        }

        match self.interface.is_ready() {
            Ok(true) => {}
            Ok(false) => {
                log_trace!("hx711: stale ready edge");
                self.irq.arm();
                return Ok(());
            }
            Err(err) => return Err(self.abort(err)),
        }

        let raw = match self.interface.read_conversion(self.gain) {
            Ok(raw) => raw,
            Err(err) => return Err(self.abort(err)),
        };

        let remaining = self.acquisition.record(raw);
        log_trace!("hx711: sample {}, {} remaining", raw, remaining);

        if remaining > 0 {
            self.irq.arm();
            return Ok(());
        }

        let powered_down = self.interface.power_down();
        self.acquisition.finalize(&self.calibration);
        powered_down.map_err(Error::from)
    }

    /// Services the acquisition without an interrupt.
    ///
    /// Reads one conversion if an acquisition is in flight and the converter
    /// is ready. Returns whether a conversion was taken.
    pub fn poll(&mut self) -> Result<bool, E> {
        if !self.acquisition.is_active() || !self.interface.is_ready()? {
            return Ok(false);
        }

        self.on_ready()?;
        Ok(true)
    }

    // ==================================================================
    // == Blocking Helpers ==============================================
    // ==================================================================
    /// Averages `count` raw conversions and stores the average as the offset.
    ///
    /// Blocks, polling at the configured interval, until the acquisition
    /// completes. Returns the new offset.
    pub fn tare(&mut self, count: u16, delay: &mut impl DelayNs) -> Result<i32, E> {
        self.start(SampleMode::RawAverage, count, None)?;

        while !self.acquisition.is_result_ready() {
            if !self.poll()? {
                delay.delay_ms(self.config.poll_interval_ms);
            }
        }

        Ok(self.apply_tare())
    }

    /// Like [`tare`](Self::tare) but gives up after roughly `timeout_ms`.
    pub fn tare_timeout(
        &mut self,
        count: u16,
        timeout_ms: u32,
        delay: &mut impl DelayNs,
    ) -> Result<i32, E> {
        self.start(SampleMode::RawAverage, count, None)?;

        let mut waited = 0u32;
        while !self.acquisition.is_result_ready() {
            if self.poll()? {
                continue;
            }
            if waited >= timeout_ms {
                self.irq.disarm();
                self.acquisition.abandon();
                self.interface.power_down()?;
                return Err(Error::Timeout);
            }
            delay.delay_ms(self.config.poll_interval_ms);
            waited = waited.saturating_add(self.config.poll_interval_ms);
        }

        Ok(self.apply_tare())
    }

    /// Blocks until the converter signals a conversion.
    pub fn wait_ready(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        while !self.interface.is_ready()? {
            delay.delay_ms(self.config.poll_interval_ms);
        }
        Ok(())
    }

    /// Checks readiness up to `retries` times. Returns whether the converter became ready.
    pub fn wait_ready_retry(&mut self, retries: u32, delay: &mut impl DelayNs) -> Result<bool, E> {
        for _ in 0..retries {
            if self.interface.is_ready()? {
                return Ok(true);
            }
            delay.delay_ms(self.config.poll_interval_ms);
        }
        Ok(false)
    }

    /// Waits for readiness, failing with [`Error::Timeout`] after roughly `timeout_ms`.
    pub fn wait_ready_timeout(&mut self, timeout_ms: u32, delay: &mut impl DelayNs) -> Result<(), E> {
        let mut waited = 0u32;
        while waited < timeout_ms {
            if self.interface.is_ready()? {
                return Ok(());
            }
            delay.delay_ms(self.config.poll_interval_ms);
            waited = waited.saturating_add(self.config.poll_interval_ms);
        }
        Err(Error::Timeout)
    }

    /// Takes one raw conversion synchronously, bypassing the acquisition machinery.
    ///
    /// Powers the converter up, waits for it, reads and powers it down again.
    pub fn read_blocking(&mut self, delay: &mut impl DelayNs) -> Result<i32, E> {
        if self.acquisition.is_active() {
            return Err(Error::Busy);
        }

        self.irq.disarm();
        self.interface.power_up()?;
        self.wait_ready(delay)?;
        let raw = self.interface.read_conversion(self.gain)?;
        self.interface.power_down()?;
        Ok(raw)
    }

    fn abort(&mut self, err: E) -> Error<E> {
        self.acquisition.abandon();
        let _ = self.interface.power_down();
        Error::Interface(err)
    }

    fn apply_tare(&mut self) -> i32 {
        self.acquisition.consume_result();
        self.calibration.offset = self.last_average();
        log_debug!("hx711: tare offset {}", self.calibration.offset);
        self.calibration.offset
    }
}
