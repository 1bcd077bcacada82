//! Interrupt-safe home for a driver instance.
//!
//! Edge interrupt handlers are context-free functions, so the driver they
//! service has to live in a `static`. [`SharedHx711`] wraps it in a
//! [`critical_section::Mutex`] and exposes the operations mainline code and
//! the ISR need. Declare one static per converter:
//!
//! ```ignore
//! static SCALE: SharedHx711<Iface, Irq> = SharedHx711::new();
//!
//! #[handler]
//! fn gpio_isr() {
//!     let _ = SCALE.on_ready();
//! }
//! ```
//!
//! Completion sinks run while the slot is borrowed and must not call back
//! into the same `SharedHx711`.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use crate::acquisition::{AcquisitionState, CompletionSink};
use crate::device::Hx711;
use crate::error::{Error, Result};
use crate::interface::Hx711Interface;
use crate::irq::ReadyInterrupt;
use crate::params::SampleMode;

/// Driver slot shared between mainline code and the ready-edge ISR.
pub struct SharedHx711<IFACE, IRQ> {
    slot: Mutex<RefCell<Option<Hx711<IFACE, IRQ>>>>,
}

impl<IFACE, IRQ> Default for SharedHx711<IFACE, IRQ> {
    fn default() -> Self {
        Self::new()
    }
}

impl<IFACE, IRQ> SharedHx711<IFACE, IRQ> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Moves a driver into the slot, returning the previous occupant.
    pub fn install(&self, device: Hx711<IFACE, IRQ>) -> Option<Hx711<IFACE, IRQ>> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).replace(device))
    }

    /// Removes the driver from the slot.
    pub fn take(&self) -> Option<Hx711<IFACE, IRQ>> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }

    /// Runs `f` on the driver inside a critical section.
    ///
    /// Returns `None` when the slot is empty.
    pub fn with<R>(&self, f: impl FnOnce(&mut Hx711<IFACE, IRQ>) -> R) -> Option<R> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Returns `true` when a finalized result has not been consumed yet.
    pub fn is_result_ready(&self) -> bool {
        self.with(|device| device.is_result_ready()).unwrap_or(false)
    }
}

impl<IFACE, IRQ, E> SharedHx711<IFACE, IRQ>
where
    IFACE: Hx711Interface<Error = E>,
    IRQ: ReadyInterrupt,
{
    fn try_with<R>(&self, f: impl FnOnce(&mut Hx711<IFACE, IRQ>) -> Result<R, E>) -> Result<R, E> {
        self.with(f).unwrap_or(Err(Error::NotInstalled))
    }

    /// Ready-edge handler; call from the data line's falling-edge ISR.
    pub fn on_ready(&self) -> Result<(), E> {
        self.try_with(|device| device.on_ready())
    }

    /// Starts an acquisition atomically with respect to the ISR.
    pub fn start(&self, mode: SampleMode, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.try_with(|device| device.start(mode, count, sink))
    }

    /// See [`Hx711::start_average`].
    pub fn start_average(&self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::RawAverage, count, sink)
    }

    /// See [`Hx711::start_value`].
    pub fn start_value(&self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::OffsetValue, count, sink)
    }

    /// See [`Hx711::start_units`].
    pub fn start_units(&self, count: u16, sink: Option<CompletionSink>) -> Result<(), E> {
        self.start(SampleMode::ScaledUnits, count, sink)
    }

    /// Returns the last finalized result and clears the ready flag.
    pub fn consume_result(&self) -> Result<f32, E> {
        self.try_with(|device| Ok(device.consume_result()))
    }

    /// Averages `count` conversions delivered by the ISR and stores the average as offset.
    ///
    /// Blocks, sleeping on `delay` between checks of the ready flag. The
    /// critical section is only held for each check, so the ISR keeps running.
    /// Fails with [`Error::Aborted`] if the ISR abandons the acquisition.
    pub fn tare(&self, count: u16, delay: &mut impl DelayNs) -> Result<i32, E> {
        let interval = self.try_with(|device| {
            device.start(SampleMode::RawAverage, count, None)?;
            Ok(device.config().poll_interval_ms)
        })?;

        loop {
            let done = self.try_with(|device| {
                if !device.is_result_ready() {
                    if device.state() == AcquisitionState::Idle {
                        return Err(Error::Aborted);
                    }
                    return Ok(None);
                }
                device.consume_result();
                let average = device.last_average();
                device.set_offset(average);
                Ok(Some(average))
            })?;

            if let Some(offset) = done {
                return Ok(offset);
            }
            delay.delay_ms(interval);
        }
    }
}
