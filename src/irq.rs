//! Ready-edge detection seam.
//!
//! The converter pulls `DOUT` low once a conversion is available. The driver
//! arms a falling-edge interrupt on that line while an acquisition is in
//! flight and disarms it for the duration of every read, so the handler can
//! never re-enter itself.

/// Falling-edge interrupt source on the data line.
///
/// Implementations typically wrap the HAL's `listen(FallingEdge)` and
/// `unlisten()` calls. The ISR bound to the source must call
/// [`Hx711::on_ready`](crate::Hx711::on_ready), usually through a
/// [`SharedHx711`](crate::shared::SharedHx711).
pub trait ReadyInterrupt {
    /// Enables the falling-edge interrupt.
    ///
    /// `DOUT` toggles while the data bits are shifted out, so edges latched
    /// while the source was disarmed must be discarded here before the
    /// interrupt is unmasked. [`Hx711::on_ready`](crate::Hx711::on_ready)
    /// re-arms without reading when it finds the line high, so a stale edge
    /// that slips through costs one spurious call, not a corrupt sample.
    fn arm(&mut self);

    /// Disables the falling-edge interrupt and clears any pending edge.
    fn disarm(&mut self);
}

impl<T: ReadyInterrupt + ?Sized> ReadyInterrupt for &mut T {
    fn arm(&mut self) {
        (**self).arm();
    }

    fn disarm(&mut self) {
        (**self).disarm();
    }
}

/// Interrupt source for polled operation.
///
/// With no edge interrupt wired up, the caller drives acquisitions with
/// [`Hx711::poll`](crate::Hx711::poll) or the blocking helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoInterrupt;

impl ReadyInterrupt for NoInterrupt {
    fn arm(&mut self) {}

    fn disarm(&mut self) {}
}
