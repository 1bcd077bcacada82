//! Error handling primitives for the HX711 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying GPIO lines.
    Interface(E),
    /// An acquisition is already in flight on this device.
    Busy,
    /// An acquisition was requested with a sample count of zero.
    NoSamples,
    /// The acquisition was abandoned before producing a result.
    Aborted,
    /// A bounded wait elapsed before the converter answered.
    Timeout,
    /// The shared slot does not hold a device yet.
    NotInstalled,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
