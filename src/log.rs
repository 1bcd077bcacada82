//! Internal logging shims.
//!
//! The `log_` prefix keeps the names clear of the built-in `warn` lint
//! attribute. With the `defmt` feature the macros forward to `defmt`; otherwise they
//! expand to nothing so the read handler stays free of formatting code.

#[cfg(feature = "defmt")]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "defmt")]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "defmt")]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{}};
}

pub(crate) use {log_debug, log_trace, log_warn};
