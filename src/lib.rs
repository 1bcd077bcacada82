#![cfg_attr(not(test), no_std)]

mod error;
mod log;

pub mod acquisition;
pub mod config;
pub mod conversion;
pub mod device;
pub mod interface;
pub mod irq;
pub mod params;
pub mod shared;

pub use crate::acquisition::{AcquisitionState, Calibration, CompletionSink};
pub use crate::config::Config;
pub use crate::device::Hx711;
pub use crate::error::{Error, Result};
pub use crate::interface::bitbang::BitBangInterface;
pub use crate::interface::Hx711Interface;
pub use crate::irq::{NoInterrupt, ReadyInterrupt};
pub use crate::params::{Gain, PulseTiming, SampleMode};
pub use crate::shared::SharedHx711;
