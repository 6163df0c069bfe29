//! GC2607 Rust Driver
//!
//! Control-path driver for the GalaxyCore GC2607 1080p image sensor: power sequencing,
//! chip identification, mode selection and stream on/off over the I2C register bus.
//! The MIPI pixel path is not handled here. no-std, blocking embedded-hal 1.0 traits,
//! optional defmt or log output.

#![no_std]

mod fmt;

pub mod bus;
pub mod data_types;
pub mod driver;
pub mod error;
pub mod pm;
pub mod power;
pub mod registers;

pub use driver::Gc2607;
pub use error::{DetectError, FormatError, IoError, PowerError, ProbeError, ProgramError, StreamError};
pub use pm::{RuntimePm, RuntimePower, SuspendPolicy};
pub use power::{PowerResource, PowerResources};
pub use registers::DEFAULT_I2C_ADDRESS;
