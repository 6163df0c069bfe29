//! Error definitions for the GC2607 driver.
//!
//! Every type is generic over the I2C bus error so callers keep the HAL's own error value.

use core::fmt;

/// A single register transaction failed on the control bus.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IoError<E> {
    /// Register the transaction targeted.
    pub address: u16,
    /// Error reported by the I2C implementation.
    pub cause: E,
}

impl<E: fmt::Debug> fmt::Display for IoError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2C error at register {:#06x}: {:?}", self.address, self.cause)
    }
}

/// A register program stopped partway. The sensor may be left partially programmed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProgramError<E> {
    /// Position of the failing operation within the program.
    pub index: usize,
    /// Register the failing write targeted.
    pub address: u16,
    /// Error reported by the I2C implementation.
    pub cause: E,
}

impl<E: fmt::Debug> fmt::Display for ProgramError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "register program failed at index {} (register {:#06x}): {:?}",
            self.index, self.address, self.cause
        )
    }
}

/// A power resource could not be enabled during power-on.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerError {
    /// Enabling the regulator set failed.
    Regulator,
    /// Enabling the master clock failed; the regulators were switched back off.
    Clock,
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerError::Regulator => write!(f, "failed to enable regulators"),
            PowerError::Clock => write!(f, "failed to enable master clock"),
        }
    }
}

/// Chip identity verification failed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DetectError<E> {
    /// Reading an identity register failed.
    Io(IoError<E>),
    /// The part answered with a different identity. Not retryable.
    UnexpectedId { expected: u16, actual: u16 },
}

impl<E> DetectError<E> {
    /// True when the error means "this is not the expected device".
    pub fn is_absent(&self) -> bool {
        matches!(self, DetectError::UnexpectedId { .. })
    }
}

impl<E> From<IoError<E>> for DetectError<E> {
    fn from(e: IoError<E>) -> Self {
        DetectError::Io(e)
    }
}

impl<E: fmt::Debug> fmt::Display for DetectError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::Io(e) => write!(f, "chip id read failed: {}", e),
            DetectError::UnexpectedId { expected, actual } => {
                write!(f, "wrong chip id: expected {:#06x}, got {:#06x}", expected, actual)
            }
        }
    }
}

/// Stream enable failed; the sensor is idle and the power reference has been returned.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamError<E> {
    /// Acquiring the power reference failed.
    PowerOn(PowerError),
    /// The active mode's register program failed.
    Program(ProgramError<E>),
}

impl<E: fmt::Debug> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::PowerOn(e) => write!(f, "power on failed: {}", e),
            StreamError::Program(e) => write!(f, "sensor initialization failed: {}", e),
        }
    }
}

/// A format change could not be applied.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatError {
    /// The active format cannot change while streaming.
    Busy,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Busy => write!(f, "cannot change format while streaming"),
        }
    }
}

/// Attach-time failure. Any power reference taken for the check has been returned.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProbeError<E> {
    /// The sensor could not be powered for identification.
    PowerOn(PowerError),
    /// Identity verification failed.
    Detect(DetectError<E>),
}

impl<E: fmt::Debug> fmt::Display for ProbeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::PowerOn(e) => write!(f, "failed to power on sensor: {}", e),
            ProbeError::Detect(e) => write!(f, "failed to detect sensor: {}", e),
        }
    }
}
