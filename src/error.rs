//! Unified error types for the ISL29028 driver.
//!
//! A single `Error` enum that every layer converts into, keeping the
//! attribute surface and lifecycle paths uniform. All variants are `Copy`
//! so they pass through the dispatcher and reconciler without allocation.
//!
//! Bus failures are erased to [`embedded_hal::i2c::ErrorKind`] at the
//! point of occurrence so the crate error type stays non-generic over the
//! bus implementation.

use core::fmt;

use embedded_hal::i2c::ErrorKind as BusErrorKind;

use crate::ports::IrqError;

// ---------------------------------------------------------------------------
// Top-level driver error
// ---------------------------------------------------------------------------

/// Every fallible operation in the driver funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A register bus transaction failed. The logical state keeps the
    /// caller's intent; hardware catches up on the next reconciliation.
    Bus(BusErrorKind),
    /// The interrupt line rejected a wake/trigger change.
    Irq(IrqError),
    /// An attribute write or calibration value failed validation.
    /// Rejected before any hardware mutation.
    Invalid(&'static str),
    /// A proximity calibration value cannot fit under the threshold
    /// ceiling even after clamping.
    OutOfRange,
    /// The chip did not answer at attach time.
    NoDevice,
    /// The platform setup/teardown hook failed.
    Setup(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "bus: {kind}"),
            Self::Irq(e) => write!(f, "irq: {e}"),
            Self::Invalid(msg) => write!(f, "invalid input: {msg}"),
            Self::OutOfRange => write!(f, "calibration out of range"),
            Self::NoDevice => write!(f, "no ISL29028 detected"),
            Self::Setup(msg) => write!(f, "platform setup: {msg}"),
        }
    }
}

impl From<IrqError> for Error {
    fn from(e: IrqError) -> Self {
        Self::Irq(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
