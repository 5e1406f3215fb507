//! Port traits — the boundary between the driver core and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ Isl29028 (driver core)
//! ```
//!
//! The register bus itself is not declared here: the core consumes the
//! `embedded-hal` [`I2c`](embedded_hal::i2c::I2c) and
//! [`DelayNs`](embedded_hal::delay::DelayNs) traits directly. Everything
//! the driver asks of the surrounding system beyond the bus — interrupt
//! line control, timed wake locks, deferred polling, sample delivery —
//! goes through the traits below, so the whole core runs on the host with
//! mock adapters.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Interrupt line (driven adapter: driver → irq controller)
// ───────────────────────────────────────────────────────────────

/// Electrical trigger level of the interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Interrupt asserted while the line is low (chip default).
    ActiveLow,
    /// Interrupt asserted while the line is high; required to observe the
    /// object-departed edge while proximity is latched near.
    ActiveHigh,
}

/// Control surface of the interrupt line wired to the sensor INT pin.
///
/// `mask`/`unmask` are infallible on every platform this driver targets
/// and must be idempotent-safe to call; the core keeps its own masked
/// flag and never calls them redundantly.
pub trait IrqControl {
    /// Unmask the line so edges/levels reach the handler again.
    fn unmask(&mut self);

    /// Mask the line. Must not discard a wake configuration.
    fn mask(&mut self);

    /// Select the trigger polarity.
    fn set_trigger(&mut self, polarity: Polarity) -> Result<(), IrqError>;

    /// Make (or stop making) this line a system wake source.
    fn set_wake(&mut self, on: bool) -> Result<(), IrqError>;
}

// ───────────────────────────────────────────────────────────────
// Host services (driven adapter: driver → kernel/runtime)
// ───────────────────────────────────────────────────────────────

/// Timed wake lock plus deferred-poll scheduling.
///
/// `schedule_poll` arms a one-shot callback that must end up invoking
/// [`Isl29028::poll_tick`](crate::device::Isl29028::poll_tick) (through
/// whatever executor the platform uses). `cancel_poll` must cancel
/// synchronously: once it returns, no callback for a previously armed
/// poll may run. Re-arming while armed replaces the pending deadline.
pub trait HostServices {
    /// Keep the system awake for at least `ms` milliseconds so upper
    /// layers can react to a proximity event.
    fn wake_lock_timeout(&mut self, ms: u32);

    /// Arm (or re-arm) the periodic dump poll after `ms` milliseconds.
    fn schedule_poll(&mut self, ms: u32);

    /// Cancel any armed poll and wait for an in-flight one to finish.
    fn cancel_poll(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: driver → input subsystem)
// ───────────────────────────────────────────────────────────────

/// Sample delivery for the two logical input channels.
///
/// Mirrors the "lightsensor" and "proximity" input devices: light
/// reports a scaled absolute value, proximity reports a binary
/// near/far distance plus the raw register value.
pub trait EventSink {
    /// New ambient light sample. `mlux` is already scaled by range and
    /// platform factor; `raw` is the 12-bit converter output.
    fn report_light(&mut self, mlux: u32, raw: u16);

    /// New proximity sample. `near` follows the calibrated threshold
    /// window; `raw` is the 8-bit register value.
    fn report_proximity(&mut self, near: bool, raw: u8);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`IrqControl`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqError {
    /// The line cannot act as a wake source.
    WakeNotSupported,
    /// The requested trigger polarity is not available.
    TriggerNotSupported,
    /// The interrupt controller rejected the request.
    ControllerError,
}

impl fmt::Display for IrqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WakeNotSupported => write!(f, "wake not supported"),
            Self::TriggerNotSupported => write!(f, "trigger not supported"),
            Self::ControllerError => write!(f, "controller error"),
        }
    }
}
