//! Driver core for the Intersil ISL29028 ambient-light and proximity
//! sensor.
//!
//! The chip hangs off an I2C bus and raises one interrupt line; this
//! crate owns everything between the bus and the platform: register
//! programming, interrupt/poll dispatch, auto-ranging, proximity
//! detection with polarity flipping, power transitions, and a textual
//! attribute surface for runtime control.
//!
//! The platform supplies the collaborators as trait objects of its own:
//! an `embedded-hal` I2C bus and delay, plus the [`IrqControl`],
//! [`HostServices`], and [`EventSink`] ports. The whole core is
//! hardware-free and runs on the host under test with mock adapters.
//!
//! ```no_run
//! # fn demo<B, I, H, E, D>(bus: B, irq: I, host: H, events: E, delay: D)
//! #     -> isl29028::Result<()>
//! # where
//! #     B: embedded_hal::i2c::I2c,
//! #     I: isl29028::IrqControl,
//! #     H: isl29028::HostServices,
//! #     E: isl29028::EventSink,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! use isl29028::{Channel, Isl29028, PlatformConfig, SharedIsl29028};
//!
//! let config = PlatformConfig::builder().als_factor(2).build()?;
//! let mut device = Isl29028::new(bus, irq, host, events, delay, config);
//! device.attach()?;
//!
//! let shared = SharedIsl29028::new(device);
//! shared.open_prox()?;
//! shared.write_attr(Channel::Proximity, "enable", "1")?;
//! // Wire shared.handle_interrupt() / shared.poll_tick() into the
//! // platform's irq handler and deferred-work callback.
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub mod attrs;
pub mod config;
pub mod device;
pub mod ports;
pub mod registers;
pub mod shared;
pub mod tuning;

mod error;

pub use attrs::{read_attr, write_attr, AttrValue, Channel};
pub use config::{PlatformConfig, PlatformConfigBuilder, RangeMode};
pub use device::{Hooks, Isl29028, DEFAULT_ADDRESS};
pub use error::{Error, Result};
pub use ports::{EventSink, HostServices, IrqControl, IrqError, Polarity};
pub use shared::SharedIsl29028;
