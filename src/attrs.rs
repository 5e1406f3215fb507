//! Textual attribute surface.
//!
//! Mirrors the classic per-device control files: each logical channel
//! exposes a flat set of named attributes read and written as text. The
//! platform glue maps whatever its control transport is (sysfs files, a
//! debug shell, an RPC verb) onto [`read_attr`] / [`write_attr`]; all
//! parsing, validation, and formatting lives here so every transport
//! behaves identically.
//!
//! Numbers parse with self-describing radix: `0x` prefix is hex, a
//! leading `0` is octal, anything else decimal. Trailing whitespace and
//! newlines (echo-style writes) are accepted.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::String;

use crate::config::RangeMode;
use crate::device::{Isl29028, ALS_FIXED_PERIOD_NS};
use crate::error::{Error, Result};
use crate::ports::{EventSink, HostServices, IrqControl};

/// Longest rendered attribute value: a u64 plus the trailing newline.
pub const ATTR_VALUE_CAPACITY: usize = 24;

/// Rendered attribute value, newline-terminated like a sysfs read.
pub type AttrValue = String<ATTR_VALUE_CAPACITY>;

/// The two logical input channels an attribute can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Light,
    Proximity,
}

/// Reads one attribute as text.
///
/// | name            | Light                      | Proximity            |
/// |-----------------|----------------------------|----------------------|
/// | `enable`        | channel enabled (0/1)      | channel enabled      |
/// | `poll_delay`    | fixed 800000000 ns         | sampling period (ns) |
/// | `range`         | range in effect (0/1)      | —                    |
/// | `sensitivity`   | window percent             | —                    |
/// | `null_value`    | —                          | baseline counts      |
/// | `dump_period`   | poll period (ms, 0 = irq)  | same store           |
/// | `dump_output`   | sample logging (0/1)       | same store           |
/// | `dump_register` | register dump on reconcile | same store           |
pub fn read_attr<B, I, H, E, D>(
    dev: &Isl29028<B, I, H, E, D>,
    channel: Channel,
    name: &str,
) -> Result<AttrValue>
where
    B: I2c,
    I: IrqControl,
    H: HostServices,
    E: EventSink,
    D: DelayNs,
{
    let value: u64 = match (channel, name) {
        (Channel::Light, "enable") => dev.als_enabled().into(),
        (Channel::Light, "poll_delay") => ALS_FIXED_PERIOD_NS,
        (Channel::Light, "range") => dev.als_range_attr(),
        (Channel::Light, "sensitivity") => dev.als_sensitivity().into(),

        (Channel::Proximity, "enable") => dev.prox_enabled().into(),
        (Channel::Proximity, "poll_delay") => dev.prox_period_ns(),
        (Channel::Proximity, "null_value") => dev.prox_null_value().into(),

        (_, "dump_period") => dev.dump_period_ms().into(),
        (_, "dump_output") => dev.dump_output().into(),
        (_, "dump_register") => dev.dump_registers().into(),

        _ => return Err(Error::Invalid("unknown attribute")),
    };

    render(value)
}

/// Writes one attribute from text. Validation happens before any state
/// or hardware mutation; a rejected write leaves the device untouched.
pub fn write_attr<B, I, H, E, D>(
    dev: &mut Isl29028<B, I, H, E, D>,
    channel: Channel,
    name: &str,
    raw: &str,
) -> Result<()>
where
    B: I2c,
    I: IrqControl,
    H: HostServices,
    E: EventSink,
    D: DelayNs,
{
    let value = parse_number(raw)?;

    match (channel, name) {
        (Channel::Light, "enable") => dev.set_als_enabled(value != 0),
        // The light converter runs at a fixed period; the write is
        // parse-validated for interface symmetry and otherwise ignored.
        (Channel::Light, "poll_delay") => Ok(()),
        (Channel::Light, "range") => dev.set_als_range(RangeMode::from_attr(value)),
        (Channel::Light, "sensitivity") => {
            let percent = u32::try_from(value)
                .map_err(|_| Error::Invalid("sensitivity above 100 percent"))?;
            dev.set_als_sensitivity(percent)
        }

        (Channel::Proximity, "enable") => dev.set_prox_enabled(value != 0),
        (Channel::Proximity, "poll_delay") => dev.set_prox_period_ns(value),
        (Channel::Proximity, "null_value") => dev.set_prox_null_value(value),

        (_, "dump_period") => {
            let ms = u32::try_from(value).map_err(|_| Error::Invalid("dump period too large"))?;
            dev.set_dump_period_ms(ms)
        }
        (_, "dump_output") => dev.set_dump_output(value != 0),
        (_, "dump_register") => dev.set_dump_registers(value != 0),

        _ => Err(Error::Invalid("unknown attribute")),
    }
}

fn render(value: u64) -> Result<AttrValue> {
    let mut out = AttrValue::new();
    writeln!(out, "{value}").map_err(|_| Error::Invalid("attribute value overflow"))?;
    Ok(out)
}

/// Integer parser with self-describing radix, `strtoul(_, _, 0)` style.
fn parse_number(raw: &str) -> Result<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Error::Invalid("empty attribute value"));
    }

    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };

    u64::from_str_radix(digits, radix).map_err(|_| Error::Invalid("malformed number"))
}
