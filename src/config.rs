//! Platform configuration for one ISL29028 instance.
//!
//! All board-supplied tuning for the driver core: light calibration,
//! auto-range hysteresis thresholds, proximity threshold geometry, and
//! channel defaults. The record is immutable once attached; it is
//! assembled by [`PlatformConfigBuilder`], which validates every field
//! before the driver touches hardware. Invalid values are rejected, not
//! silently clamped.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::registers::{ALS_RAW_MAX, PROX_THRESHOLD_CEILING};
use crate::tuning::normalize_period;

/// ALS gain selection exposed through the `range` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeMode {
    /// Fixed low range (fine resolution, ~326 mlux/10 per count).
    Low,
    /// Fixed high range (522 mlux per count).
    High,
    /// Start low, switch by hysteresis on the raw reading.
    Auto,
}

impl RangeMode {
    /// Decode the textual attribute encoding: 0 = low, 1 = high, 2 = auto.
    /// Any other value falls back to low, matching the attribute contract.
    pub fn from_attr(value: u64) -> Self {
        match value {
            1 => Self::High,
            2 => Self::Auto,
            _ => Self::Low,
        }
    }

    /// Encode back to the textual attribute value.
    pub fn to_attr(self) -> u64 {
        match self {
            Self::Low => 0,
            Self::High => 1,
            Self::Auto => 2,
        }
    }
}

/// Board-supplied configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    // --- Light channel ---
    /// Multiplier applied to the scaled milli-lux output (lens/glass
    /// attenuation compensation).
    pub als_factor: u32,
    /// Auto-range: raw reading at or below this switches to low range.
    pub als_low_thres: u16,
    /// Auto-range: raw reading at or above this switches to high range.
    pub als_high_thres: u16,
    /// Default range mode before the first `range` attribute write.
    pub als_range_mode: RangeMode,
    /// Default threshold-window sensitivity in percent (0-100).
    pub als_sensitivity: u32,

    // --- Proximity channel ---
    /// Distance between the null value and the low detection threshold.
    pub prox_lowthres_offset: u16,
    /// Width of the detection window above the low threshold.
    pub prox_threswindow: u16,
    /// Default sampling period in nanoseconds (normalized at attach).
    pub prox_period_ns: u64,
    /// Default "no object present" baseline reading.
    pub prox_null_value: u16,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            als_factor: 1,
            als_low_thres: 200,
            als_high_thres: 3500,
            als_range_mode: RangeMode::Auto,
            als_sensitivity: 20,

            prox_lowthres_offset: 25,
            prox_threswindow: 50,
            prox_period_ns: 200_000_000,
            prox_null_value: 100,
        }
    }
}

impl PlatformConfig {
    /// Start building a validated configuration from the defaults.
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Assembles and validates a [`PlatformConfig`].
///
/// `build` is the single validation point; the driver core trusts any
/// record that came out of it.
#[derive(Debug, Clone)]
pub struct PlatformConfigBuilder {
    config: PlatformConfig,
}

impl PlatformConfigBuilder {
    pub fn als_factor(mut self, factor: u32) -> Self {
        self.config.als_factor = factor;
        self
    }

    pub fn als_range_thresholds(mut self, low: u16, high: u16) -> Self {
        self.config.als_low_thres = low;
        self.config.als_high_thres = high;
        self
    }

    pub fn als_range_mode(mut self, mode: RangeMode) -> Self {
        self.config.als_range_mode = mode;
        self
    }

    pub fn als_sensitivity(mut self, percent: u32) -> Self {
        self.config.als_sensitivity = percent;
        self
    }

    pub fn prox_thresholds(mut self, lowthres_offset: u16, threswindow: u16) -> Self {
        self.config.prox_lowthres_offset = lowthres_offset;
        self.config.prox_threswindow = threswindow;
        self
    }

    pub fn prox_period_ns(mut self, period_ns: u64) -> Self {
        self.config.prox_period_ns = period_ns;
        self
    }

    pub fn prox_null_value(mut self, null_value: u16) -> Self {
        self.config.prox_null_value = null_value;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// The default period is normalized here so the core never sees a
    /// non-permitted value.
    pub fn build(mut self) -> Result<PlatformConfig, Error> {
        let c = &self.config;

        if c.als_factor == 0 {
            return Err(Error::Invalid("als_factor must be at least 1"));
        }
        if c.als_sensitivity > 100 {
            return Err(Error::Invalid("als_sensitivity above 100 percent"));
        }
        if c.als_low_thres >= c.als_high_thres {
            return Err(Error::Invalid("als range thresholds not a hysteresis band"));
        }
        if c.als_high_thres > ALS_RAW_MAX {
            return Err(Error::Invalid("als_high_thres beyond 12-bit range"));
        }
        if c.prox_lowthres_offset + c.prox_threswindow > PROX_THRESHOLD_CEILING {
            return Err(Error::Invalid("prox threshold geometry above ceiling"));
        }
        if c.prox_null_value + c.prox_lowthres_offset + c.prox_threswindow
            > PROX_THRESHOLD_CEILING
        {
            return Err(Error::Invalid("prox null value pushes window above ceiling"));
        }

        self.config.prox_period_ns = normalize_period(self.config.prox_period_ns);
        Ok(self.config)
    }
}
