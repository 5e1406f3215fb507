//! ISL29028 register map and register-image assembly.
//!
//! The chip exposes a flat byte-addressed register file over I2C/SMBus.
//! Everything here is pure data manipulation: building the CONFIGURE and
//! INTERRUPT byte images and packing/unpacking the 12-bit ALS fields.
//! Actual bus traffic lives in [`crate::device`].

// ── Register addresses ────────────────────────────────────────

pub const REG_ID: u8 = 0x00;
pub const REG_CONFIGURE: u8 = 0x01;
pub const REG_INTERRUPT: u8 = 0x02;
pub const REG_PROX_LT: u8 = 0x03;
pub const REG_PROX_HT: u8 = 0x04;
pub const REG_ALSIR_TH1: u8 = 0x05;
pub const REG_ALSIR_TH2: u8 = 0x06;
pub const REG_ALSIR_TH3: u8 = 0x07;
pub const REG_PROX_DATA: u8 = 0x08;
pub const REG_ALSIR_DT1: u8 = 0x09;
pub const REG_ALSIR_DT2: u8 = 0x0a;
pub const REG_TEST1: u8 = 0x0e;
pub const REG_TEST2: u8 = 0x0f;

// ── CONFIGURE register bits ───────────────────────────────────

pub const CONFIG_PROX_EN: u8 = 0x80;
pub const CONFIG_PROX_SLP_NONE: u8 = 0x70; // 540us sampling
pub const CONFIG_PROX_SLP_12DOT5MS: u8 = 0x60;
pub const CONFIG_PROX_SLP_50MS: u8 = 0x50;
pub const CONFIG_PROX_SLP_75MS: u8 = 0x40;
pub const CONFIG_PROX_SLP_100MS: u8 = 0x30;
pub const CONFIG_PROX_SLP_200MS: u8 = 0x20;
pub const CONFIG_PROX_SLP_400MS: u8 = 0x10;
pub const CONFIG_PROX_SLP_800MS: u8 = 0x00;
pub const CONFIG_PROX_DR_220MA: u8 = 0x08;
pub const CONFIG_ALS_EN: u8 = 0x04;
pub const CONFIG_ALS_RANGE_HIGH: u8 = 0x02;
pub const CONFIG_ALSIR_MODE_IR: u8 = 0x01;

/// Baseline CONFIGURE image: 220 mA IR LED drive, everything else off.
pub const CONFIG_DEFAULT: u8 = CONFIG_PROX_DR_220MA;

// ── INTERRUPT register bits ───────────────────────────────────

pub const INTR_PROX_FLAG: u8 = 0x80;
pub const INTR_PROX_PRST_16: u8 = 0x60;
pub const INTR_PROX_PRST_8: u8 = 0x40;
pub const INTR_PROX_PRST_4: u8 = 0x20;
pub const INTR_PROX_PRST_1: u8 = 0x00;
pub const INTR_ALS_FLAG: u8 = 0x08;
pub const INTR_ALS_PRST_16: u8 = 0x06;
pub const INTR_ALS_PRST_8: u8 = 0x04;
pub const INTR_ALS_PRST_4: u8 = 0x02;
pub const INTR_ALS_PRST_1: u8 = 0x00;
pub const INTR_CTRL_AND: u8 = 0x01;

/// INTERRUPT image while proximity runs: keep the sticky prox flag set so
/// the hardware can clear it itself once the object departs, persistence
/// 1 sample for prox and 8 for ALS.
pub const INTR_ACTIVE: u8 = INTR_PROX_FLAG | INTR_PROX_PRST_1 | INTR_ALS_PRST_8;

/// INTERRUPT image while proximity is off: same persistence, prox flag
/// cleared.
pub const INTR_INACTIVE: u8 = INTR_PROX_PRST_1 | INTR_ALS_PRST_8;

// ── Device limits ─────────────────────────────────────────────

/// ALS converter width: 12 bits.
pub const ALS_RAW_MAX: u16 = 0x0fff;

/// Highest usable proximity threshold; the top of the 8-bit range is
/// reserved headroom (see [`crate::tuning::normalize_null_value`]).
pub const PROX_THRESHOLD_CEILING: u16 = 250;

/// Full-scale ambient light output in milli-lux (high range, factor 1).
pub const ALS_MLUX_MAX: u32 = 2_137_590;

// ── Register-image assembly ───────────────────────────────────

/// Builds the CONFIGURE register image.
///
/// `period_ns` must already be normalized by
/// [`crate::tuning::normalize_period`]; feeding any other value is a
/// programming fault.
pub fn configure_value(period_ns: u64, als_on: bool, prox_on: bool, high_range: bool) -> u8 {
    let mut config = CONFIG_DEFAULT;

    config |= match period_ns {
        800_000_000 => CONFIG_PROX_SLP_800MS,
        400_000_000 => CONFIG_PROX_SLP_400MS,
        200_000_000 => CONFIG_PROX_SLP_200MS,
        100_000_000 => CONFIG_PROX_SLP_100MS,
        75_000_000 => CONFIG_PROX_SLP_75MS,
        50_000_000 => CONFIG_PROX_SLP_50MS,
        12_500_000 => CONFIG_PROX_SLP_12DOT5MS,
        540_000 => CONFIG_PROX_SLP_NONE,
        _ => unreachable!("proximity period not normalized: {period_ns}"),
    };

    if als_on {
        config |= CONFIG_ALS_EN;
    }
    if prox_on {
        config |= CONFIG_PROX_EN;
    }
    if high_range {
        config |= CONFIG_ALS_RANGE_HIGH;
    }

    config
}

/// Packs a 12-bit ALS threshold window into the TH1..TH3 byte layout:
/// TH1 = low[7:0], TH2 = high[3:0] << 4 | low[11:8], TH3 = high[11:4].
pub fn pack_als_thresholds(low: u16, high: u16) -> [u8; 3] {
    [
        (low & 0xff) as u8,
        (((low >> 8) & 0x0f) as u8) | (((high << 4) & 0xf0) as u8),
        ((high >> 4) & 0xff) as u8,
    ]
}

/// Decodes the little-endian DT1/DT2 pair into a raw light sample.
pub fn decode_als_data(buf: [u8; 2]) -> u16 {
    u16::from(buf[1]) << 8 | u16::from(buf[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_maps_every_permitted_period() {
        let cases = [
            (800_000_000, CONFIG_PROX_SLP_800MS),
            (400_000_000, CONFIG_PROX_SLP_400MS),
            (200_000_000, CONFIG_PROX_SLP_200MS),
            (100_000_000, CONFIG_PROX_SLP_100MS),
            (75_000_000, CONFIG_PROX_SLP_75MS),
            (50_000_000, CONFIG_PROX_SLP_50MS),
            (12_500_000, CONFIG_PROX_SLP_12DOT5MS),
            (540_000, CONFIG_PROX_SLP_NONE),
        ];
        for (ns, bits) in cases {
            assert_eq!(configure_value(ns, false, false, false), CONFIG_DEFAULT | bits);
        }
    }

    #[test]
    fn configure_sets_enable_and_range_bits() {
        let v = configure_value(800_000_000, true, true, true);
        assert_ne!(v & CONFIG_ALS_EN, 0);
        assert_ne!(v & CONFIG_PROX_EN, 0);
        assert_ne!(v & CONFIG_ALS_RANGE_HIGH, 0);
        assert_ne!(v & CONFIG_PROX_DR_220MA, 0);
    }

    #[test]
    #[should_panic(expected = "not normalized")]
    fn configure_rejects_unnormalized_period() {
        let _ = configure_value(30_000_000, false, false, false);
    }

    #[test]
    fn threshold_packing_round_trips_nibbles() {
        let buf = pack_als_thresholds(0x0abc, 0x0def);
        assert_eq!(buf[0], 0xbc);
        assert_eq!(buf[1], 0x0a | 0xf0);
        assert_eq!(buf[2], 0xde);
    }

    #[test]
    fn als_data_is_little_endian() {
        assert_eq!(decode_als_data([0x34, 0x12]), 0x1234);
        assert_eq!(decode_als_data([0xff, 0x0f]), ALS_RAW_MAX);
    }
}
