//! Pure normalization and scaling math.
//!
//! No side effects and no hardware access — these functions feed the
//! reconciler and the dispatcher with pre-validated values. Anything the
//! hardware cannot represent is handled here, so the register-assembly
//! layer can treat its inputs as trusted.

use crate::error::Error;
use crate::registers::{ALS_RAW_MAX, PROX_THRESHOLD_CEILING};

/// Fastest proximity sampling step, 540 microseconds.
pub const PERIOD_FASTEST_NS: u64 = 540_000;

/// Shortest period the IR LED is allowed to run at continuously. Keeps
/// the LED from glowing visibly red and extends its life.
pub const PERIOD_FLOOR_NS: u64 = 50_000_000;

/// The eight sampling periods the CONFIGURE register can express.
pub const PERMITTED_PERIODS_NS: [u64; 8] = [
    PERIOD_FASTEST_NS,
    12_500_000,
    50_000_000,
    75_000_000,
    100_000_000,
    200_000_000,
    400_000_000,
    800_000_000,
];

/// Rounds a requested proximity sampling period down to a permitted step.
///
/// Requests of 50 ms and above round down within
/// {800, 400, 200, 100, 75, 50 ms}. Requests between 12.5 ms and 50 ms
/// are raised to the 50 ms floor. Requests below 12.5 ms fall through to
/// the fastest 540 us step, bypassing the floor entirely — an asymmetry
/// kept from the original firmware rather than smoothed over.
pub fn normalize_period(requested_ns: u64) -> u64 {
    if requested_ns >= 800_000_000 {
        800_000_000
    } else if requested_ns >= 400_000_000 {
        400_000_000
    } else if requested_ns >= 200_000_000 {
        200_000_000
    } else if requested_ns >= 100_000_000 {
        100_000_000
    } else if requested_ns >= 75_000_000 {
        75_000_000
    } else if requested_ns >= 12_500_000 {
        PERIOD_FLOOR_NS
    } else {
        PERIOD_FASTEST_NS
    }
}

/// Validates a proximity null value against the threshold ceiling.
///
/// The high detection threshold is `null + offset + window`; it must stay
/// at or below [`PROX_THRESHOLD_CEILING`]. A candidate that overshoots is
/// clamped once to the largest value that fits. Only a geometry where
/// even a zero null value cannot fit is rejected.
pub fn normalize_null_value(
    candidate: u64,
    lowthres_offset: u16,
    threswindow: u16,
) -> Result<u16, Error> {
    let span = u64::from(lowthres_offset) + u64::from(threswindow);
    if span > u64::from(PROX_THRESHOLD_CEILING) {
        return Err(Error::OutOfRange);
    }

    let max_fit = u64::from(PROX_THRESHOLD_CEILING) - span;
    Ok(candidate.min(max_fit) as u16)
}

/// Computes the ALS interrupt threshold window around the last reading.
///
/// `sensitivity` is a percentage (0-100, validated upstream). The window
/// is clamped into the 12-bit converter range.
pub fn als_threshold_window(light: u16, sensitivity: u32) -> (u16, u16) {
    let light = u32::from(light);
    let low = light * (100 - sensitivity) / 100;
    let high = light * (100 + sensitivity) / 100;

    (
        low.min(u32::from(ALS_RAW_MAX)) as u16,
        high.min(u32::from(ALS_RAW_MAX)) as u16,
    )
}

/// Scales a raw light reading to milli-lux.
///
/// Two-segment linear law: high range is 522 mlux per count, low range is
/// 32.6 mlux per count with integer truncation, both multiplied by the
/// platform calibration factor.
pub fn scale_light(raw: u16, high_range: bool, factor: u32) -> u32 {
    let mlux = if high_range {
        522 * u32::from(raw)
    } else {
        (326 * u32::from(raw) + 5) / 10
    };

    factor * mlux
}

/// Re-evaluates the ALS range after a reading.
///
/// Hysteresis: only a reading at or above `high_thres` switches up, only
/// one at or below `low_thres` switches down. Readings strictly inside
/// the band keep the current range. No-op unless auto-ranging.
pub fn adjust_range(
    raw: u16,
    auto_range: bool,
    high_range: bool,
    low_thres: u16,
    high_thres: u16,
) -> bool {
    if auto_range {
        if raw <= low_thres {
            return false;
        }
        if raw >= high_thres {
            return true;
        }
    }

    high_range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_floor_applies_between_12dot5_and_50ms() {
        assert_eq!(normalize_period(30_000_000), 50_000_000);
        assert_eq!(normalize_period(12_500_000), 50_000_000);
        assert_eq!(normalize_period(49_999_999), 50_000_000);
    }

    #[test]
    fn period_below_12dot5ms_bypasses_floor() {
        assert_eq!(normalize_period(100_000), PERIOD_FASTEST_NS);
        assert_eq!(normalize_period(540_000), PERIOD_FASTEST_NS);
        assert_eq!(normalize_period(0), PERIOD_FASTEST_NS);
        assert_eq!(normalize_period(12_499_999), PERIOD_FASTEST_NS);
    }

    #[test]
    fn period_rounds_down_above_floor() {
        assert_eq!(normalize_period(800_000_000), 800_000_000);
        assert_eq!(normalize_period(1_000_000_000), 800_000_000);
        assert_eq!(normalize_period(399_999_999), 200_000_000);
        assert_eq!(normalize_period(75_000_000), 75_000_000);
        assert_eq!(normalize_period(50_000_000), 50_000_000);
    }

    #[test]
    fn null_value_fits_unchanged() {
        assert_eq!(normalize_null_value(100, 25, 50), Ok(100));
        // 175 + 25 + 50 == 250: exactly at the ceiling still fits.
        assert_eq!(normalize_null_value(175, 25, 50), Ok(175));
    }

    #[test]
    fn null_value_clamps_to_largest_fit() {
        // 240 + 5 + 10 = 255 > 250, clamped to 235 (235 + 15 == 250).
        assert_eq!(normalize_null_value(240, 5, 10), Ok(235));
        assert_eq!(normalize_null_value(1000, 25, 50), Ok(175));
    }

    #[test]
    fn null_value_rejects_infeasible_geometry() {
        assert_eq!(normalize_null_value(0, 200, 100), Err(Error::OutOfRange));
    }

    #[test]
    fn threshold_window_brackets_reading() {
        let (low, high) = als_threshold_window(1000, 20);
        assert_eq!(low, 800);
        assert_eq!(high, 1200);
    }

    #[test]
    fn threshold_window_clamps_high_to_12_bits() {
        let (_, high) = als_threshold_window(4000, 20);
        assert_eq!(high, ALS_RAW_MAX);
    }

    #[test]
    fn scale_matches_both_segments() {
        assert_eq!(scale_light(100, true, 1), 52_200);
        // Low range truncates: (326*100 + 5) / 10 = 3260.
        assert_eq!(scale_light(100, false, 1), 3260);
        assert_eq!(scale_light(100, false, 3), 9780);
    }

    #[test]
    fn range_hysteresis_holds_inside_band() {
        // Cross above the high threshold: switch up.
        assert!(adjust_range(3600, true, false, 200, 3500));
        // Inside the band: keep whatever range is current.
        assert!(adjust_range(1000, true, true, 200, 3500));
        assert!(!adjust_range(1000, true, false, 200, 3500));
        // At or below the low threshold: switch down.
        assert!(!adjust_range(200, true, true, 200, 3500));
    }

    #[test]
    fn range_fixed_unless_auto() {
        assert!(adjust_range(0, false, true, 200, 3500));
        assert!(!adjust_range(4095, false, false, 200, 3500));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_period_is_idempotent_and_closed(ns in 0u64..5_000_000_000) {
            let once = normalize_period(ns);
            prop_assert!(PERMITTED_PERIODS_NS.contains(&once));
            prop_assert_eq!(normalize_period(once), once);
        }

        #[test]
        fn threshold_window_brackets_for_valid_inputs(
            light in 0u16..=ALS_RAW_MAX,
            sensitivity in 0u32..=100,
        ) {
            let (low, high) = als_threshold_window(light, sensitivity);
            prop_assert!(low <= light);
            prop_assert!(high <= ALS_RAW_MAX);
            prop_assert!(light <= high || high == ALS_RAW_MAX);
            prop_assert!(low <= high);
        }

        #[test]
        fn null_value_result_always_fits(
            candidate in 0u64..=1000,
            offset in 0u16..=125,
            window in 0u16..=125,
        ) {
            let accepted = normalize_null_value(candidate, offset, window).unwrap();
            prop_assert!(accepted + offset + window <= PROX_THRESHOLD_CEILING);
        }
    }
}
