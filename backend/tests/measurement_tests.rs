//! Measurement calculator tests
//!
//! Covers the derived-value invariants:
//! - nw == max(0, gw - cw) after any recomputation
//! - average == round2(nw * 1000 / mtrs) when nw > 0 and mtrs > 0, else 0
//! - the variance band needs a full fabric specification

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{average_out_of_band, band_bounds, derive_measurements, round2};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The worked reference example: 500m, 550kg gross, 30kg core.
    #[test]
    fn test_reference_roll() {
        let d = derive_measurements(dec("500"), dec("550"), dec("30"), None, None);
        assert_eq!(d.nw, dec("520"));
        assert_eq!(d.average, dec("1040"));
        assert_eq!(d.variance_band, "N/A");
    }

    #[test]
    fn test_core_heavier_than_gross_clamps() {
        let d = derive_measurements(dec("100"), dec("25"), dec("40"), None, None);
        assert_eq!(d.nw, Decimal::ZERO);
        assert_eq!(d.average, Decimal::ZERO);
        assert_eq!(d.variance_band, "N/A");
    }

    #[test]
    fn test_zero_meters_means_zero_average() {
        let d = derive_measurements(dec("0"), dec("550"), dec("30"), None, None);
        assert_eq!(d.nw, dec("520"));
        assert_eq!(d.average, Decimal::ZERO);
    }

    #[test]
    fn test_average_is_rounded_to_two_places() {
        // 520 * 1000 / 300 = 1733.333...
        let d = derive_measurements(dec("300"), dec("550"), dec("30"), None, None);
        assert_eq!(d.average, dec("1733.33"));

        // 100 * 1000 / 96 = 1041.666... rounds up
        let d = derive_measurements(dec("96"), dec("100"), dec("0"), None, None);
        assert_eq!(d.average, dec("1041.67"));
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec("1.005")), dec("1.01"));
        assert_eq!(round2(dec("1.004")), dec("1.00"));
        assert_eq!(round2(dec("-1.005")), dec("-1.01"));
    }

    #[test]
    fn test_variance_band_formula() {
        // ideal = 15 * 66 = 990; UB 1039.50, LB 940.50
        let d = derive_measurements(
            dec("500"),
            dec("550"),
            dec("30"),
            Some(dec("15")),
            Some(dec("66")),
        );
        assert_eq!(d.variance_band, "UB: 1039.50 / LB: 940.50");

        let (ub, lb) = band_bounds(Some(dec("15")), Some(dec("66"))).unwrap();
        assert_eq!(ub, dec("1039.50"));
        assert_eq!(lb, dec("940.50"));
    }

    #[test]
    fn test_variance_band_na_without_spec() {
        let d = derive_measurements(dec("500"), dec("550"), dec("30"), Some(dec("15")), None);
        assert_eq!(d.variance_band, "N/A");
        assert!(band_bounds(None, Some(dec("66"))).is_none());
        assert!(band_bounds(Some(dec("0")), Some(dec("66"))).is_none());
    }

    #[test]
    fn test_out_of_band_flags() {
        let width = Some(dec("15"));
        let gram = Some(dec("66"));
        assert!(average_out_of_band(dec("1039.51"), width, gram));
        assert!(average_out_of_band(dec("940.49"), width, gram));
        assert!(!average_out_of_band(dec("1039.50"), width, gram));
        assert!(!average_out_of_band(dec("940.50"), width, gram));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating quantities with two decimal places
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 10000.00
    }

    fn positive_quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// nw is always max(0, gw - cw)
        #[test]
        fn prop_net_weight_invariant(
            mtrs in quantity_strategy(),
            gw in quantity_strategy(),
            cw in quantity_strategy()
        ) {
            let d = derive_measurements(mtrs, gw, cw, None, None);
            let expected = if gw - cw > Decimal::ZERO { gw - cw } else { Decimal::ZERO };
            prop_assert_eq!(d.nw, expected);
            prop_assert!(d.nw >= Decimal::ZERO);
        }

        /// average follows the formula exactly, or is zero
        #[test]
        fn prop_average_formula(
            mtrs in positive_quantity_strategy(),
            gw in quantity_strategy(),
            cw in quantity_strategy()
        ) {
            let d = derive_measurements(mtrs, gw, cw, None, None);
            if d.nw > Decimal::ZERO {
                prop_assert_eq!(d.average, round2(d.nw * Decimal::from(1000) / mtrs));
            } else {
                prop_assert_eq!(d.average, Decimal::ZERO);
            }
        }

        /// the band is symmetric around the ideal weight
        #[test]
        fn prop_band_surrounds_ideal(
            width in positive_quantity_strategy(),
            gram in positive_quantity_strategy()
        ) {
            let (ub, lb) = band_bounds(Some(width), Some(gram)).unwrap();
            let ideal = width * gram;
            prop_assert!(lb <= round2(ideal));
            prop_assert!(round2(ideal) <= ub);
            // an in-band average is never flagged
            prop_assert!(!average_out_of_band(round2(ideal), Some(width), Some(gram)));
        }

        /// recomputing derived values is idempotent
        #[test]
        fn prop_derivation_is_stable(
            mtrs in quantity_strategy(),
            gw in quantity_strategy(),
            cw in quantity_strategy()
        ) {
            let first = derive_measurements(mtrs, gw, cw, None, None);
            let second = derive_measurements(mtrs, gw, cw, None, None);
            prop_assert_eq!(first, second);
        }
    }
}
