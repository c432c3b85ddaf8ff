//! Measurement calculator
//!
//! Derives net weight, the meter-average and the acceptable variance band
//! from raw roll measurements. Both the entry path and the partial-use
//! splitter call into this so every roll carries identical derived values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Upper bound of the variance band, as a fraction of the ideal weight.
const UPPER_TOLERANCE: Decimal = Decimal::from_parts(105, 0, 0, false, 2);
/// Lower bound of the variance band, as a fraction of the ideal weight.
const LOWER_TOLERANCE: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Values derived from raw measurements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    /// Net weight: gross minus core, clamped at zero.
    pub nw: Decimal,
    /// Grams per meter: `nw * 1000 / mtrs`, 0 when either input is 0.
    pub average: Decimal,
    /// `"UB: x / LB: y"` around the ideal weight, or `"N/A"`.
    pub variance_band: String,
}

/// Round half-up to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute the derived measurements for a roll.
///
/// `width` and `gram` are the fabric specification; the variance band is
/// only meaningful when both are known and the roll has a usable average.
pub fn derive_measurements(
    mtrs: Decimal,
    gw: Decimal,
    cw: Decimal,
    width: Option<Decimal>,
    gram: Option<Decimal>,
) -> Derived {
    let net = gw - cw;
    let nw = if net > Decimal::ZERO { net } else { Decimal::ZERO };

    let average = if nw > Decimal::ZERO && mtrs > Decimal::ZERO {
        round2(nw * Decimal::from(1000) / mtrs)
    } else {
        Decimal::ZERO
    };

    let variance_band = match band_bounds(width, gram) {
        Some((ub, lb)) if average > Decimal::ZERO => {
            format!("UB: {:.2} / LB: {:.2}", ub, lb)
        }
        _ => "N/A".to_string(),
    };

    Derived {
        nw,
        average,
        variance_band,
    }
}

/// Upper and lower bounds of the acceptable average, when the fabric
/// specification is known. Returns `(upper, lower)`.
pub fn band_bounds(width: Option<Decimal>, gram: Option<Decimal>) -> Option<(Decimal, Decimal)> {
    let (width, gram) = (width?, gram?);
    if width <= Decimal::ZERO || gram <= Decimal::ZERO {
        return None;
    }
    let ideal = width * gram;
    Some((round2(ideal * UPPER_TOLERANCE), round2(ideal * LOWER_TOLERANCE)))
}

/// Whether an average falls outside the acceptable band. False when the
/// band is unknown.
pub fn average_out_of_band(
    average: Decimal,
    width: Option<Decimal>,
    gram: Option<Decimal>,
) -> bool {
    match band_bounds(width, gram) {
        Some((ub, lb)) => average < lb || average > ub,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_net_weight_is_gross_minus_core() {
        let d = derive_measurements(dec("500"), dec("550"), dec("30"), None, None);
        assert_eq!(d.nw, dec("520"));
        assert_eq!(d.average, dec("1040"));
        assert_eq!(d.variance_band, "N/A");
    }

    #[test]
    fn test_net_weight_clamps_at_zero() {
        let d = derive_measurements(dec("100"), dec("20"), dec("30"), None, None);
        assert_eq!(d.nw, Decimal::ZERO);
        assert_eq!(d.average, Decimal::ZERO);
    }

    #[test]
    fn test_average_rounds_half_up() {
        // 10 * 1000 / 3 = 3333.333...
        let d = derive_measurements(dec("3"), dec("10"), dec("0"), None, None);
        assert_eq!(d.average, dec("3333.33"));

        // 1.0 * 1000 / 16 = 62.5 -> exact, then 0.125 * 1000 / 16 rounds up
        assert_eq!(round2(dec("62.505")), dec("62.51"));
        assert_eq!(round2(dec("62.504")), dec("62.50"));
    }

    #[test]
    fn test_variance_band_requires_full_spec() {
        let band = derive_measurements(dec("500"), dec("550"), dec("30"), Some(dec("15")), None);
        assert_eq!(band.variance_band, "N/A");

        let band =
            derive_measurements(dec("500"), dec("550"), dec("30"), Some(dec("15")), Some(dec("66")));
        // ideal = 990, UB = 1039.50, LB = 940.50
        assert_eq!(band.variance_band, "UB: 1039.50 / LB: 940.50");
    }

    #[test]
    fn test_variance_band_absent_without_average() {
        let d = derive_measurements(
            Decimal::ZERO,
            dec("550"),
            dec("30"),
            Some(dec("15")),
            Some(dec("66")),
        );
        assert_eq!(d.variance_band, "N/A");
    }

    #[test]
    fn test_average_out_of_band() {
        let width = Some(dec("15"));
        let gram = Some(dec("66"));
        // band is [940.50, 1039.50]
        assert!(average_out_of_band(dec("1040"), width, gram));
        assert!(average_out_of_band(dec("900"), width, gram));
        assert!(!average_out_of_band(dec("990"), width, gram));
        assert!(!average_out_of_band(dec("1040"), None, gram));
    }
}
