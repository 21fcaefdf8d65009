//! Seasonal demand weighting.
//!
//! A user-supplied 12-point curve is blended with the uniform distribution by
//! geometric interpolation, `u^(1-s) * c^s`, then renormalised. The engine
//! turns the resulting weights into per-month demand factors relative to the
//! peak month.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::time_value::saturating_sum;
use crate::types::Percent;

pub const SEASON_LENGTH: usize = 12;

fn uniform(len: usize) -> Vec<Decimal> {
    if len == 0 {
        return Vec::new();
    }
    vec![Decimal::ONE / Decimal::from(len as u64); len]
}

/// `base^(1-s) * value^s` for `s` in [0, 1], evaluated in log space.
fn geometric_blend(base: Decimal, value: Decimal, s: Decimal) -> Decimal {
    if s.is_zero() {
        return base;
    }
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if s == Decimal::ONE {
        return value;
    }
    match (base.checked_ln(), value.checked_ln()) {
        (Some(ln_base), Some(ln_value)) => {
            let ln_mix = (Decimal::ONE - s) * ln_base + s * ln_value;
            ln_mix.checked_exp().unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

/// Blend `curve` towards its own shape by `influence` percent (0 = uniform,
/// 100 = the normalised curve). The output always sums to 1.
pub fn blend_seasonality(curve: &[Decimal], influence: Percent) -> Vec<Decimal> {
    let len = curve.len();
    let base = uniform(len);
    if len == 0 {
        return base;
    }

    let s = (influence / dec!(100)).clamp(Decimal::ZERO, Decimal::ONE);
    let raw: Vec<Decimal> = curve
        .iter()
        .zip(base.iter())
        .map(|(value, u)| geometric_blend(*u, (*value).max(Decimal::ZERO), s))
        .collect();

    let total: Decimal = saturating_sum(raw.iter().copied());
    if total <= Decimal::ZERO {
        tracing::warn!("seasonal curve has no positive weight; using uniform months");
        return base;
    }
    raw.into_iter().map(|v| v / total).collect()
}

/// Weights for the 12 calendar months. An absent curve, or one that is not
/// exactly 12 points long, yields uniform weights.
pub fn monthly_weights(curve: Option<&[Decimal]>, influence: Percent) -> Vec<Decimal> {
    match curve {
        Some(c) if c.len() == SEASON_LENGTH => blend_seasonality(c, influence),
        Some(c) => {
            tracing::warn!(
                len = c.len(),
                "seasonal curve must have 12 points; using uniform months"
            );
            uniform(SEASON_LENGTH)
        }
        None => uniform(SEASON_LENGTH),
    }
}

/// Per-month demand multipliers: each weight divided by the peak weight, so
/// the busiest month runs at the full budget and the rest are scaled down.
pub fn demand_factors(weights: &[Decimal]) -> Vec<Decimal> {
    let peak = weights.iter().copied().max().unwrap_or(Decimal::ZERO);
    if peak <= Decimal::ZERO {
        return vec![Decimal::ONE; weights.len().max(SEASON_LENGTH)];
    }
    weights
        .iter()
        .map(|w| ((*w).max(Decimal::ZERO) / peak).min(Decimal::ONE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_SEASONALITY;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000000001)
    }

    #[test]
    fn test_zero_influence_is_uniform() {
        let weights = blend_seasonality(&DEFAULT_SEASONALITY, dec!(0));
        for w in &weights {
            assert!(close(*w, Decimal::ONE / dec!(12)));
        }
    }

    #[test]
    fn test_full_influence_is_normalised_curve() {
        let curve = [dec!(1), dec!(3)];
        let weights = blend_seasonality(&curve, dec!(100));
        assert!(close(weights[0], dec!(0.25)));
        assert!(close(weights[1], dec!(0.75)));
    }

    #[test]
    fn test_partial_influence_sums_to_one() {
        let weights = blend_seasonality(&DEFAULT_SEASONALITY, dec!(40));
        let total: Decimal = weights.iter().copied().sum();
        assert!(close(total, Decimal::ONE));
        // July is the quietest month of the default curve
        let july = weights[6];
        assert!(weights.iter().all(|w| *w >= july - dec!(0.000000001)));
    }

    #[test]
    fn test_zero_entry_blends_to_zero() {
        let mut curve = [Decimal::ONE; 12];
        curve[3] = Decimal::ZERO;
        let weights = blend_seasonality(&curve, dec!(50));
        assert_eq!(weights[3], Decimal::ZERO);
        assert!(close(weights[0], Decimal::ONE / dec!(11)));
    }

    #[test]
    fn test_all_zero_curve_falls_back() {
        let weights = blend_seasonality(&[Decimal::ZERO; 12], dec!(100));
        assert!(close(weights[0], Decimal::ONE / dec!(12)));
    }

    #[test]
    fn test_wrong_length_curve_is_uniform() {
        let weights = monthly_weights(Some(&[dec!(1), dec!(2)]), dec!(100));
        assert_eq!(weights.len(), 12);
        assert!(weights.iter().all(|w| close(*w, Decimal::ONE / dec!(12))));
    }

    #[test]
    fn test_demand_factors_peak_at_one() {
        let weights = monthly_weights(Some(&DEFAULT_SEASONALITY), dec!(100));
        let factors = demand_factors(&weights);
        assert!(factors.iter().all(|f| *f <= Decimal::ONE));
        assert!(factors.iter().any(|f| *f == Decimal::ONE));
        assert!(close(factors[11], dec!(0.6)));
    }

    #[test]
    fn test_demand_factors_uniform_are_one() {
        let factors = demand_factors(&monthly_weights(None, dec!(0)));
        assert!(factors.iter().all(|f| *f == Decimal::ONE));
    }
}
