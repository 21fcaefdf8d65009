//! Funnel guardrails against industry benchmark ranges.
//!
//! The benchmarks describe what a healthy tier looks like; a derived CPL or
//! CVR far from the benchmark median is flagged for review rather than
//! rejected.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::funnel::FunnelPolicy;
use crate::types::{Money, Percent};

/// Inclusive benchmark range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub low: Decimal,
    pub high: Decimal,
}

impl Range {
    const fn new(low: Decimal, high: Decimal) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn median(&self) -> Decimal {
        (self.low + self.high) / dec!(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBenchmark {
    pub cpl: Range,
    /// Percent.
    pub cvr: Range,
}

pub const BENCHMARK_RANGES: [TierBenchmark; 4] = [
    TierBenchmark {
        cpl: Range::new(dec!(100), dec!(200)),
        cvr: Range::new(dec!(2), dec!(4)),
    },
    TierBenchmark {
        cpl: Range::new(dec!(225), dec!(350)),
        cvr: Range::new(dec!(1), dec!(2)),
    },
    TierBenchmark {
        cpl: Range::new(dec!(350), dec!(600)),
        cvr: Range::new(dec!(0.5), dec!(1.0)),
    },
    TierBenchmark {
        cpl: Range::new(dec!(600), dec!(1200)),
        cvr: Range::new(dec!(0.2), dec!(0.6)),
    },
];

const BASE_CVR_RANGE: Range = Range::new(dec!(0.1), dec!(6));
const BASE_CPL_RANGE: Range = Range::new(dec!(50), dec!(300));
/// Relative distance from the benchmark median that raises an audit flag.
const MEDIAN_TOLERANCE: Decimal = dec!(0.2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailFlag {
    BaseCvrOutOfRange,
    BaseCplOutOfRange,
    /// 1-based tier number.
    TierCvrOutOfRange(usize),
}

impl std::fmt::Display for GuardrailFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardrailFlag::BaseCvrOutOfRange => write!(f, "base_cvr_out_of_range"),
            GuardrailFlag::BaseCplOutOfRange => write!(f, "base_cpl_out_of_range"),
            GuardrailFlag::TierCvrOutOfRange(tier) => write!(f, "tier{tier}_cvr_out_of_range"),
        }
    }
}

/// Data quality flags for a base CPL / CVR pair.
pub fn guardrail_flags(base_cpl: Money, base_cvr: Percent) -> Vec<GuardrailFlag> {
    let mut flags = Vec::new();
    if !BASE_CVR_RANGE.contains(base_cvr) {
        flags.push(GuardrailFlag::BaseCvrOutOfRange);
    }
    if !BASE_CPL_RANGE.contains(base_cpl) {
        flags.push(GuardrailFlag::BaseCplOutOfRange);
    }
    let tier_cvr = FunnelPolicy::default().tier_cvr(base_cvr);
    for (idx, (cvr, bench)) in tier_cvr.iter().zip(BENCHMARK_RANGES.iter()).enumerate() {
        if !bench.cvr.contains(*cvr) {
            flags.push(GuardrailFlag::TierCvrOutOfRange(idx + 1));
        }
    }
    flags
}

/// One audited tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAudit {
    /// 1-based.
    pub tier: usize,
    pub cpl: Money,
    pub cpl_range: Range,
    pub cpl_flag: bool,
    pub cvr: Percent,
    pub cvr_range: Range,
    pub cvr_flag: bool,
}

fn off_median(value: Decimal, range: &Range) -> bool {
    let median = range.median();
    (value - median).abs() > MEDIAN_TOLERANCE * median
}

/// Derived per-tier CPL (`base_cpl * cpl_factor`) and CVR against the
/// benchmark ranges.
pub fn audit_funnel(base_cpl: Money, base_cvr: Percent) -> Vec<TierAudit> {
    let policy = FunnelPolicy::default();
    let tier_cvr = policy.tier_cvr(base_cvr);

    policy
        .cpl_factors
        .iter()
        .zip(tier_cvr.iter())
        .zip(BENCHMARK_RANGES.iter())
        .enumerate()
        .map(|(idx, ((factor, cvr), bench))| {
            let cpl = base_cpl * *factor;
            TierAudit {
                tier: idx + 1,
                cpl,
                cpl_range: bench.cpl,
                cpl_flag: off_median(cpl, &bench.cpl),
                cvr: *cvr,
                cvr_range: bench.cvr,
                cvr_flag: off_median(*cvr, &bench.cvr),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_healthy_inputs_raise_no_base_flags() {
        let flags = guardrail_flags(dec!(150), dec!(3));
        assert!(!flags.contains(&GuardrailFlag::BaseCvrOutOfRange));
        assert!(!flags.contains(&GuardrailFlag::BaseCplOutOfRange));
    }

    #[test]
    fn test_out_of_range_inputs() {
        let flags = guardrail_flags(dec!(20), dec!(8));
        assert!(flags.contains(&GuardrailFlag::BaseCvrOutOfRange));
        assert!(flags.contains(&GuardrailFlag::BaseCplOutOfRange));
        // 8 * 1 = 8% is above tier 1's 2-4% range
        assert!(flags.contains(&GuardrailFlag::TierCvrOutOfRange(1)));
    }

    #[test]
    fn test_tier_flags_for_default_cvr() {
        // 2.5% base: tier CVRs 2.5, 1.625, 0.875, 0.375 all within benchmarks
        assert_eq!(guardrail_flags(dec!(150), dec!(2.5)), Vec::<GuardrailFlag>::new());
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(GuardrailFlag::TierCvrOutOfRange(3).to_string(), "tier3_cvr_out_of_range");
    }

    #[test]
    fn test_audit_rows() {
        let rows = audit_funnel(dec!(150), dec!(3));
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].cpl, dec!(150));
        assert!(!rows[0].cpl_flag);
        // 150 * 4 = 600 vs median 900: more than 20% away
        assert_eq!(rows[3].cpl, dec!(600));
        assert!(rows[3].cpl_flag);
        assert_eq!(rows[1].cvr, dec!(1.95));
        assert!(rows[1].cvr_flag);
    }
}
