use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateTable;
use crate::types::{Money, Percent};

/// Which row of the rate table produced a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RateBasis {
    AmountTier { max_amount: Money },
    LongTerm { after_months: u32 },
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateDecision {
    pub rate_pct: Percent,
    pub basis: RateBasis,
}

impl RateTable {
    /// Annual rate in percent for a loan of `amount` over `duration_months`.
    pub fn resolve(&self, amount: Money, duration_months: u32) -> Percent {
        self.resolve_detailed(amount, duration_months).rate_pct
    }

    /// Amount tiers first, ascending, first match wins. The long-term
    /// override is only reachable above the largest amount tier.
    pub fn resolve_detailed(&self, amount: Money, duration_months: u32) -> RateDecision {
        if let Some(tier) = self.amount_tiers.iter().find(|t| amount <= t.max_amount) {
            return RateDecision {
                rate_pct: tier.rate_pct,
                basis: RateBasis::AmountTier {
                    max_amount: tier.max_amount,
                },
            };
        }

        if duration_months > self.long_term.after_months {
            return RateDecision {
                rate_pct: self.long_term.rate_pct,
                basis: RateBasis::LongTerm {
                    after_months: self.long_term.after_months,
                },
            };
        }

        RateDecision {
            rate_pct: self.default_rate_pct,
            basis: RateBasis::Default,
        }
    }
}

/// Rate from the reference table. Never fails; falls back to the default rate.
pub fn resolve_rate(amount: Money, duration_months: u32) -> Percent {
    let rate = RateTable::default().resolve(amount, duration_months);
    tracing::debug!(%amount, duration_months, %rate, "resolved loan rate");
    rate
}

/// Annual rate as a fraction per month (3.5% -> 0.0029166...).
pub fn monthly_rate(annual_rate_pct: Percent) -> Decimal {
    annual_rate_pct / Decimal::ONE_HUNDRED / Decimal::from(12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_tiers_are_inclusive() {
        assert_eq!(resolve_rate(dec!(1000), 12), dec!(2.5));
        assert_eq!(resolve_rate(dec!(1000.01), 12), dec!(3.0));
        assert_eq!(resolve_rate(dec!(5000), 12), dec!(3.0));
        assert_eq!(resolve_rate(dec!(10000), 12), dec!(3.5));
    }

    #[test]
    fn test_amount_tier_beats_duration_override() {
        // A small loan over a long term keeps its amount-tier rate.
        assert_eq!(resolve_rate(dec!(800), 60), dec!(2.5));
        assert_eq!(resolve_rate(dec!(10000), 36), dec!(3.5));
    }

    #[test]
    fn test_long_term_override_above_largest_tier() {
        let table = RateTable::default();
        let decision = table.resolve_detailed(dec!(20000), 25);
        assert_eq!(decision.rate_pct, dec!(4.0));
        assert_eq!(decision.basis, RateBasis::LongTerm { after_months: 24 });
    }

    #[test]
    fn test_default_rate_at_exactly_24_months() {
        let decision = RateTable::default().resolve_detailed(dec!(20000), 24);
        assert_eq!(decision.rate_pct, dec!(3.5));
        assert_eq!(decision.basis, RateBasis::Default);
    }

    #[test]
    fn test_monthly_rate_conversion() {
        assert_eq!(monthly_rate(dec!(3.0)), dec!(0.0025));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }
}
