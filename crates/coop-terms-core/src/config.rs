use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Money, Percent};
use crate::{TermsError, TermsResult};

// ---------------------------------------------------------------------------
// Policy tables
// ---------------------------------------------------------------------------

/// Longest term the amortization engine accepts, in months.
pub const MAX_LOAN_TERM_MONTHS: u32 = 600;

/// Largest principal a policy may allow. Below this bound, with rates under
/// 100% and terms up to [`MAX_LOAN_TERM_MONTHS`], amortization stays within
/// decimal range.
pub const MAX_LOAN_PRINCIPAL: Money = dec!(1_000_000_000_000_000);

/// Every threshold the calculators consult. `Default` is the cooperative's
/// reference product table; a deployment can override it from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub rates: RateTable,
    pub loans: LoanLimits,
    pub deposits: DepositRules,
    pub withdrawals: WithdrawalRules,
}

/// Loan rate tiers. Amount tiers are checked in ascending order and the
/// long-term override only applies when no amount tier matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub amount_tiers: Vec<RateTier>,
    pub long_term: LongTermRate,
    pub default_rate_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    /// Inclusive upper bound on the principal.
    pub max_amount: Money,
    pub rate_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermRate {
    /// Applies to durations strictly longer than this many months.
    pub after_months: u32,
    pub rate_pct: Percent,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            amount_tiers: vec![
                RateTier { max_amount: dec!(1000), rate_pct: dec!(2.5) },
                RateTier { max_amount: dec!(5000), rate_pct: dec!(3.0) },
                RateTier { max_amount: dec!(10000), rate_pct: dec!(3.5) },
            ],
            long_term: LongTermRate {
                after_months: 24,
                rate_pct: dec!(4.0),
            },
            default_rate_pct: dec!(3.5),
        }
    }
}

/// Bounds a loan application must fall within before it is quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLimits {
    /// Inclusive.
    pub max_principal: Money,
    /// Inclusive; at most [`MAX_LOAN_TERM_MONTHS`].
    pub max_duration_months: u32,
}

impl Default for LoanLimits {
    fn default() -> Self {
        Self {
            max_principal: dec!(10_000_000),
            max_duration_months: MAX_LOAN_TERM_MONTHS,
        }
    }
}

/// Deposit instrument as seen by the hold-period policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    Cash,
    CheckPersonal,
    CheckBusiness,
    CheckGovernment,
    TransferReceived,
    Subsidy,
    CropSale,
    Other,
}

impl InstrumentType {
    /// Lenient parse: case, spaces and hyphens are ignored, "cheque" is
    /// accepted for "check", and anything unrecognised is `Other`.
    pub fn parse(raw: &str) -> Self {
        let key = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['-', ' '], "_")
            .replace("cheque", "check");
        match key.as_str() {
            "cash" => InstrumentType::Cash,
            "check_personal" => InstrumentType::CheckPersonal,
            "check_business" => InstrumentType::CheckBusiness,
            "check_government" => InstrumentType::CheckGovernment,
            "transfer_received" => InstrumentType::TransferReceived,
            "subsidy" => InstrumentType::Subsidy,
            "crop_sale" => InstrumentType::CropSale,
            _ => InstrumentType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Cash => "cash",
            InstrumentType::CheckPersonal => "check_personal",
            InstrumentType::CheckBusiness => "check_business",
            InstrumentType::CheckGovernment => "check_government",
            InstrumentType::TransferReceived => "transfer_received",
            InstrumentType::Subsidy => "subsidy",
            InstrumentType::CropSale => "crop_sale",
            InstrumentType::Other => "other",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstrumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(InstrumentType::parse(&raw))
    }
}

/// When a deposit has to be verified by staff before release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    Always,
    Never,
    /// Strictly greater than the threshold.
    Above(Money),
}

impl Verification {
    pub fn required_for(&self, amount: Money) -> bool {
        match self {
            Verification::Always => true,
            Verification::Never => false,
            Verification::Above(threshold) => amount > *threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRule {
    pub hold_period_days: u32,
    /// Cap on the portion released immediately; `None` releases everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate_cap: Option<Money>,
    pub verification: Verification,
}

impl DepositRule {
    fn new(hold_period_days: u32, immediate_cap: Option<Money>, verification: Verification) -> Self {
        Self {
            hold_period_days,
            immediate_cap,
            verification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRules {
    pub instruments: BTreeMap<InstrumentType, DepositRule>,
    /// Used for `other` and for any instrument missing from the map.
    pub fallback: DepositRule,
}

impl DepositRules {
    pub fn rule_for(&self, instrument: InstrumentType) -> &DepositRule {
        self.instruments.get(&instrument).unwrap_or(&self.fallback)
    }
}

impl Default for DepositRules {
    fn default() -> Self {
        use InstrumentType::*;
        use Verification::*;

        let instruments = BTreeMap::from([
            (Cash, DepositRule::new(0, None, Above(dec!(10000)))),
            (CheckPersonal, DepositRule::new(5, Some(dec!(500)), Always)),
            (CheckBusiness, DepositRule::new(7, Some(dec!(1000)), Always)),
            (CheckGovernment, DepositRule::new(2, Some(dec!(2000)), Always)),
            (TransferReceived, DepositRule::new(1, None, Above(dec!(5000)))),
            (Subsidy, DepositRule::new(3, None, Always)),
            (CropSale, DepositRule::new(3, Some(dec!(5000)), Above(dec!(10000)))),
        ]);

        Self {
            instruments,
            fallback: DepositRule::new(5, Some(dec!(500)), Always),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRules {
    /// Withdrawals at or above this amount need supervisor approval.
    pub authorization_threshold: Money,
}

impl Default for WithdrawalRules {
    fn default() -> Self {
        Self {
            authorization_threshold: dec!(1000),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl PolicyConfig {
    /// Parse a JSON policy document and validate it.
    pub fn from_json_str(json: &str) -> TermsResult<Self> {
        let config: PolicyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the resolvers cannot apply consistently.
    pub fn validate(&self) -> TermsResult<()> {
        let rates = &self.rates;
        let mut previous: Option<Money> = None;
        for (i, tier) in rates.amount_tiers.iter().enumerate() {
            if tier.max_amount <= Decimal::ZERO {
                return Err(TermsError::InvalidPolicy(format!(
                    "rate tier {i}: max_amount must be positive"
                )));
            }
            if let Some(prev) = previous {
                if tier.max_amount <= prev {
                    return Err(TermsError::InvalidPolicy(format!(
                        "rate tier {i}: max_amount {} must exceed previous tier {prev}",
                        tier.max_amount
                    )));
                }
            }
            check_rate(&format!("rate tier {i}"), tier.rate_pct)?;
            previous = Some(tier.max_amount);
        }
        check_rate("long_term", rates.long_term.rate_pct)?;
        check_rate("default_rate_pct", rates.default_rate_pct)?;

        let loans = &self.loans;
        if loans.max_principal <= Decimal::ZERO || loans.max_principal > MAX_LOAN_PRINCIPAL {
            return Err(TermsError::InvalidPolicy(format!(
                "loans: max_principal must be in (0, {MAX_LOAN_PRINCIPAL}]"
            )));
        }
        if loans.max_duration_months == 0 || loans.max_duration_months > MAX_LOAN_TERM_MONTHS {
            return Err(TermsError::InvalidPolicy(format!(
                "loans: max_duration_months must be in [1, {MAX_LOAN_TERM_MONTHS}]"
            )));
        }

        let deposits = &self.deposits;
        for (instrument, rule) in deposits
            .instruments
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .chain(std::iter::once(("fallback", &deposits.fallback)))
        {
            if let Some(cap) = rule.immediate_cap {
                if cap < Decimal::ZERO {
                    return Err(TermsError::InvalidPolicy(format!(
                        "deposit rule '{instrument}': immediate_cap cannot be negative"
                    )));
                }
            }
            if let Verification::Above(threshold) = rule.verification {
                if threshold < Decimal::ZERO {
                    return Err(TermsError::InvalidPolicy(format!(
                        "deposit rule '{instrument}': verification threshold cannot be negative"
                    )));
                }
            }
        }

        if self.withdrawals.authorization_threshold < Decimal::ZERO {
            return Err(TermsError::InvalidPolicy(
                "authorization_threshold cannot be negative".into(),
            ));
        }

        Ok(())
    }
}

fn check_rate(label: &str, rate_pct: Percent) -> TermsResult<()> {
    if rate_pct < Decimal::ZERO || rate_pct >= dec!(100) {
        return Err(TermsError::InvalidPolicy(format!(
            "{label}: rate {rate_pct}% must be in [0, 100)"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
