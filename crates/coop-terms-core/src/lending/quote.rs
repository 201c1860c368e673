use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::compute_amortization;
use super::rate_policy::RateBasis;
use crate::config::{LoanLimits, PolicyConfig};
use crate::error::TermsError;
use crate::types::*;
use crate::TermsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Agriculture,
    Equipment,
    Livestock,
    Housing,
    Education,
    Business,
    Personal,
    #[default]
    Other,
}

impl LoanPurpose {
    pub fn parse(raw: &str) -> Option<Self> {
        let purpose = match raw.trim().to_ascii_lowercase().as_str() {
            "agriculture" => LoanPurpose::Agriculture,
            "equipment" => LoanPurpose::Equipment,
            "livestock" => LoanPurpose::Livestock,
            "housing" => LoanPurpose::Housing,
            "education" => LoanPurpose::Education,
            "business" => LoanPurpose::Business,
            "personal" => LoanPurpose::Personal,
            "other" => LoanPurpose::Other,
            _ => return None,
        };
        Some(purpose)
    }
}

/// A loan request as captured by the loan officer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub duration_months: u32,
    #[serde(default)]
    pub purpose: LoanPurpose,
    /// Monthly income of the applicant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_income: Option<Money>,
    /// Monthly recurring expenses of the applicant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_expenses: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuote {
    pub rate_pct: Percent,
    pub rate_basis: RateBasis,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payable: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affordability: Option<Affordability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    pub disposable_income: Money,
    pub payment_to_income_ratio: Decimal,
    /// The payment fits within income left after expenses.
    pub affordable: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve the rate, amortize, round to cents and, when income is known,
/// check the payment against disposable income.
pub fn quote_loan(
    terms: &LoanTerms,
    policy: &PolicyConfig,
) -> TermsResult<ComputationOutput<LoanQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_limits(terms, &policy.loans)?;

    let decision = policy
        .rates
        .resolve_detailed(terms.principal, terms.duration_months);
    let amortization =
        compute_amortization(terms.principal, decision.rate_pct, terms.duration_months)?
            .to_cents();

    if amortization.degenerate {
        warnings.push(
            "Amortization overflowed decimal precision; payment figures clamped to zero".into(),
        );
    }

    let affordability = match terms.applicant_income {
        Some(income) => Some(assess_affordability(
            amortization.monthly_payment,
            income,
            terms.applicant_expenses.unwrap_or(Decimal::ZERO),
        )?),
        None => {
            if terms.applicant_expenses.is_some() {
                warnings.push("applicant_expenses ignored without applicant_income".into());
            }
            None
        }
    };

    if let Some(a) = &affordability {
        if !a.affordable {
            warnings.push(format!(
                "Monthly payment {} exceeds disposable income {}",
                amortization.monthly_payment, a.disposable_income
            ));
        }
    }

    tracing::debug!(
        principal = %terms.principal,
        duration_months = terms.duration_months,
        rate_pct = %decision.rate_pct,
        monthly_payment = %amortization.monthly_payment,
        "quoted loan"
    );

    let output = LoanQuote {
        rate_pct: decision.rate_pct,
        rate_basis: decision.basis,
        monthly_payment: amortization.monthly_payment,
        total_interest: amortization.total_interest,
        total_payable: amortization.total_payable,
        affordability,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal": terms.principal.to_string(),
        "duration_months": terms.duration_months,
        "purpose": terms.purpose,
        "rounding": "payment rounded to cents, half away from zero",
    });

    Ok(with_metadata(
        "Tiered Rate + Fixed-Payment Amortization",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

fn check_limits(terms: &LoanTerms, limits: &LoanLimits) -> TermsResult<()> {
    if terms.principal > limits.max_principal {
        return Err(TermsError::invalid(
            "principal",
            format!("Principal cannot exceed {}", limits.max_principal),
        ));
    }
    if terms.duration_months > limits.max_duration_months {
        return Err(TermsError::invalid(
            "duration_months",
            format!("Duration cannot exceed {} months", limits.max_duration_months),
        ));
    }
    Ok(())
}

/// Compare a monthly payment against what the applicant has left each month.
pub fn assess_affordability(
    monthly_payment: Money,
    income: Money,
    expenses: Money,
) -> TermsResult<Affordability> {
    if income <= Decimal::ZERO {
        return Err(TermsError::invalid(
            "applicant_income",
            "Income must be positive",
        ));
    }
    if expenses < Decimal::ZERO {
        return Err(TermsError::invalid(
            "applicant_expenses",
            "Expenses cannot be negative",
        ));
    }

    let disposable_income = income - expenses;
    Ok(Affordability {
        disposable_income,
        payment_to_income_ratio: (monthly_payment / income).round_dp(4),
        affordable: monthly_payment <= disposable_income,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms(principal: Money, months: u32) -> LoanTerms {
        LoanTerms {
            principal,
            duration_months: months,
            purpose: LoanPurpose::Agriculture,
            applicant_income: None,
            applicant_expenses: None,
        }
    }

    #[test]
    fn test_quote_uses_amount_tier() {
        let out = quote_loan(&terms(dec!(5000), 24), &PolicyConfig::default()).unwrap();
        let q = &out.result;
        assert_eq!(q.rate_pct, dec!(3.0));
        assert_eq!(q.monthly_payment, dec!(214.91));
        assert_eq!(q.total_payable, dec!(5157.84));
        assert_eq!(q.total_interest, dec!(157.84));
        assert!(q.affordability.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_quote_with_affordability() {
        let mut t = terms(dec!(5000), 24);
        t.applicant_income = Some(dec!(1000));
        t.applicant_expenses = Some(dec!(850));
        let out = quote_loan(&t, &PolicyConfig::default()).unwrap();
        let a = out.result.affordability.unwrap();
        assert_eq!(a.disposable_income, dec!(150));
        assert!(!a.affordable);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_expenses_without_income_warns() {
        let mut t = terms(dec!(5000), 24);
        t.applicant_expenses = Some(dec!(100));
        let out = quote_loan(&t, &PolicyConfig::default()).unwrap();
        assert!(out.result.affordability.is_none());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_affordability_rejects_zero_income() {
        assert!(assess_affordability(dec!(100), Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(assess_affordability(dec!(100), dec!(500), dec!(-1)).is_err());
    }

    #[test]
    fn test_invalid_terms_propagate() {
        assert!(quote_loan(&terms(dec!(5000), 0), &PolicyConfig::default()).is_err());
    }

    #[test]
    fn test_quote_respects_policy_limits() {
        let mut policy = PolicyConfig::default();
        policy.loans.max_duration_months = 120;
        policy.loans.max_principal = dec!(50000);

        assert!(quote_loan(&terms(dec!(50000), 120), &policy).is_ok());
        let err = quote_loan(&terms(dec!(5000), 121), &policy).unwrap_err();
        assert!(matches!(err, TermsError::InvalidInput { ref field, .. } if field == "duration_months"));
        let err = quote_loan(&terms(dec!(50000.01), 12), &policy).unwrap_err();
        assert!(matches!(err, TermsError::InvalidInput { ref field, .. } if field == "principal"));
    }

    #[test]
    fn test_purpose_defaults_to_other() {
        let t: LoanTerms =
            serde_json::from_str(r#"{ "principal": "2500", "duration_months": 12 }"#).unwrap();
        assert_eq!(t.purpose, LoanPurpose::Other);
    }
}
