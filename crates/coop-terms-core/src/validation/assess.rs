use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{DepositForm, LoanForm, ValidationResult, WithdrawalForm};
use crate::cash_flow::deposits::{DepositPolicy, DepositRequest};
use crate::cash_flow::withdrawals::{
    rejection_reasons, AccountSnapshot, WithdrawalPolicy, WithdrawalRequest,
};
use crate::config::PolicyConfig;
use crate::lending::quote::{quote_loan, LoanQuote, LoanTerms};
use crate::types::*;
use crate::TermsResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Validation outcome plus the derived terms. `request` and `policy` are
/// present only when the form itself was valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositAssessment {
    pub validation: ValidationResult,
    pub request: Option<DepositRequest>,
    pub policy: Option<DepositPolicy>,
}

/// `validation` also carries policy rejections (insufficient funds, daily
/// limit) under `amount`, so a UI can block submission from one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalAssessment {
    pub validation: ValidationResult,
    pub request: Option<WithdrawalRequest>,
    pub policy: Option<WithdrawalPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAssessment {
    pub validation: ValidationResult,
    pub terms: Option<LoanTerms>,
    pub quote: Option<LoanQuote>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a deposit form and, if valid, resolve its hold-period policy.
pub fn assess_deposit(
    form: &DepositForm,
    policy: &PolicyConfig,
) -> ComputationOutput<DepositAssessment> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (errors, request) = form.check();
    let resolved = request
        .as_ref()
        .map(|r| policy.deposits.resolve(r.instrument_type, r.amount));

    if let Some(p) = &resolved {
        if p.requires_verification {
            warnings.push("Deposit requires staff verification before release".into());
        }
        if p.hold_period_days > 0 {
            warnings.push(format!(
                "{} available now, {} held for {} day(s)",
                p.available_immediately, p.held_amount, p.hold_period_days
            ));
        }
    }

    let validation = ValidationResult::from(errors);
    tracing::debug!(
        valid = validation.valid,
        instrument = ?form.instrument_type(),
        "assessed deposit form"
    );

    let output = DepositAssessment {
        validation,
        request,
        policy: resolved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "instrument_type": form.instrument_type(),
    });

    with_metadata(
        "Deposit Form Validation + Hold-Period Policy",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

/// Validate a withdrawal form against the source account. Rejections are
/// reported as `amount` field errors; authorization is advisory.
pub fn assess_withdrawal(
    form: &WithdrawalForm,
    account: &AccountSnapshot,
    policy: &PolicyConfig,
) -> ComputationOutput<WithdrawalAssessment> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (mut errors, request) = form.check();
    let resolved = request
        .as_ref()
        .map(|r| policy.withdrawals.resolve(r.amount, account));

    if let (Some(r), Some(p)) = (&request, &resolved) {
        let reasons = rejection_reasons(r.amount, account, p);
        if !reasons.is_empty() {
            errors.add("amount", reasons.join("; "));
        }
        if p.authorization_required {
            warnings.push(format!(
                "Supervisor authorization required for withdrawals of {} or more",
                policy.withdrawals.authorization_threshold
            ));
        }
    }

    let validation = ValidationResult::from(errors);
    tracing::debug!(
        valid = validation.valid,
        method = ?form.method(),
        "assessed withdrawal form"
    );

    let output = WithdrawalAssessment {
        validation,
        request,
        policy: resolved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "method": form.method(),
        "available_balance": account.available_balance.to_string(),
        "daily_limit": account.daily_limit.to_string(),
        "today_withdrawn": account.today_withdrawn.to_string(),
    });

    with_metadata(
        "Withdrawal Form Validation + Funds / Daily-Limit Policy",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

/// Validate a loan form and, if valid, quote it.
pub fn assess_loan(
    form: &LoanForm,
    policy: &PolicyConfig,
) -> TermsResult<ComputationOutput<LoanAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (errors, terms) = form.check(&policy.loans);
    let quote = match &terms {
        Some(t) => {
            let quoted = quote_loan(t, policy)?;
            warnings.extend(quoted.warnings);
            Some(quoted.result)
        }
        None => None,
    };

    let validation = ValidationResult::from(errors);
    tracing::debug!(valid = validation.valid, "assessed loan form");

    let output = LoanAssessment {
        validation,
        terms,
        quote,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "rate_tiers": policy.rates.amount_tiers.len(),
        "max_principal": policy.loans.max_principal.to_string(),
        "max_duration_months": policy.loans.max_duration_months,
        "long_term_after_months": policy.rates.long_term.after_months,
    });

    Ok(with_metadata(
        "Loan Form Validation + Tiered Rate Amortization",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account() -> AccountSnapshot {
        AccountSnapshot {
            available_balance: dec!(1000),
            daily_limit: dec!(3000),
            today_withdrawn: dec!(0),
        }
    }

    #[test]
    fn test_invalid_deposit_has_no_policy() {
        let form: DepositForm =
            serde_json::from_str(r#"{ "deposit_type": "check", "account_id": "A", "amount": 300 }"#)
                .unwrap();
        let out = assess_deposit(&form, &PolicyConfig::default());
        assert!(!out.result.validation.valid);
        assert!(out.result.policy.is_none());
        assert!(out.result.request.is_none());
    }

    #[test]
    fn test_valid_check_deposit_gets_policy() {
        let form: DepositForm = serde_json::from_str(
            r#"{ "deposit_type": "check", "account_id": "A", "amount": 300,
                 "check_number": "42", "check_bank": "BNC", "check_date": "2024-06-01" }"#,
        )
        .unwrap();
        let out = assess_deposit(&form, &PolicyConfig::default());
        let policy = out.result.policy.unwrap();
        assert_eq!(policy.hold_period_days, 5);
        assert_eq!(policy.available_immediately, dec!(300));
        assert!(policy.requires_verification);
    }

    #[test]
    fn test_overdrawn_withdrawal_is_rejected() {
        let form: WithdrawalForm =
            serde_json::from_str(r#"{ "method": "cash", "account_id": "A", "amount": 1200 }"#)
                .unwrap();
        let out = assess_withdrawal(&form, &account(), &PolicyConfig::default());
        let a = &out.result;
        assert!(!a.validation.valid);
        assert!(a.validation.error("amount").unwrap().starts_with("Insufficient funds"));
        assert!(!a.policy.as_ref().unwrap().sufficient_funds);
        assert!(a.request.is_some());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_withdrawal_within_limits() {
        let form: WithdrawalForm =
            serde_json::from_str(r#"{ "method": "cash", "account_id": "A", "amount": 200 }"#)
                .unwrap();
        let out = assess_withdrawal(&form, &account(), &PolicyConfig::default());
        assert!(out.result.validation.valid);
        assert!(out.result.policy.unwrap().approved);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_loan_assessment_quotes_valid_form() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": 5000, "duration_months": 24, "purpose": "equipment" }"#,
        )
        .unwrap();
        let out = assess_loan(&form, &PolicyConfig::default()).unwrap();
        let quote = out.result.quote.unwrap();
        assert_eq!(quote.rate_pct, dec!(3.0));
        assert_eq!(quote.monthly_payment, dec!(214.91));
    }

    #[test]
    fn test_loan_assessment_skips_quote_on_errors() {
        let form: LoanForm =
            serde_json::from_str(r#"{ "principal": "abc", "duration_months": 0 }"#).unwrap();
        let out = assess_loan(&form, &PolicyConfig::default()).unwrap();
        assert!(out.result.quote.is_none());
        assert_eq!(out.result.validation.field_errors.len(), 3);
    }

    #[test]
    fn test_overlong_loan_is_invalid_not_clamped() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": 5000, "duration_months": 100000, "purpose": "personal" }"#,
        )
        .unwrap();
        let out = assess_loan(&form, &PolicyConfig::default()).unwrap();
        assert!(!out.result.validation.valid);
        assert!(out.result.validation.error("duration_months").is_some());
        assert!(out.result.quote.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_deposit_without_type_reports_field_error() {
        let form: DepositForm =
            serde_json::from_str(r#"{ "account_id": "A", "amount": 300 }"#).unwrap();
        let out = assess_deposit(&form, &PolicyConfig::default());
        assert_eq!(out.result.validation.error("deposit_type"), Some("Required"));
        assert!(out.result.policy.is_none());
    }

    #[test]
    fn test_withdrawal_with_unknown_method_reports_field_error() {
        let form: WithdrawalForm =
            serde_json::from_str(r#"{ "method": "atm", "account_id": "A", "amount": 100 }"#)
                .unwrap();
        let out = assess_withdrawal(&form, &account(), &PolicyConfig::default());
        assert_eq!(
            out.result.validation.error("method"),
            Some("Must be one of: cash, check, transfer")
        );
        assert!(out.result.policy.is_none());
    }
}
