use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use coop_terms_core::cash_flow::{deposits, withdrawals};
use coop_terms_core::lending::{amortization, quote, schedule};
use coop_terms_core::validation;
use coop_terms_core::PolicyConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Reference tables unless the caller passes a policy document.
fn policy_from(policy_json: Option<String>) -> NapiResult<PolicyConfig> {
    match policy_json {
        Some(json) => PolicyConfig::from_json_str(&json).map_err(to_napi_error),
        None => Ok(PolicyConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn quote_loan(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let input: quote::LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = quote::quote_loan(&input, &policy).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AmortizationInput {
    principal: rust_decimal::Decimal,
    annual_rate_pct: rust_decimal::Decimal,
    duration_months: u32,
}

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::compute_amortization(
        input.principal,
        input.annual_rate_pct,
        input.duration_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        schedule::build_schedule(input.principal, input.annual_rate_pct, input.duration_months)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

#[napi]
pub fn deposit_policy(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let input: deposits::DepositCalcInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deposits::calculate_deposit_policy(&input, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn withdrawal_policy(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let input: withdrawals::WithdrawalCalcInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = withdrawals::calculate_withdrawal_policy(&input, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_deposit(form_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let form: validation::DepositForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let output = validation::assess_deposit(&form, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_withdrawal(
    form_json: String,
    account_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let form: validation::WithdrawalForm =
        serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let account: withdrawals::AccountSnapshot =
        serde_json::from_str(&account_json).map_err(to_napi_error)?;
    let output = validation::assess_withdrawal(&form, &account, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_loan(form_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let policy = policy_from(policy_json)?;
    let form: validation::LoanForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let output = validation::assess_loan(&form, &policy).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
