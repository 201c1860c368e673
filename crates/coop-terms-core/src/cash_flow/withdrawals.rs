use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{PolicyConfig, WithdrawalRules};
use crate::types::*;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalMethod {
    Cash,
    Check,
    Transfer,
}

impl WithdrawalMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(WithdrawalMethod::Cash),
            "check" | "cheque" => Some(WithdrawalMethod::Check),
            "transfer" => Some(WithdrawalMethod::Transfer),
            _ => None,
        }
    }
}

/// A validated withdrawal, ready to hand to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub account_id: String,
    pub amount: Money,
    pub method: WithdrawalMethod,
}

/// Balances of the source account at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub available_balance: Money,
    pub daily_limit: Money,
    pub today_withdrawn: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalCalcInput {
    pub amount: Money,
    #[serde(flatten)]
    pub account: AccountSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPolicy {
    pub sufficient_funds: bool,
    pub within_daily_limit: bool,
    pub authorization_required: bool,
    /// Negative when the account is already past its limit today.
    pub remaining_daily_limit: Money,
    /// No rejection condition applies.
    pub approved: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl WithdrawalRules {
    /// Classify a withdrawal against an account. Never fails; a `false`
    /// flag is a rejection the caller decides how to surface.
    pub fn resolve(&self, amount: Money, account: &AccountSnapshot) -> WithdrawalPolicy {
        let sufficient_funds = amount <= account.available_balance;
        let remaining_daily_limit = account.daily_limit - account.today_withdrawn;
        let within_daily_limit = amount <= remaining_daily_limit;

        WithdrawalPolicy {
            sufficient_funds,
            within_daily_limit,
            authorization_required: amount >= self.authorization_threshold,
            remaining_daily_limit,
            approved: sufficient_funds && within_daily_limit,
        }
    }
}

/// Funds, daily-limit and authorization flags from the reference rules.
pub fn resolve_withdrawal_policy(amount: Money, account: &AccountSnapshot) -> WithdrawalPolicy {
    WithdrawalRules::default().resolve(amount, account)
}

/// Reasons a withdrawal would be refused, in display order.
pub fn rejection_reasons(amount: Money, account: &AccountSnapshot, policy: &WithdrawalPolicy) -> Vec<String> {
    let mut reasons = Vec::new();
    if !policy.sufficient_funds {
        reasons.push(format!(
            "Insufficient funds: requested {amount}, available {}",
            account.available_balance
        ));
    }
    if !policy.within_daily_limit {
        reasons.push(format!(
            "Daily limit exceeded: requested {amount}, remaining today {}",
            policy.remaining_daily_limit.max(Decimal::ZERO)
        ));
    }
    reasons
}

/// Resolve a withdrawal policy and wrap it in the standard output envelope.
pub fn calculate_withdrawal_policy(
    input: &WithdrawalCalcInput,
    policy: &PolicyConfig,
) -> ComputationOutput<WithdrawalPolicy> {
    let start = Instant::now();

    let output = policy.withdrawals.resolve(input.amount, &input.account);
    let mut warnings = rejection_reasons(input.amount, &input.account, &output);
    if output.authorization_required {
        warnings.push(format!(
            "Supervisor authorization required for withdrawals of {} or more",
            policy.withdrawals.authorization_threshold
        ));
    }

    tracing::debug!(
        amount = %input.amount,
        approved = output.approved,
        authorization_required = output.authorization_required,
        "resolved withdrawal policy"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "amount": input.amount.to_string(),
        "authorization_threshold": policy.withdrawals.authorization_threshold.to_string(),
    });

    with_metadata(
        "Withdrawal Funds / Daily-Limit Policy",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
