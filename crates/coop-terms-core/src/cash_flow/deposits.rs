use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{DepositRules, PolicyConfig};
use crate::types::*;

pub use crate::config::InstrumentType;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A validated deposit, ready to hand to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub account_id: String,
    pub amount: Money,
    pub instrument_type: InstrumentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCalcInput {
    pub instrument_type: InstrumentType,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositPolicy {
    pub instrument_type: InstrumentType,
    pub hold_period_days: u32,
    pub available_immediately: Money,
    /// Portion released only after the hold period.
    pub held_amount: Money,
    pub requires_verification: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl DepositRules {
    /// Classify a deposit. Never fails: unknown instruments get the
    /// fallback rule, and availability is kept within `[0, amount]`.
    pub fn resolve(&self, instrument_type: InstrumentType, amount: Money) -> DepositPolicy {
        let rule = self.rule_for(instrument_type);
        let ceiling = amount.max(Decimal::ZERO);
        let available_immediately = match rule.immediate_cap {
            Some(cap) => ceiling.min(cap),
            None => ceiling,
        };

        DepositPolicy {
            instrument_type,
            hold_period_days: rule.hold_period_days,
            available_immediately,
            held_amount: ceiling - available_immediately,
            requires_verification: rule.verification.required_for(amount),
        }
    }
}

/// Hold period, immediate availability and verification from the
/// reference deposit table.
pub fn resolve_deposit_policy(instrument_type: InstrumentType, amount: Money) -> DepositPolicy {
    DepositRules::default().resolve(instrument_type, amount)
}

/// Resolve a deposit policy and wrap it in the standard output envelope.
pub fn calculate_deposit_policy(
    input: &DepositCalcInput,
    policy: &PolicyConfig,
) -> ComputationOutput<DepositPolicy> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.amount <= Decimal::ZERO {
        warnings.push(format!(
            "Deposit amount {} is not positive; nothing becomes available",
            input.amount
        ));
    }

    let output = policy.deposits.resolve(input.instrument_type, input.amount);
    tracing::debug!(
        instrument = %input.instrument_type,
        amount = %input.amount,
        hold_days = output.hold_period_days,
        "resolved deposit policy"
    );

    if output.held_amount > Decimal::ZERO {
        warnings.push(format!(
            "{} held for {} day(s)",
            output.held_amount, output.hold_period_days
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "instrument_type": input.instrument_type,
        "amount": input.amount.to_string(),
    });

    with_metadata(
        "Deposit Hold-Period Policy",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
