use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use coop_terms_core::cash_flow::deposits::{self, DepositCalcInput, InstrumentType};
use coop_terms_core::cash_flow::withdrawals::{self, AccountSnapshot, WithdrawalCalcInput};
use coop_terms_core::PolicyConfig;

use crate::input;

/// Arguments for deposit policy resolution
#[derive(Args)]
pub struct DepositPolicyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Instrument: cash, check_personal, check_business, check_government,
    /// transfer_received, subsidy, crop_sale, other
    #[arg(long, alias = "instrument")]
    pub instrument_type: Option<String>,

    /// Deposit amount
    #[arg(long)]
    pub amount: Option<Decimal>,
}

/// Arguments for withdrawal policy resolution
#[derive(Args)]
pub struct WithdrawalPolicyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Withdrawal amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Balance available on the source account
    #[arg(long, alias = "balance")]
    pub available_balance: Option<Decimal>,

    /// Account daily withdrawal limit
    #[arg(long)]
    pub daily_limit: Option<Decimal>,

    /// Amount already withdrawn today
    #[arg(long, default_value = "0")]
    pub today_withdrawn: Decimal,
}

pub fn run_deposit_policy(
    args: DepositPolicyArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input: DepositCalcInput = match input::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => DepositCalcInput {
            instrument_type: InstrumentType::parse(
                &args
                    .instrument_type
                    .ok_or("--instrument-type is required (or provide --input)")?,
            ),
            amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
        },
    };
    let result = deposits::calculate_deposit_policy(&calc_input, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_withdrawal_policy(
    args: WithdrawalPolicyArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input: WithdrawalCalcInput = match input::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => WithdrawalCalcInput {
            amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            account: AccountSnapshot {
                available_balance: args
                    .available_balance
                    .ok_or("--available-balance is required (or provide --input)")?,
                daily_limit: args
                    .daily_limit
                    .ok_or("--daily-limit is required (or provide --input)")?,
                today_withdrawn: args.today_withdrawn,
            },
        },
    };
    let result = withdrawals::calculate_withdrawal_policy(&calc_input, policy);
    Ok(serde_json::to_value(result)?)
}
