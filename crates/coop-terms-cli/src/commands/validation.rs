use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use coop_terms_core::cash_flow::withdrawals::AccountSnapshot;
use coop_terms_core::validation::{self, DepositForm, LoanForm, WithdrawalForm};
use coop_terms_core::PolicyConfig;

use crate::input;

#[derive(Args)]
pub struct ValidateDepositArgs {
    /// Path to JSON deposit form (stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ValidateWithdrawalArgs {
    /// Path to JSON document `{ "form": {...}, "account": {...} }` (stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ValidateLoanArgs {
    /// Path to JSON loan form (stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct WithdrawalDocument {
    form: WithdrawalForm,
    account: AccountSnapshot,
}

pub fn run_validate_deposit(
    args: ValidateDepositArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let form: DepositForm = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required")?;
    let result = validation::assess_deposit(&form, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate_withdrawal(
    args: ValidateWithdrawalArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let doc: WithdrawalDocument = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required")?;
    let result = validation::assess_withdrawal(&doc.form, &doc.account, policy);
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate_loan(
    args: ValidateLoanArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let form: LoanForm = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required")?;
    let result = validation::assess_loan(&form, policy)?;
    Ok(serde_json::to_value(result)?)
}
