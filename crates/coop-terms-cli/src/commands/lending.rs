use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use coop_terms_core::lending::quote::{self, LoanPurpose, LoanTerms};
use coop_terms_core::lending::schedule;
use coop_terms_core::PolicyConfig;

use crate::input;

/// Arguments for a loan quote
#[derive(Args)]
pub struct LoanQuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub duration_months: Option<u32>,

    /// Loan purpose (agriculture, equipment, livestock, housing, ...)
    #[arg(long)]
    pub purpose: Option<String>,

    /// Applicant monthly income
    #[arg(long, alias = "income")]
    pub applicant_income: Option<Decimal>,

    /// Applicant monthly expenses
    #[arg(long, alias = "expenses")]
    pub applicant_expenses: Option<Decimal>,
}

/// Arguments for rate resolution
#[derive(Args)]
pub struct RateArgs {
    /// Loan amount
    #[arg(long)]
    pub amount: Decimal,

    /// Term in months
    #[arg(long, alias = "months")]
    pub duration_months: u32,
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file with principal, duration_months and optional rate_pct
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub duration_months: Option<u32>,

    /// Annual rate in percent; resolved from the rate table when omitted
    #[arg(long)]
    pub rate_pct: Option<Decimal>,
}

#[derive(Deserialize)]
struct ScheduleInput {
    principal: Decimal,
    duration_months: u32,
    #[serde(default)]
    rate_pct: Option<Decimal>,
}

pub fn run_loan_quote(
    args: LoanQuoteArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::read_input(args.input.as_deref())? {
        Some(terms) => terms,
        None => {
            let purpose = match args.purpose.as_deref() {
                Some(raw) => LoanPurpose::parse(raw)
                    .ok_or_else(|| format!("Unknown loan purpose '{raw}'"))?,
                None => LoanPurpose::default(),
            };
            LoanTerms {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                duration_months: args
                    .duration_months
                    .ok_or("--duration-months is required (or provide --input)")?,
                purpose,
                applicant_income: args.applicant_income,
                applicant_expenses: args.applicant_expenses,
            }
        }
    };
    let result = quote::quote_loan(&terms, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rate(args: RateArgs, policy: &PolicyConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let decision = policy.rates.resolve_detailed(args.amount, args.duration_months);
    Ok(serde_json::to_value(decision)?)
}

pub fn run_schedule(
    args: ScheduleArgs,
    policy: &PolicyConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            duration_months: args
                .duration_months
                .ok_or("--duration-months is required (or provide --input)")?,
            rate_pct: args.rate_pct,
        },
    };
    let rate_pct = schedule_input.rate_pct.unwrap_or_else(|| {
        policy
            .rates
            .resolve(schedule_input.principal, schedule_input.duration_months)
    });
    let result = schedule::build_schedule(
        schedule_input.principal,
        rate_pct,
        schedule_input.duration_months,
    )?;
    Ok(serde_json::to_value(result)?)
}
