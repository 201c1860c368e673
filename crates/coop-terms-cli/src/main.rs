mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::cash_flow::{DepositPolicyArgs, WithdrawalPolicyArgs};
use commands::lending::{LoanQuoteArgs, RateArgs, ScheduleArgs};
use commands::validation::{ValidateDepositArgs, ValidateLoanArgs, ValidateWithdrawalArgs};

/// Loan, deposit and withdrawal terms for cooperative back offices
#[derive(Parser)]
#[command(
    name = "coopterms",
    version,
    about = "Loan, deposit and withdrawal terms for cooperative back offices",
    long_about = "A CLI for computing cooperative loan quotes, amortization schedules, \
                  deposit hold periods and withdrawal limits with decimal precision, \
                  and for validating teller forms before submission."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Policy file (YAML or JSON) overriding the reference rate, hold and limit tables
    #[arg(long, global = true)]
    policy: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a loan: tiered rate, monthly payment, totals, affordability
    LoanQuote(LoanQuoteArgs),
    /// Month-by-month amortization schedule
    AmortizationSchedule(ScheduleArgs),
    /// Resolve the annual rate for an amount and duration
    Rate(RateArgs),
    /// Hold period and availability for a deposit
    DepositPolicy(DepositPolicyArgs),
    /// Funds, daily limit and authorization checks for a withdrawal
    WithdrawalPolicy(WithdrawalPolicyArgs),
    /// Validate a deposit form and resolve its policy
    ValidateDeposit(ValidateDepositArgs),
    /// Validate a withdrawal form against an account
    ValidateWithdrawal(ValidateWithdrawalArgs),
    /// Validate a loan application form and quote it
    ValidateLoan(ValidateLoanArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let policy = match input::policy::load_policy(cli.policy.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::LoanQuote(args) => commands::lending::run_loan_quote(args, &policy),
        Commands::AmortizationSchedule(args) => commands::lending::run_schedule(args, &policy),
        Commands::Rate(args) => commands::lending::run_rate(args, &policy),
        Commands::DepositPolicy(args) => commands::cash_flow::run_deposit_policy(args, &policy),
        Commands::WithdrawalPolicy(args) => {
            commands::cash_flow::run_withdrawal_policy(args, &policy)
        }
        Commands::ValidateDeposit(args) => {
            commands::validation::run_validate_deposit(args, &policy)
        }
        Commands::ValidateWithdrawal(args) => {
            commands::validation::run_validate_withdrawal(args, &policy)
        }
        Commands::ValidateLoan(args) => commands::validation::run_validate_loan(args, &policy),
        Commands::Version => {
            println!("coopterms {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
