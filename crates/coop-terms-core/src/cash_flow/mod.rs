pub mod deposits;
pub mod withdrawals;
