pub mod amortization;
pub mod quote;
pub mod rate_policy;
pub mod schedule;
