pub mod cash_flow;
pub mod lending;
pub mod validation;
