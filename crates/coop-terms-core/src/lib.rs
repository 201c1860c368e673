pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

#[cfg(feature = "validation")]
pub mod validation;

pub use config::PolicyConfig;
pub use error::TermsError;
pub use types::*;

/// Standard result type for all coop-terms operations
pub type TermsResult<T> = Result<T, TermsError>;
