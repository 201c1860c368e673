//! Form-level rules that run before any terms are computed.
//!
//! Each form is a tagged union on its discriminant (`deposit_type`,
//! `method`). Every rule of the selected branch runs and all failures are
//! collected, so a form can show every problem at once.

pub mod assess;
pub mod deposit_form;
pub mod fields;
pub mod loan_form;
pub mod withdrawal_form;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use assess::{assess_deposit, assess_loan, assess_withdrawal};
pub use deposit_form::{validate_deposit, DepositForm};
pub use fields::NumberInput;
pub use loan_form::{validate_loan, LoanForm};
pub use withdrawal_form::{validate_withdrawal, WithdrawalForm};

/// Outcome of a validation pass. `valid` is true exactly when
/// `field_errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }
}

impl From<FieldErrors> for ValidationResult {
    fn from(errors: FieldErrors) -> Self {
        ValidationResult {
            valid: errors.0.is_empty(),
            field_errors: errors.0,
        }
    }
}

/// Collector used while rules run. The first message for a field wins;
/// later rules never overwrite it.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
