use serde::{Deserialize, Serialize};

use super::fields::{
    lenient_text, non_empty, positive_amount, required_date, required_text, REQUIRED,
};
use super::{FieldErrors, NumberInput, ValidationResult};
use crate::cash_flow::withdrawals::{WithdrawalMethod, WithdrawalRequest};

/// Withdrawal form as submitted. `method` selects which branch of fields
/// is checked; a missing or unknown method is reported under `method`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalForm {
    /// Source account.
    #[serde(deserialize_with = "lenient_text")]
    pub account_id: Option<String>,
    pub amount: Option<NumberInput>,
    #[serde(deserialize_with = "lenient_text")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub check: CheckWithdrawal,
    #[serde(flatten)]
    pub transfer: TransferWithdrawal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckWithdrawal {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferWithdrawal {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub external_recipient: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// Between two accounts of the cooperative.
    Internal,
    Interac,
    Wire,
}

impl TransferType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "internal" => Some(TransferType::Internal),
            "interac" => Some(TransferType::Interac),
            "wire" => Some(TransferType::Wire),
            _ => None,
        }
    }
}

impl CheckWithdrawal {
    fn check(&self, errors: &mut FieldErrors) {
        required_text("payee_name", &self.payee_name, errors);
        required_date("issue_date", &self.issue_date, errors);
    }
}

impl TransferWithdrawal {
    fn check(&self, source_account: Option<&str>, errors: &mut FieldErrors) {
        let Some(raw) = required_text("transfer_type", &self.transfer_type, errors) else {
            return;
        };
        match TransferType::parse(raw) {
            Some(TransferType::Internal) => {
                let destination = required_text("to_account_id", &self.to_account_id, errors);
                if let (Some(to), Some(from)) = (destination, source_account) {
                    if to == from {
                        errors.add(
                            "to_account_id",
                            "Destination must differ from the source account",
                        );
                    }
                }
            }
            Some(TransferType::Interac | TransferType::Wire) => {
                required_text("external_recipient", &self.external_recipient, errors);
            }
            None => errors.add(
                "transfer_type",
                "Must be one of: internal, interac, wire",
            ),
        }
    }
}

impl WithdrawalForm {
    pub fn method(&self) -> Option<WithdrawalMethod> {
        non_empty(&self.method).and_then(WithdrawalMethod::parse)
    }

    pub(crate) fn check(&self) -> (FieldErrors, Option<WithdrawalRequest>) {
        let mut errors = FieldErrors::default();
        let account_id = required_text("account_id", &self.account_id, &mut errors);
        let amount = positive_amount("amount", self.amount.as_ref(), &mut errors);

        if non_empty(&self.method).is_none() {
            errors.add("method", REQUIRED);
        } else {
            match self.method() {
                Some(WithdrawalMethod::Cash) => {}
                Some(WithdrawalMethod::Check) => self.check.check(&mut errors),
                Some(WithdrawalMethod::Transfer) => {
                    self.transfer.check(account_id, &mut errors)
                }
                None => errors.add("method", "Must be one of: cash, check, transfer"),
            }
        }

        let request = match (account_id, amount, self.method()) {
            (Some(account_id), Some(amount), Some(method)) if errors.is_empty() => {
                Some(WithdrawalRequest {
                    account_id: account_id.to_string(),
                    amount,
                    method,
                })
            }
            _ => None,
        };
        (errors, request)
    }
}

/// Validate a withdrawal form, collecting every failing field.
pub fn validate_withdrawal(form: &WithdrawalForm) -> ValidationResult {
    form.check().0.into()
}
