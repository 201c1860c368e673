use serde::{Deserialize, Serialize};

use super::fields::{lenient_text, non_empty, positive_amount, required_date, required_text};
use super::{FieldErrors, NumberInput, ValidationResult};
use crate::cash_flow::deposits::{DepositRequest, InstrumentType};

/// Deposit form as submitted by a teller, before any coercion. Every field is
/// optional at the wire level; a missing or unknown `deposit_type` is a field
/// error, not a rejected payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositForm {
    #[serde(deserialize_with = "lenient_text")]
    pub account_id: Option<String>,
    pub amount: Option<NumberInput>,
    #[serde(deserialize_with = "lenient_text")]
    pub deposit_type: Option<String>,
    #[serde(flatten)]
    pub check: CheckDeposit,
    #[serde(flatten)]
    pub transfer: TransferDeposit,
    #[serde(flatten)]
    pub other: OtherDeposit,
}

/// Branch of the deposit form selected by `deposit_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositKind {
    Cash,
    Check,
    Transfer,
    Other,
}

impl DepositKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(DepositKind::Cash),
            "check" | "cheque" => Some(DepositKind::Check),
            "transfer" => Some(DepositKind::Transfer),
            "other" => Some(DepositKind::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    #[default]
    Personal,
    Business,
    Government,
}

impl CheckKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "personal" => Some(CheckKind::Personal),
            "business" => Some(CheckKind::Business),
            "government" => Some(CheckKind::Government),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckDeposit {
    /// Personal when absent.
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub check_kind: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub check_bank: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub check_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferDeposit {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub transfer_reference: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherDeposit {
    /// Where the money comes from, e.g. "subsidy" or "crop_sale".
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CheckDeposit {
    fn kind(&self) -> Option<CheckKind> {
        match non_empty(&self.check_kind) {
            Some(raw) => CheckKind::parse(raw),
            None => Some(CheckKind::default()),
        }
    }

    fn check(&self, errors: &mut FieldErrors) {
        if self.kind().is_none() {
            errors.add("check_kind", "Must be one of: personal, business, government");
        }
        required_text("check_number", &self.check_number, errors);
        required_text("check_bank", &self.check_bank, errors);
        required_date("check_date", &self.check_date, errors);
    }
}

impl TransferDeposit {
    fn check(&self, errors: &mut FieldErrors) {
        required_text("transfer_reference", &self.transfer_reference, errors);
        required_text("sender_name", &self.sender_name, errors);
    }
}

impl OtherDeposit {
    fn check(&self, errors: &mut FieldErrors) {
        if non_empty(&self.source).is_none() && non_empty(&self.description).is_none() {
            errors.add("source", "Provide a source or a description");
        }
    }
}

impl DepositForm {
    pub fn kind(&self) -> Option<DepositKind> {
        non_empty(&self.deposit_type).and_then(DepositKind::parse)
    }

    /// Instrument the hold-period policy applies to this form, once its
    /// branch is known.
    pub fn instrument_type(&self) -> Option<InstrumentType> {
        let instrument = match self.kind()? {
            DepositKind::Cash => InstrumentType::Cash,
            DepositKind::Check => match self.check.kind()? {
                CheckKind::Personal => InstrumentType::CheckPersonal,
                CheckKind::Business => InstrumentType::CheckBusiness,
                CheckKind::Government => InstrumentType::CheckGovernment,
            },
            DepositKind::Transfer => InstrumentType::TransferReceived,
            DepositKind::Other => match non_empty(&self.other.source).map(InstrumentType::parse) {
                Some(t @ (InstrumentType::Subsidy | InstrumentType::CropSale)) => t,
                _ => InstrumentType::Other,
            },
        };
        Some(instrument)
    }

    /// Run every rule for this form's branch. Returns the collected errors
    /// and, when nothing failed, the normalized request.
    pub(crate) fn check(&self) -> (FieldErrors, Option<DepositRequest>) {
        let mut errors = FieldErrors::default();
        let account_id = required_text("account_id", &self.account_id, &mut errors);
        let amount = positive_amount("amount", self.amount.as_ref(), &mut errors);

        match non_empty(&self.deposit_type) {
            None => errors.add("deposit_type", super::fields::REQUIRED),
            Some(raw) => match DepositKind::parse(raw) {
                Some(DepositKind::Cash) => {}
                Some(DepositKind::Check) => self.check.check(&mut errors),
                Some(DepositKind::Transfer) => self.transfer.check(&mut errors),
                Some(DepositKind::Other) => self.other.check(&mut errors),
                None => errors.add(
                    "deposit_type",
                    "Must be one of: cash, check, transfer, other",
                ),
            },
        }

        let request = match (account_id, amount, self.instrument_type()) {
            (Some(account_id), Some(amount), Some(instrument_type)) if errors.is_empty() => {
                Some(DepositRequest {
                    account_id: account_id.to_string(),
                    amount,
                    instrument_type,
                })
            }
            _ => None,
        };
        (errors, request)
    }
}

/// Validate a deposit form, collecting every failing field.
pub fn validate_deposit(form: &DepositForm) -> ValidationResult {
    form.check().0.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> DepositForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_cash_deposit_valid() {
        let form = parse(r#"{ "deposit_type": "cash", "account_id": "ACC-1", "amount": 200 }"#);
        let result = validate_deposit(&form);
        assert!(result.valid);
        assert_eq!(form.instrument_type(), Some(InstrumentType::Cash));
    }

    #[test]
    fn test_check_missing_date() {
        let form = parse(
            r#"{ "deposit_type": "check", "account_id": "ACC-1", "amount": "300",
                 "check_number": "000123", "check_bank": "Caisse Centrale" }"#,
        );
        let result = validate_deposit(&form);
        assert!(!result.valid);
        assert_eq!(result.error("check_date"), Some("Required"));
        assert_eq!(result.field_errors.len(), 1);
    }

    #[test]
    fn test_check_collects_all_errors() {
        let form = parse(r#"{ "deposit_type": "check", "amount": 0, "check_date": "01/02/2024" }"#);
        let result = validate_deposit(&form);
        let fields: Vec<&str> = result.field_errors.keys().map(String::as_str).collect();
        assert_eq!(
            fields,
            vec!["account_id", "amount", "check_bank", "check_date", "check_number"]
        );
    }

    #[test]
    fn test_check_kind_maps_to_instrument() {
        let form = parse(r#"{ "deposit_type": "check", "check_kind": "government" }"#);
        assert_eq!(form.instrument_type(), Some(InstrumentType::CheckGovernment));
        let form = parse(r#"{ "deposit_type": "check" }"#);
        assert_eq!(form.instrument_type(), Some(InstrumentType::CheckPersonal));
    }

    #[test]
    fn test_transfer_requires_reference_and_sender() {
        let form = parse(r#"{ "deposit_type": "transfer", "account_id": "A", "amount": 10, "sender_name": " " }"#);
        let result = validate_deposit(&form);
        assert_eq!(result.error("transfer_reference"), Some("Required"));
        assert_eq!(result.error("sender_name"), Some("Required"));
    }

    #[test]
    fn test_other_needs_source_or_description() {
        let missing = parse(r#"{ "deposit_type": "other", "account_id": "A", "amount": 10 }"#);
        assert!(validate_deposit(&missing).error("source").is_some());

        let described = parse(
            r#"{ "deposit_type": "other", "account_id": "A", "amount": 10, "description": "refund" }"#,
        );
        assert!(validate_deposit(&described).valid);
        assert_eq!(described.instrument_type(), Some(InstrumentType::Other));
    }

    #[test]
    fn test_other_source_selects_policy() {
        let form = parse(r#"{ "deposit_type": "other", "source": "Crop Sale" }"#);
        assert_eq!(form.instrument_type(), Some(InstrumentType::CropSale));
        let form = parse(r#"{ "deposit_type": "other", "source": "cash" }"#);
        assert_eq!(form.instrument_type(), Some(InstrumentType::Other));
    }

    #[test]
    fn test_valid_form_yields_request() {
        let form = parse(r#"{ "deposit_type": "other", "account_id": " A-7 ", "amount": "1,500", "source": "subsidy" }"#);
        let (errors, request) = form.check();
        assert!(errors.is_empty());
        let request = request.unwrap();
        assert_eq!(request.account_id, "A-7");
        assert_eq!(request.instrument_type, InstrumentType::Subsidy);
    }

    #[test]
    fn test_missing_deposit_type_is_a_field_error() {
        let form = parse(r#"{ "account_id": "A", "amount": 10 }"#);
        let result = validate_deposit(&form);
        assert_eq!(result.error("deposit_type"), Some("Required"));
        assert_eq!(result.field_errors.len(), 1);
        assert_eq!(form.instrument_type(), None);
    }

    #[test]
    fn test_unknown_deposit_type_is_a_field_error() {
        let form = parse(r#"{ "deposit_type": "barter", "account_id": "A", "amount": 10 }"#);
        let (errors, request) = form.check();
        assert!(errors.contains("deposit_type"));
        assert!(request.is_none());
    }

    #[test]
    fn test_unknown_check_kind_is_a_field_error() {
        let form = parse(
            r#"{ "deposit_type": "check", "account_id": "A", "amount": 10, "check_kind": "foreign",
                 "check_number": 1187, "check_bank": "BNC", "check_date": "2024-06-01" }"#,
        );
        let result = validate_deposit(&form);
        assert_eq!(
            result.error("check_kind"),
            Some("Must be one of: personal, business, government")
        );
        assert_eq!(result.field_errors.len(), 1);
    }

    #[test]
    fn test_numeric_check_number_is_accepted() {
        let form = parse(
            r#"{ "deposit_type": "Cheque", "account_id": 42, "amount": 10,
                 "check_number": 1187, "check_bank": "BNC", "check_date": "2024-06-01" }"#,
        );
        let (errors, request) = form.check();
        assert!(errors.is_empty());
        assert_eq!(request.unwrap().account_id, "42");
    }
}
