use serde::{Deserialize, Serialize};

use super::fields::{
    at_most, lenient_text, optional_non_negative_amount, optional_positive_amount,
    positive_amount, positive_months, required_text,
};
use super::{FieldErrors, NumberInput, ValidationResult};
use crate::config::{LoanLimits, PolicyConfig};
use crate::lending::quote::{LoanPurpose, LoanTerms};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanForm {
    pub principal: Option<NumberInput>,
    pub duration_months: Option<NumberInput>,
    #[serde(deserialize_with = "lenient_text")]
    pub purpose: Option<String>,
    pub applicant_income: Option<NumberInput>,
    pub applicant_expenses: Option<NumberInput>,
}

impl LoanForm {
    /// Terms are only produced within `limits`, so a valid form always
    /// amortizes without hitting decimal overflow.
    pub(crate) fn check(&self, limits: &LoanLimits) -> (FieldErrors, Option<LoanTerms>) {
        let mut errors = FieldErrors::default();

        let principal = at_most(
            "principal",
            positive_amount("principal", self.principal.as_ref(), &mut errors),
            limits.max_principal,
            &mut errors,
        );
        let duration_months = positive_months(
            "duration_months",
            self.duration_months.as_ref(),
            limits.max_duration_months,
            &mut errors,
        );
        let purpose = required_text("purpose", &self.purpose, &mut errors).and_then(|raw| {
            let parsed = LoanPurpose::parse(raw);
            if parsed.is_none() {
                errors.add("purpose", "Unknown loan purpose");
            }
            parsed
        });
        let applicant_income = optional_positive_amount(
            "applicant_income",
            self.applicant_income.as_ref(),
            &mut errors,
        );
        let applicant_expenses = optional_non_negative_amount(
            "applicant_expenses",
            self.applicant_expenses.as_ref(),
            &mut errors,
        );

        let terms = match (principal, duration_months, purpose) {
            (Some(principal), Some(duration_months), Some(purpose)) if errors.is_empty() => {
                Some(LoanTerms {
                    principal,
                    duration_months,
                    purpose,
                    applicant_income,
                    applicant_expenses,
                })
            }
            _ => None,
        };
        (errors, terms)
    }
}

/// Validate a loan application form against the policy's loan limits,
/// collecting every failing field.
pub fn validate_loan(form: &LoanForm, policy: &PolicyConfig) -> ValidationResult {
    form.check(&policy.loans).0.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_loan_form() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": "5,000", "duration_months": "24", "purpose": "Agriculture" }"#,
        )
        .unwrap();
        let (errors, terms) = form.check(&LoanLimits::default());
        assert!(errors.is_empty());
        let terms = terms.unwrap();
        assert_eq!(terms.principal, dec!(5000));
        assert_eq!(terms.duration_months, 24);
        assert_eq!(terms.purpose, LoanPurpose::Agriculture);
    }

    #[test]
    fn test_empty_loan_form() {
        let result = validate_loan(&LoanForm::default(), &PolicyConfig::default());
        assert!(!result.valid);
        assert_eq!(result.error("principal"), Some("Required"));
        assert_eq!(result.error("duration_months"), Some("Required"));
        assert_eq!(result.error("purpose"), Some("Required"));
        assert_eq!(result.field_errors.len(), 3);
    }

    #[test]
    fn test_bad_optional_fields() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": 100, "duration_months": 6, "purpose": "yacht",
                 "applicant_income": 0, "applicant_expenses": "-5" }"#,
        )
        .unwrap();
        let result = validate_loan(&form, &PolicyConfig::default());
        assert_eq!(result.error("purpose"), Some("Unknown loan purpose"));
        assert_eq!(result.error("applicant_income"), Some("Must be greater than zero"));
        assert_eq!(result.error("applicant_expenses"), Some("Cannot be negative"));
    }

    #[test]
    fn test_duration_above_policy_limit() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": 5000, "duration_months": 100000, "purpose": "personal" }"#,
        )
        .unwrap();
        let result = validate_loan(&form, &PolicyConfig::default());
        assert!(!result.valid);
        assert_eq!(result.error("duration_months"), Some("Cannot exceed 600 months"));

        let mut policy = PolicyConfig::default();
        policy.loans.max_duration_months = 60;
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": 5000, "duration_months": 61, "purpose": "personal" }"#,
        )
        .unwrap();
        assert_eq!(
            validate_loan(&form, &policy).error("duration_months"),
            Some("Cannot exceed 60 months")
        );
    }

    #[test]
    fn test_principal_above_policy_limit() {
        let form: LoanForm = serde_json::from_str(
            r#"{ "principal": "10,000,000.01", "duration_months": 12, "purpose": "housing" }"#,
        )
        .unwrap();
        let (errors, terms) = form.check(&LoanLimits::default());
        assert!(errors.contains("principal"));
        assert!(terms.is_none());
    }
}
