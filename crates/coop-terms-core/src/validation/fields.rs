use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::FieldErrors;
use crate::types::Money;

pub const REQUIRED: &str = "Required";
pub const NOT_A_NUMBER: &str = "Must be a valid number";
pub const NOT_POSITIVE: &str = "Must be greater than zero";
pub const NEGATIVE: &str = "Cannot be negative";
pub const NOT_WHOLE_MONTHS: &str = "Must be a whole number of months";
pub const BAD_DATE_FORMAT: &str = "Must be a date in YYYY-MM-DD format";
pub const BAD_CALENDAR_DATE: &str = "Not a valid calendar date";

/// A numeric form field as typed: a JSON number, free text, or anything
/// else the client sent (out-of-range numbers, booleans, arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(Decimal),
    Text(String),
    Unparseable(Value),
}

impl From<Decimal> for NumberInput {
    fn from(value: Decimal) -> Self {
        NumberInput::Number(value)
    }
}

impl From<&str> for NumberInput {
    fn from(value: &str) -> Self {
        NumberInput::Text(value.to_string())
    }
}

enum Parsed {
    Missing,
    Invalid,
    Value(Decimal),
}

fn parse_number(input: Option<&NumberInput>) -> Parsed {
    match input {
        None => Parsed::Missing,
        Some(NumberInput::Number(d)) => Parsed::Value(*d),
        Some(NumberInput::Text(raw)) => {
            let cleaned: String = raw
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return Parsed::Missing;
            }
            match Decimal::from_str(&cleaned) {
                Ok(d) => Parsed::Value(d),
                Err(_) => Parsed::Invalid,
            }
        }
        Some(NumberInput::Unparseable(_)) => Parsed::Invalid,
    }
}

/// Deserialize a free-text form field without rejecting the payload:
/// numbers and booleans keep their JSON spelling, `null` is absent.
pub fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };
    Ok(text)
}

/// Flag an amount above an inclusive ceiling.
pub fn at_most(field: &str, value: Option<Money>, max: Money, errors: &mut FieldErrors) -> Option<Money> {
    match value {
        Some(v) if v > max => {
            errors.add(field, format!("Cannot exceed {max}"));
            None
        }
        other => other,
    }
}

/// Required monetary amount, strictly positive.
pub fn positive_amount(
    field: &str,
    input: Option<&NumberInput>,
    errors: &mut FieldErrors,
) -> Option<Money> {
    match parse_number(input) {
        Parsed::Missing => {
            errors.add(field, REQUIRED);
            None
        }
        Parsed::Invalid => {
            errors.add(field, NOT_A_NUMBER);
            None
        }
        Parsed::Value(d) if d <= Decimal::ZERO => {
            errors.add(field, NOT_POSITIVE);
            None
        }
        Parsed::Value(d) => Some(d),
    }
}

/// Optional amount: absent is fine, present must be positive.
pub fn optional_positive_amount(
    field: &str,
    input: Option<&NumberInput>,
    errors: &mut FieldErrors,
) -> Option<Money> {
    match parse_number(input) {
        Parsed::Missing => None,
        _ => positive_amount(field, input, errors),
    }
}

/// Optional amount: absent is fine, present must be zero or more.
pub fn optional_non_negative_amount(
    field: &str,
    input: Option<&NumberInput>,
    errors: &mut FieldErrors,
) -> Option<Money> {
    match parse_number(input) {
        Parsed::Missing => None,
        Parsed::Invalid => {
            errors.add(field, NOT_A_NUMBER);
            None
        }
        Parsed::Value(d) if d < Decimal::ZERO => {
            errors.add(field, NEGATIVE);
            None
        }
        Parsed::Value(d) => Some(d),
    }
}

/// Required positive whole number of months, at most `max_months`.
pub fn positive_months(
    field: &str,
    input: Option<&NumberInput>,
    max_months: u32,
    errors: &mut FieldErrors,
) -> Option<u32> {
    match parse_number(input) {
        Parsed::Missing => {
            errors.add(field, REQUIRED);
            None
        }
        Parsed::Invalid => {
            errors.add(field, NOT_A_NUMBER);
            None
        }
        Parsed::Value(d) if d <= Decimal::ZERO => {
            errors.add(field, NOT_POSITIVE);
            None
        }
        Parsed::Value(d) if !d.fract().is_zero() => {
            errors.add(field, NOT_WHOLE_MONTHS);
            None
        }
        Parsed::Value(d) => match d.to_u32() {
            Some(months) if months <= max_months => Some(months),
            _ => {
                errors.add(field, format!("Cannot exceed {max_months} months"));
                None
            }
        },
    }
}

/// Required free-text field; whitespace-only counts as missing.
pub fn required_text<'a>(
    field: &str,
    value: &'a Option<String>,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match non_empty(value) {
        Some(text) => Some(text),
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Required `YYYY-MM-DD` date that exists on the calendar.
pub fn required_date(
    field: &str,
    value: &Option<String>,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = required_text(field, value, errors)?;
    if !has_iso_date_shape(raw) {
        errors.add(field, BAD_DATE_FORMAT);
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, BAD_CALENDAR_DATE);
            None
        }
    }
}

fn has_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run<T>(f: impl FnOnce(&mut FieldErrors) -> Option<T>) -> (Option<T>, Option<String>) {
        let mut errors = FieldErrors::default();
        let value = f(&mut errors);
        let result = super::super::ValidationResult::from(errors);
        (value, result.error("f").map(str::to_string))
    }

    #[test]
    fn test_amount_accepts_numbers_and_text() {
        let n = NumberInput::from(dec!(12.5));
        assert_eq!(run(|e| positive_amount("f", Some(&n), e)).0, Some(dec!(12.5)));
        let t = NumberInput::from(" $1,250.75 ");
        assert_eq!(run(|e| positive_amount("f", Some(&t), e)).0, Some(dec!(1250.75)));
    }

    #[test]
    fn test_amount_errors() {
        assert_eq!(run(|e| positive_amount("f", None, e)).1.as_deref(), Some(REQUIRED));
        let blank = NumberInput::from("   ");
        assert_eq!(run(|e| positive_amount("f", Some(&blank), e)).1.as_deref(), Some(REQUIRED));
        let junk = NumberInput::from("12abc");
        assert_eq!(run(|e| positive_amount("f", Some(&junk), e)).1.as_deref(), Some(NOT_A_NUMBER));
        let zero = NumberInput::from(dec!(0));
        assert_eq!(run(|e| positive_amount("f", Some(&zero), e)).1.as_deref(), Some(NOT_POSITIVE));
        let negative = NumberInput::from("-3");
        assert_eq!(run(|e| positive_amount("f", Some(&negative), e)).1.as_deref(), Some(NOT_POSITIVE));
    }

    #[test]
    fn test_optional_amounts() {
        assert_eq!(run(|e| optional_positive_amount("f", None, e)), (None, None));
        let zero = NumberInput::from("0");
        assert_eq!(run(|e| optional_non_negative_amount("f", Some(&zero), e)).0, Some(dec!(0)));
        let neg = NumberInput::from("-1");
        assert_eq!(run(|e| optional_non_negative_amount("f", Some(&neg), e)).1.as_deref(), Some(NEGATIVE));
    }

    #[test]
    fn test_months() {
        let twelve = NumberInput::from("12");
        assert_eq!(run(|e| positive_months("f", Some(&twelve), 600, e)).0, Some(12));
        let fraction = NumberInput::from(dec!(12.5));
        assert_eq!(run(|e| positive_months("f", Some(&fraction), 600, e)).1.as_deref(), Some(NOT_WHOLE_MONTHS));
        let zero = NumberInput::from(dec!(0));
        assert_eq!(run(|e| positive_months("f", Some(&zero), 600, e)).1.as_deref(), Some(NOT_POSITIVE));
    }

    #[test]
    fn test_months_above_ceiling() {
        let at_limit = NumberInput::from(dec!(600));
        assert_eq!(run(|e| positive_months("f", Some(&at_limit), 600, e)).0, Some(600));
        let over = NumberInput::from(dec!(601));
        assert_eq!(
            run(|e| positive_months("f", Some(&over), 600, e)).1.as_deref(),
            Some("Cannot exceed 600 months")
        );
        let beyond_u32 = NumberInput::from("100000000000");
        assert_eq!(
            run(|e| positive_months("f", Some(&beyond_u32), 600, e)).1.as_deref(),
            Some("Cannot exceed 600 months")
        );
    }

    #[test]
    fn test_amount_ceiling() {
        assert_eq!(run(|e| at_most("f", Some(dec!(100)), dec!(100), e)), (Some(dec!(100)), None));
        assert_eq!(
            run(|e| at_most("f", Some(dec!(100.01)), dec!(100), e)).1.as_deref(),
            Some("Cannot exceed 100")
        );
        assert_eq!(run(|e| at_most("f", None, dec!(100), e)), (None, None));
    }

    #[test]
    fn test_dates() {
        let ok = Some("2024-02-29".to_string());
        assert_eq!(
            run(|e| required_date("f", &ok, e)).0,
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        let short = Some("2024-2-9".to_string());
        assert_eq!(run(|e| required_date("f", &short, e)).1.as_deref(), Some(BAD_DATE_FORMAT));
        let slashes = Some("2024/02/09".to_string());
        assert_eq!(run(|e| required_date("f", &slashes, e)).1.as_deref(), Some(BAD_DATE_FORMAT));
        let impossible = Some("2023-02-29".to_string());
        assert_eq!(run(|e| required_date("f", &impossible, e)).1.as_deref(), Some(BAD_CALENDAR_DATE));
        assert_eq!(run(|e| required_date("f", &None, e)).1.as_deref(), Some(REQUIRED));
    }

    #[test]
    fn test_untagged_number_input() {
        let n: NumberInput = serde_json::from_str("250").unwrap();
        assert!(matches!(n, NumberInput::Number(d) if d == dec!(250)));
        let t: NumberInput = serde_json::from_str(r#""1,000""#).unwrap();
        assert_eq!(t, NumberInput::Text("1,000".into()));
    }

    #[test]
    fn test_out_of_range_number_is_not_a_number() {
        let huge: NumberInput = serde_json::from_str("1e30").unwrap();
        assert!(matches!(huge, NumberInput::Unparseable(_)));
        assert_eq!(run(|e| positive_amount("f", Some(&huge), e)).1.as_deref(), Some(NOT_A_NUMBER));

        let flag: NumberInput = serde_json::from_str("true").unwrap();
        assert_eq!(run(|e| positive_amount("f", Some(&flag), e)).1.as_deref(), Some(NOT_A_NUMBER));
    }

    #[derive(Deserialize)]
    struct Note {
        #[serde(default, deserialize_with = "lenient_text")]
        text: Option<String>,
    }

    #[test]
    fn test_lenient_text_accepts_any_scalar() {
        let n: Note = serde_json::from_str(r#"{ "text": 1187 }"#).unwrap();
        assert_eq!(n.text.as_deref(), Some("1187"));
        let n: Note = serde_json::from_str(r#"{ "text": null }"#).unwrap();
        assert_eq!(n.text, None);
        let n: Note = serde_json::from_str("{}").unwrap();
        assert_eq!(n.text, None);
    }
}
