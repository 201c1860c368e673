use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize a piped JSON document straight into the command's input type.
///
/// An interactive terminal or a blank pipe yields `None`, so the command can
/// fall back to its flags.
pub fn read_typed<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().lock().read_to_string(&mut piped)?;
    parse_piped(&piped)
}

fn parse_piped<T: DeserializeOwned>(piped: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if piped.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(piped)
        .map(Some)
        .map_err(|e| format!("stdin is not a valid input document: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_terms_core::lending::quote::LoanTerms;
    use coop_terms_core::validation::DepositForm;

    #[test]
    fn test_blank_pipe_falls_back_to_flags() {
        let parsed: Option<LoanTerms> = parse_piped(" \n\t").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_piped_document_is_typed() {
        let parsed: Option<LoanTerms> =
            parse_piped(r#"{"principal": "5000", "duration_months": 24}"#).unwrap();
        let terms = parsed.unwrap();
        assert_eq!(terms.duration_months, 24);
    }

    #[test]
    fn test_malformed_pipe_names_stdin() {
        let err = parse_piped::<DepositForm>("{not json").unwrap_err();
        assert!(err.to_string().starts_with("stdin is not a valid input document"));
    }
}
