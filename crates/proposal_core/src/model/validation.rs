//! Submission payload validation.
//!
//! # Responsibility
//! - Check required fields of an untyped submission payload.
//! - Normalize optional fields to empty strings.
//!
//! # Invariants
//! - Validation is pure: no I/O, no logging, no clock reads.
//! - A draft is only produced when every required field is a non-empty string.

use super::response::{Decision, ResponseDraft};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fields that must be present, non-empty strings.
pub const REQUIRED_FIELDS: [&str; 4] = ["proposalId", "decision", "name", "email"];

/// Client-caused submission error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent, empty, or not a string.
    MissingField(&'static str),
    /// `decision` is a string outside `accepted|declined`.
    UnsupportedDecision(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::UnsupportedDecision(value) => {
                write!(f, "unsupported decision `{value}`; expected accepted|declined")
            }
        }
    }
}

impl Error for ValidationError {}

impl ValidationError {
    /// Stable reason code for log lines; never carries payload text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::UnsupportedDecision(_) => "unsupported_decision",
        }
    }

    /// Payload key the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::UnsupportedDecision(_) => "decision",
        }
    }
}

/// Validates a raw submission payload.
///
/// Anything that is not a JSON object is treated as an empty payload, so the
/// first required field is reported missing.
pub fn validate(payload: &Value) -> Result<ResponseDraft, ValidationError> {
    let empty = Map::new();
    let fields = payload.as_object().unwrap_or(&empty);

    let proposal_id = required(fields, "proposalId")?;
    let decision_text = required(fields, "decision")?;
    let name = required(fields, "name")?;
    let email = required(fields, "email")?;

    let decision = Decision::parse(&decision_text)
        .ok_or(ValidationError::UnsupportedDecision(decision_text))?;

    Ok(ResponseDraft {
        proposal_id,
        decision,
        name,
        email,
        telegram: optional(fields, "telegram"),
        company: optional(fields, "company"),
        notes: optional(fields, "notes"),
        source_address: None,
    })
}

fn required(fields: &Map<String, Value>, key: &'static str) -> Result<String, ValidationError> {
    match fields.get(key).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingField(key)),
    }
}

fn optional(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{validate, ValidationError, REQUIRED_FIELDS};
    use crate::model::response::Decision;
    use serde_json::json;

    fn valid_payload() -> serde_json::Value {
        json!({
            "proposalId": "P1",
            "decision": "accepted",
            "name": "Ana",
            "email": "ana@x.com"
        })
    }

    #[test]
    fn accepts_minimal_payload_and_defaults_optionals() {
        let draft = validate(&valid_payload()).unwrap();
        assert_eq!(draft.proposal_id, "P1");
        assert_eq!(draft.decision, Decision::Accepted);
        assert_eq!(draft.telegram, "");
        assert_eq!(draft.company, "");
        assert_eq!(draft.notes, "");
        assert_eq!(draft.source_address, None);
    }

    #[test]
    fn keeps_optional_fields_when_present() {
        let mut payload = valid_payload();
        payload["telegram"] = json!("@ana");
        payload["company"] = json!("Acme ");
        payload["notes"] = json!("Looking forward");
        let draft = validate(&payload).unwrap();
        assert_eq!(draft.telegram, "@ana");
        assert_eq!(draft.company, "Acme");
        assert_eq!(draft.notes, "Looking forward");
    }

    #[test]
    fn non_string_optional_field_is_treated_as_absent() {
        let mut payload = valid_payload();
        payload["company"] = json!(42);
        assert_eq!(validate(&payload).unwrap().company, "");
    }

    #[test]
    fn each_required_field_is_enforced() {
        for field in REQUIRED_FIELDS {
            let mut absent = valid_payload();
            absent.as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate(&absent).unwrap_err(),
                ValidationError::MissingField(field)
            );

            let mut blank = valid_payload();
            blank[field] = json!("   ");
            assert_eq!(
                validate(&blank).unwrap_err(),
                ValidationError::MissingField(field)
            );

            let mut wrong_type = valid_payload();
            wrong_type[field] = json!(true);
            assert_eq!(
                validate(&wrong_type).unwrap_err(),
                ValidationError::MissingField(field)
            );
        }
    }

    #[test]
    fn empty_name_is_missing() {
        let payload = json!({
            "proposalId": "P1",
            "decision": "accepted",
            "name": "",
            "email": "a@x.com"
        });
        assert_eq!(
            validate(&payload).unwrap_err(),
            ValidationError::MissingField("name")
        );
    }

    #[test]
    fn unknown_decision_is_rejected() {
        let mut payload = valid_payload();
        payload["decision"] = json!("maybe");
        assert_eq!(
            validate(&payload).unwrap_err(),
            ValidationError::UnsupportedDecision("maybe".to_string())
        );
    }

    #[test]
    fn error_code_and_field_never_echo_payload() {
        let mut payload = valid_payload();
        payload["decision"] = json!("maybe\nevent=forged");
        let err = validate(&payload).unwrap_err();
        assert_eq!(err.code(), "unsupported_decision");
        assert_eq!(err.field(), "decision");

        let missing = ValidationError::MissingField("email");
        assert_eq!(missing.code(), "missing_field");
        assert_eq!(missing.field(), "email");
    }

    #[test]
    fn non_object_payload_reports_first_missing_field() {
        assert_eq!(
            validate(&json!(["P1"])).unwrap_err(),
            ValidationError::MissingField("proposalId")
        );
    }
}
