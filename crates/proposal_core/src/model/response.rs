//! Response record domain model.
//!
//! # Responsibility
//! - Define the canonical shape of a recipient's answer to a proposal.
//! - Separate the validated-but-unsaved draft from the persisted record.
//!
//! # Invariants
//! - `id` and `created_at` only exist on `ResponseRecord`, so only the store
//!   can produce them.
//! - `decision` is one of the two `Decision` variants; no other text is stored.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Store-assigned identifier. Strictly increasing within one store.
pub type ResponseId = i64;

/// The respondent's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Declined,
}

impl Decision {
    /// Canonical wire/database spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parses wire text, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response that passed validation and is ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDraft {
    pub proposal_id: String,
    pub decision: Decision,
    pub name: String,
    pub email: String,
    pub telegram: String,
    pub company: String,
    pub notes: String,
    /// Origin address of the submitter, `None` when the caller had none.
    pub source_address: Option<String>,
}

impl ResponseDraft {
    /// Attaches the submitter's network origin for auditing.
    pub fn with_source_address(mut self, source_address: Option<String>) -> Self {
        self.source_address = source_address;
        self
    }

    /// Seals the draft into a record. Only store implementations call this.
    pub fn into_record(self, id: ResponseId, created_at: DateTime<Utc>) -> ResponseRecord {
        ResponseRecord {
            id,
            proposal_id: self.proposal_id,
            decision: self.decision,
            name: self.name,
            email: self.email,
            telegram: self.telegram,
            company: self.company,
            notes: self.notes,
            created_at,
            source_address: self.source_address,
        }
    }
}

/// A persisted response, as returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub proposal_id: String,
    pub decision: Decision,
    pub name: String,
    pub email: String,
    pub telegram: String,
    pub company: String,
    pub notes: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Audit-only; not part of the public JSON shape.
    #[serde(skip_serializing, default)]
    pub source_address: Option<String>,
}

/// Current time at the precision timestamps are stored with.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Formats timestamps the way they are stored, so text ordering matches
/// chronological ordering.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(value))
}

#[cfg(test)]
mod tests {
    use super::{Decision, ResponseDraft};
    use chrono::{TimeZone, Utc};

    fn draft() -> ResponseDraft {
        ResponseDraft {
            proposal_id: "P1".to_string(),
            decision: Decision::Accepted,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            telegram: String::new(),
            company: String::new(),
            notes: String::new(),
            source_address: Some("10.0.0.1".to_string()),
        }
    }

    #[test]
    fn decision_parse_is_case_insensitive() {
        assert_eq!(Decision::parse(" Accepted "), Some(Decision::Accepted));
        assert_eq!(Decision::parse("DECLINED"), Some(Decision::Declined));
        assert_eq!(Decision::parse("maybe"), None);
    }

    #[test]
    fn record_serializes_public_fields_only() {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = draft().into_record(7, created_at);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["proposal_id"], "P1");
        assert_eq!(json["decision"], "accepted");
        assert_eq!(json["created_at"], "2026-03-01T12:00:00.000000Z");
        assert!(json.get("source_address").is_none());
        assert_eq!(json.as_object().unwrap().len(), 9);
    }
}
