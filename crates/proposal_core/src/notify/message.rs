//! Owner-facing notification text.

use crate::model::response::{format_timestamp, Decision, ResponseRecord};

/// Rendered subject/body pair for one persisted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Summarizes decision, proposal, respondent identity and notes.
    pub fn for_record(record: &ResponseRecord) -> Self {
        let marker = match record.decision {
            Decision::Accepted => "✅",
            Decision::Declined => "❌",
        };
        let subject = format!(
            "{marker} Proposal {}: {} by {}",
            record.proposal_id, record.decision, record.name
        );

        let mut body = String::new();
        body.push_str(&format!("Decision: {}\n", record.decision));
        body.push_str(&format!("Proposal: {}\n", record.proposal_id));
        body.push_str(&format!("Name: {}\n", record.name));
        body.push_str(&format!("Email: {}\n", record.email));
        body.push_str(&format!("Telegram: {}\n", or_dash(&record.telegram)));
        body.push_str(&format!("Company: {}\n", or_dash(&record.company)));
        body.push_str(&format!("Response id: {}\n", record.id));
        body.push_str(&format!(
            "Submitted at: {}\n",
            format_timestamp(&record.created_at)
        ));
        body.push_str("\nNotes:\n");
        body.push_str(or_dash(&record.notes));
        body.push('\n');

        Self { subject, body }
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
