//! Transcript messages and delivery commands.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{flag, timestamp, Attachment};

/// Wire format of `scheduled_at` (what a `datetime-local` input produces).
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One message in a user's conversation with the bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    /// Retrieval relevance of the answer this question produced.
    pub relevance: Option<f64>,
    #[serde(deserialize_with = "flag::deserialize")]
    pub is_bot: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Send one message to one user.
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub telegram_id: i64,
    pub text: String,
    pub files: Vec<Attachment>,
}

/// Send one message to many users right now.
#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    pub telegram_ids: Vec<i64>,
    pub text: String,
    pub files: Vec<Attachment>,
}

/// Send one message to many users at a later time.
#[derive(Debug, Clone)]
pub struct ScheduleBroadcastRequest {
    pub telegram_ids: Vec<i64>,
    pub text: String,
    pub scheduled_at: NaiveDateTime,
    pub files: Vec<Attachment>,
}

/// Acknowledgement of a single send.
#[derive(Debug, Clone, Deserialize)]
pub struct SendReceipt {
    pub message: String,
}

/// Per-recipient success entry of a broadcast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryResult {
    pub telegram_id: i64,
    pub status: String,
}

/// Per-recipient failure entry of a broadcast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryFailure {
    pub telegram_id: i64,
    pub error: String,
}

/// Outcome of an immediate broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastReport {
    pub sent: usize,
    pub errors: usize,
    #[serde(default)]
    pub results: Vec<DeliveryResult>,
    #[serde(default)]
    pub error_details: Vec<DeliveryFailure>,
}

/// Confirmation of a scheduled broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledBroadcast {
    pub id: i64,
    pub message: String,
    pub scheduled_at: String,
    pub recipients_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_decodes_flags_and_null_relevance() {
        let message: Message = serde_json::from_value(serde_json::json!({
            "id": 10,
            "user_id": 2,
            "text": "hi",
            "relevance": null,
            "is_bot": 1,
            "created_at": "2024-05-01T09:00:00.5"
        }))
        .unwrap();
        assert!(message.is_bot);
        assert_eq!(message.relevance, None);
    }

    #[test]
    fn test_broadcast_report_defaults_details() {
        let report: BroadcastReport =
            serde_json::from_value(serde_json::json!({ "sent": 2, "errors": 0 })).unwrap();
        assert_eq!(report.sent, 2);
        assert!(report.results.is_empty());
        assert!(report.error_details.is_empty());
    }
}
