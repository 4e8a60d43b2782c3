//! Request and response types for the backend and retrieval APIs.

mod admin;
mod attachment;
mod auth;
mod document;
mod message;
mod user;

pub use admin::{AdminUser, AdminUserCreate, AdminUserUpdate, Role, UnknownRole};
pub use attachment::Attachment;
pub use auth::{CurrentUser, LoginRequest, LoginResponse};
pub use document::{DeleteReport, Document, DocumentsResponse, UpdateReport, UploadReport};
pub use message::{
    BroadcastReport, BroadcastRequest, DeliveryFailure, DeliveryResult, Message,
    ScheduleBroadcastRequest, ScheduledBroadcast, SendMessageRequest, SendReceipt,
    SCHEDULE_FORMAT,
};
pub use user::{ExtractedFields, OnboardingData, User};

/// The backend stores booleans as 0/1 integers; accept either form.
pub(crate) mod flag {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(value) => value,
            Raw::Int(value) => value != 0,
        })
    }
}

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 in UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}

/// Serialize a secret as a plain string, only where the wire needs it.
pub(crate) mod secret {
    use secrecy::{ExposeSecret, SecretString};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.expose_secret())
    }

    pub fn serialize_opt<S: Serializer>(
        value: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(secret) => serializer.serialize_some(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_naive_timestamp() {
        let ts = timestamp::parse("2024-03-05T10:15:30").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (10, 15, 30));
    }

    #[test]
    fn test_parse_fractional_and_offset_timestamps() {
        assert!(timestamp::parse("2024-03-05T10:15:30.123456").is_some());
        assert!(timestamp::parse("2024-03-05 10:15:30").is_some());

        let ts = timestamp::parse("2024-03-05T13:15:30+03:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(timestamp::parse("yesterday").is_none());
    }
}
