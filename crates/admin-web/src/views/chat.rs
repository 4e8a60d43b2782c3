//! Chat transcript and compose form.

use admin_client::{Attachment, Message, SendMessageRequest, User};
use chrono::{DateTime, FixedOffset, Utc};

use super::form::FormPhase;

/// Transcript times are shown in Moscow time.
const MOSCOW_OFFSET_SECS: i32 = 3 * 3600;

/// `HH:MM` in Moscow time.
pub fn moscow_time(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(MOSCOW_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset).format("%H:%M").to_string(),
        None => at.format("%H:%M").to_string(),
    }
}

/// Relevance scores arrive either as a fraction or already as a percentage.
pub fn relevance_percent(score: f64) -> String {
    let percent = if score > 1.0 { score } else { score * 100.0 };
    format!("{:.1}%", percent)
}

/// One bubble in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: i64,
    pub text: String,
    pub is_bot: bool,
    pub time: String,
    pub relevance: Option<String>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            text: message.text.clone(),
            is_bot: message.is_bot,
            time: moscow_time(message.created_at),
            // Only the operator-side messages carry a meaningful score.
            relevance: message
                .relevance
                .filter(|_| !message.is_bot)
                .map(relevance_percent),
        }
    }
}

pub fn transcript(messages: &[Message]) -> Vec<MessageView> {
    messages.iter().map(MessageView::from).collect()
}

/// Header of the chat page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHeader {
    pub title: String,
    pub phone: Option<String>,
    pub link: String,
}

impl From<&User> for ChatHeader {
    fn from(user: &User) -> Self {
        Self {
            title: user.display_name(),
            phone: user.phone.clone().filter(|phone| !phone.is_empty()),
            link: user.telegram_link(),
        }
    }
}

/// The compose box under the transcript.
#[derive(Debug, Clone, Default)]
pub struct ChatForm {
    text: String,
    attachments: Vec<Attachment>,
    phase: FormPhase,
    notice: Option<String>,
}

impl ChatForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        let mut form = Self::new();
        form.text = text.into();
        form.attachments = attachments;
        if !form.text.is_empty() || !form.attachments.is_empty() {
            form.phase.edit();
        }
        form
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn insert_emoji(&mut self, emoji: &str) {
        self.text.push_str(emoji);
        self.phase.edit();
    }

    /// Send is disabled when there is neither text nor a file.
    pub fn can_send(&self) -> bool {
        !self.phase.is_submitting() && (!self.text.trim().is_empty() || !self.attachments.is_empty())
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn send_caption(&self) -> &'static str {
        if self.phase.is_submitting() {
            "Sending..."
        } else {
            "Send"
        }
    }

    pub fn begin_submit(&mut self, telegram_id: i64) -> Option<SendMessageRequest> {
        if !self.can_send() {
            if !self.phase.is_submitting() {
                self.phase.fail("Enter a message or attach a file.");
            }
            return None;
        }
        self.notice = None;
        self.phase.submit();
        Some(SendMessageRequest {
            telegram_id,
            text: self.text.clone(),
            files: self.attachments.clone(),
        })
    }

    pub fn succeed(&mut self, notice: impl Into<String>) {
        self.text.clear();
        self.attachments.clear();
        self.notice = Some(notice.into());
        self.phase.succeed();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase.fail(error);
    }
}
