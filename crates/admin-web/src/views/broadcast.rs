//! Broadcast composer state.

use std::collections::BTreeSet;

use admin_client::{
    Attachment, BroadcastReport, BroadcastRequest, ScheduleBroadcastRequest, ScheduledBroadcast,
    User,
};
use chrono::NaiveDateTime;

use super::form::FormPhase;

/// Formats accepted from a `datetime-local` input.
const SCHEDULE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// When the broadcast goes out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    #[default]
    Immediate,
    Scheduled,
}

impl Delivery {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "scheduled" => Delivery::Scheduled,
            _ => Delivery::Immediate,
        }
    }
}

/// Why the submit control is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    NoRecipients,
    NoContent,
    NoScheduleTime,
}

impl Blocker {
    pub fn message(self) -> &'static str {
        match self {
            Blocker::NoRecipients => "Select at least one recipient.",
            Blocker::NoContent => "Enter a message or attach a file.",
            Blocker::NoScheduleTime => "Pick a delivery time.",
        }
    }
}

/// The call a valid form turns into.
#[derive(Debug, Clone)]
pub enum BroadcastCommand {
    Immediate(BroadcastRequest),
    Scheduled(ScheduleBroadcastRequest),
}

/// What the backend reported back.
#[derive(Debug, Clone)]
pub enum BroadcastOutcome {
    Sent(BroadcastReport),
    Scheduled(ScheduledBroadcast),
}

impl BroadcastOutcome {
    pub fn notice(&self) -> String {
        match self {
            BroadcastOutcome::Sent(report) if report.errors == 0 => {
                format!("Broadcast sent to {} users.", report.sent)
            }
            BroadcastOutcome::Sent(report) => format!(
                "Broadcast sent to {} users, {} failed.",
                report.sent, report.errors
            ),
            BroadcastOutcome::Scheduled(scheduled) => format!(
                "Broadcast scheduled for {} ({} recipients).",
                scheduled.scheduled_at, scheduled.recipients_count
            ),
        }
    }
}

/// A selectable recipient row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub telegram_id: i64,
    pub label: String,
    pub selected: bool,
}

/// `@username` or `#telegram_id`, followed by ` (phone)` when known.
pub fn recipient_label(user: &User) -> String {
    match &user.phone {
        Some(phone) if !phone.is_empty() => format!("{} ({})", user.display_name(), phone),
        _ => user.display_name(),
    }
}

/// Parse the value of a `datetime-local` input.
pub fn parse_schedule(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    SCHEDULE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Everything on the broadcast page that the operator can change.
#[derive(Debug, Clone, Default)]
pub struct BroadcastForm {
    selected: BTreeSet<i64>,
    text: String,
    delivery: Delivery,
    scheduled_at: Option<NaiveDateTime>,
    attachments: Vec<Attachment>,
    phase: FormPhase,
    notice: Option<String>,
}

impl BroadcastForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, telegram_id: i64) {
        if !self.selected.remove(&telegram_id) {
            self.selected.insert(telegram_id);
        }
        self.phase.edit();
    }

    pub fn select(&mut self, telegram_id: i64) {
        self.selected.insert(telegram_id);
        self.phase.edit();
    }

    pub fn select_all(&mut self, users: &[User]) {
        self.selected.extend(users.iter().map(|user| user.telegram_id));
        self.phase.edit();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.phase.edit();
    }

    pub fn is_selected(&self, telegram_id: i64) -> bool {
        self.selected.contains(&telegram_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.phase.edit();
    }

    pub fn append_text(&mut self, suffix: &str) {
        self.text.push_str(suffix);
        self.phase.edit();
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    pub fn is_scheduled(&self) -> bool {
        self.delivery == Delivery::Scheduled
    }

    pub fn set_delivery(&mut self, delivery: Delivery) {
        self.delivery = delivery;
        self.phase.edit();
    }

    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_at
    }

    /// Value for the `datetime-local` input.
    pub fn scheduled_input(&self) -> String {
        self.scheduled_at
            .map(|at| at.format("%Y-%m-%dT%H:%M").to_string())
            .unwrap_or_default()
    }

    pub fn set_scheduled_at(&mut self, scheduled_at: Option<NaiveDateTime>) {
        self.scheduled_at = scheduled_at;
        self.phase.edit();
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn add_attachment(&mut self, file: Attachment) {
        self.attachments.push(file);
        self.phase.edit();
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        let removed = (index < self.attachments.len()).then(|| self.attachments.remove(index));
        self.phase.edit();
        removed
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The first reason the form cannot be submitted, if any.
    pub fn blocker(&self) -> Option<Blocker> {
        if self.selected.is_empty() {
            Some(Blocker::NoRecipients)
        } else if self.text.trim().is_empty() && self.attachments.is_empty() {
            Some(Blocker::NoContent)
        } else if self.is_scheduled() && self.scheduled_at.is_none() {
            Some(Blocker::NoScheduleTime)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.phase.is_submitting() && self.blocker().is_none()
    }

    pub fn submit_caption(&self) -> &'static str {
        if self.phase.is_submitting() {
            "Sending..."
        } else if self.is_scheduled() {
            "Schedule broadcast"
        } else {
            "Send broadcast"
        }
    }

    /// The request this form describes, without changing state.
    pub fn command(&self) -> Result<BroadcastCommand, Blocker> {
        if let Some(blocker) = self.blocker() {
            return Err(blocker);
        }

        let telegram_ids = self.selected.iter().copied().collect();
        let text = self.text.clone();
        let files = self.attachments.clone();

        match (self.delivery, self.scheduled_at) {
            (Delivery::Scheduled, Some(scheduled_at)) => {
                Ok(BroadcastCommand::Scheduled(ScheduleBroadcastRequest {
                    telegram_ids,
                    text,
                    scheduled_at,
                    files,
                }))
            }
            (Delivery::Scheduled, None) => Err(Blocker::NoScheduleTime),
            (Delivery::Immediate, _) => Ok(BroadcastCommand::Immediate(BroadcastRequest {
                telegram_ids,
                text,
                files,
            })),
        }
    }

    /// Validate and enter the submitting state.
    ///
    /// A blocked form gets the reason as its error and yields nothing.
    pub fn begin_submit(&mut self) -> Option<BroadcastCommand> {
        if self.phase.is_submitting() {
            return None;
        }
        match self.command() {
            Ok(command) => {
                self.notice = None;
                self.phase.submit();
                Some(command)
            }
            Err(blocker) => {
                self.phase.fail(blocker.message());
                None
            }
        }
    }

    /// The broadcast went out: clear the composer and selection.
    pub fn succeed(&mut self, outcome: &BroadcastOutcome) {
        self.selected.clear();
        self.text.clear();
        self.attachments.clear();
        self.scheduled_at = None;
        self.notice = Some(outcome.notice());
        self.phase.succeed();
    }

    /// The call failed: keep everything the operator entered.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase.fail(error);
    }

    /// Recipient rows for rendering, in list order.
    pub fn recipients(&self, users: &[User]) -> Vec<Recipient> {
        users
            .iter()
            .map(|user| Recipient {
                telegram_id: user.telegram_id,
                label: recipient_label(user),
                selected: self.is_selected(user.telegram_id),
            })
            .collect()
    }
}
