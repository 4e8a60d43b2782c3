//! Transcript and delivery endpoints of the primary backend.

use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

use crate::client::{ApiClient, Upstream};
use crate::error::Result;
use crate::types::{
    Attachment, BroadcastReport, BroadcastRequest, Message, ScheduleBroadcastRequest,
    ScheduledBroadcast, SendMessageRequest, SendReceipt, SCHEDULE_FORMAT,
};

/// Transcript reads and `/admin/*` delivery endpoints.
#[derive(Debug, Clone, Copy)]
pub struct MessagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MessagesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Full transcript of a user's conversation with the bot.
    pub async fn list_for_user(&self, telegram_id: i64) -> Result<Vec<Message>> {
        self.client
            .get_json(Upstream::Backend, &format!("/users/{}/messages", telegram_id))
            .await
    }

    /// Send a message to one user.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<SendReceipt> {
        info!(
            telegram_id = request.telegram_id,
            files = request.files.len(),
            "Sending message"
        );

        let form = Form::new()
            .text("telegram_id", request.telegram_id.to_string())
            .text("text", request.text.clone());
        let form = attach(form, &request.files)?;

        self.client
            .send_form(Method::POST, Upstream::Backend, "/admin/send-message", form)
            .await
    }

    /// Send a message to many users immediately.
    pub async fn broadcast(&self, request: &BroadcastRequest) -> Result<BroadcastReport> {
        info!(
            recipients = request.telegram_ids.len(),
            files = request.files.len(),
            "Sending broadcast"
        );

        let form = Form::new()
            .text("telegram_ids", serde_json::to_string(&request.telegram_ids)?)
            .text("text", request.text.clone());
        let form = attach(form, &request.files)?;

        let report: BroadcastReport = self
            .client
            .send_form(Method::POST, Upstream::Backend, "/admin/broadcast", form)
            .await?;
        info!(sent = report.sent, errors = report.errors, "Broadcast complete");
        Ok(report)
    }

    /// Hand a broadcast to the backend scheduler.
    pub async fn schedule_broadcast(
        &self,
        request: &ScheduleBroadcastRequest,
    ) -> Result<ScheduledBroadcast> {
        let scheduled_at = request.scheduled_at.format(SCHEDULE_FORMAT).to_string();
        info!(
            recipients = request.telegram_ids.len(),
            scheduled_at = %scheduled_at,
            "Scheduling broadcast"
        );

        let form = Form::new()
            .text("telegram_ids", serde_json::to_string(&request.telegram_ids)?)
            .text("text", request.text.clone())
            .text("scheduled_at", scheduled_at);
        let form = attach(form, &request.files)?;

        self.client
            .send_form(
                Method::POST,
                Upstream::Backend,
                "/admin/schedule-broadcast",
                form,
            )
            .await
    }
}

/// One `files` part per attachment.
fn attach(mut form: Form, files: &[Attachment]) -> Result<Form> {
    for file in files {
        form = form.part("files", file.to_part()?);
    }
    Ok(form)
}
