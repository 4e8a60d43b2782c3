//! Broadcast routes.

use admin_client::User;
use askama::Template;
use axum::extract::{Multipart, Query};
use serde::Deserialize;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::Result;
use crate::guard::{Nav, Route};
use crate::routes::form_data::{FormAction, FormData};
use crate::session::Session;
use crate::views::attachments::{AttachmentRow, DraftKey};
use crate::views::broadcast::{
    parse_schedule, BroadcastCommand, BroadcastForm, BroadcastOutcome, Delivery, Recipient,
};
use crate::views::emoji::{self, EmojiCategory, CATEGORIES};
use crate::views::Load;

/// Broadcast page template.
#[derive(Template)]
#[template(path = "broadcast.html")]
pub struct BroadcastTemplate {
    pub nav: Option<Nav>,
    pub recipients: Load<Vec<Recipient>>,
    pub form: BroadcastForm,
    pub files: Vec<AttachmentRow>,
    pub categories: &'static [EmojiCategory],
}

#[derive(Debug, Default, Deserialize)]
pub struct BroadcastQuery {
    /// `all` pre-selects every user.
    pub select: Option<String>,
}

/// Render the broadcast page.
pub async fn broadcast_page(
    console: Console,
    Query(query): Query<BroadcastQuery>,
) -> Result<BroadcastTemplate> {
    let session = console.authorize(Route::Broadcast).await?;
    let users = console.queries.users(&console.client).await;

    let mut form = BroadcastForm::new();
    for file in console.drafts.get(DraftKey::Broadcast) {
        form.add_attachment(file);
    }
    if query.select.as_deref() == Some("all") {
        if let Ok(users) = &users {
            form.select_all(users);
        }
    }

    Ok(render(&session, users, form))
}

/// Handle a post of the broadcast form.
pub async fn submit(console: Console, multipart: Multipart) -> Result<BroadcastTemplate> {
    let session = console.authorize(Route::Broadcast).await?;
    let mut data = FormData::read(multipart).await?;

    let files = console
        .drafts
        .add(DraftKey::Broadcast, data.take_files("files"));
    let mut form = form_from_submission(&data, files);
    let users = console.queries.users(&console.client).await;

    match FormAction::parse(&data) {
        FormAction::Send => send(&console, &mut form).await,
        FormAction::SelectAll => {
            if let Ok(users) = &users {
                form.select_all(users);
            }
        }
        FormAction::DeselectAll => form.deselect_all(),
        FormAction::RemoveFile(index) => {
            form.remove_attachment(index);
            console.drafts.remove(DraftKey::Broadcast, index);
        }
        FormAction::Emoji(picked) => {
            if emoji::is_known(&picked) {
                form.append_text(&picked);
            }
        }
        FormAction::Refresh => {}
    }

    Ok(render(&session, users, form))
}

/// Rebuild the composer from submitted fields plus queued files.
pub fn form_from_submission(data: &FormData, files: Vec<admin_client::Attachment>) -> BroadcastForm {
    let mut form = BroadcastForm::new();
    for id in data.all("telegram_ids").filter_map(|raw| raw.trim().parse().ok()) {
        form.select(id);
    }
    form.set_text(data.text("text").unwrap_or_default());
    form.set_delivery(Delivery::parse(data.text("delivery").unwrap_or_default()));
    form.set_scheduled_at(data.text("scheduled_at").and_then(parse_schedule));
    for file in files {
        form.add_attachment(file);
    }
    form
}

/// Send or schedule the broadcast the form describes.
///
/// Blocked forms make no call. On success the composer, queued files and
/// selection are cleared.
pub async fn send(console: &Console, form: &mut BroadcastForm) {
    let mutation = &console.mutations.broadcast;
    if mutation.is_pending() {
        form.fail("A broadcast is already being sent.");
        return;
    }
    let Some(command) = form.begin_submit() else {
        return;
    };

    let messages = console.client.messages();
    let clear_drafts = |_: &BroadcastOutcome| console.drafts.clear(DraftKey::Broadcast);

    let result = match &command {
        BroadcastCommand::Immediate(request) => {
            mutation
                .run(
                    async { messages.broadcast(request).await.map(BroadcastOutcome::Sent) },
                    clear_drafts,
                )
                .await
        }
        BroadcastCommand::Scheduled(request) => {
            mutation
                .run(
                    async {
                        messages
                            .schedule_broadcast(request)
                            .await
                            .map(BroadcastOutcome::Scheduled)
                    },
                    clear_drafts,
                )
                .await
        }
    };

    match result {
        Ok(outcome) => {
            info!(notice = %outcome.notice(), "Broadcast accepted");
            form.succeed(&outcome);
        }
        Err(err) => {
            warn!(error = %err, "Broadcast rejected");
            form.fail(format!("Failed to send broadcast: {}", err));
        }
    }
}

fn render(
    session: &Session,
    users: std::result::Result<Vec<User>, query_cache::FetchError>,
    form: BroadcastForm,
) -> BroadcastTemplate {
    let recipients = Load::from_result(users, |users| form.recipients(&users));
    let files = AttachmentRow::rows(form.attachments());

    BroadcastTemplate {
        nav: Some(Nav::new(session, Route::Broadcast)),
        recipients,
        form,
        files,
        categories: &CATEGORIES,
    }
}
