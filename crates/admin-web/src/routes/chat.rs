//! Per-user chat: transcript, live updates and the compose box.

use std::convert::Infallible;

use admin_client::Message;
use askama::Template;
use axum::extract::{Multipart, Path};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use query_cache::Snapshot;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::Result;
use crate::guard::{Nav, Route};
use crate::queries::messages_key;
use crate::routes::form_data::{FormAction, FormData};
use crate::session::Session;
use crate::views::attachments::{AttachmentRow, DraftKey};
use crate::views::chat::{self, ChatForm, ChatHeader, MessageView};
use crate::views::emoji::{self, EmojiCategory, CATEGORIES};
use crate::views::Load;

/// Chat page template.
#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub nav: Option<Nav>,
    pub telegram_id: i64,
    pub header: ChatHeader,
    pub transcript: Load<Vec<MessageView>>,
    pub form: ChatForm,
    pub files: Vec<AttachmentRow>,
    pub categories: &'static [EmojiCategory],
}

/// Transcript fragment, pushed over the event stream.
#[derive(Template)]
#[template(path = "transcript.html")]
pub struct TranscriptTemplate {
    pub transcript: Load<Vec<MessageView>>,
}

/// Render the chat page. The transcript fills in from the event stream.
pub async fn chat_page(console: Console, Path(telegram_id): Path<i64>) -> Result<ChatTemplate> {
    let session = console.authorize(Route::Chat).await?;
    let form = ChatForm::with_input("", console.drafts.get(DraftKey::Chat(telegram_id)));
    render(&console, &session, telegram_id, form).await
}

/// Handle a post of the compose form.
pub async fn submit(
    console: Console,
    Path(telegram_id): Path<i64>,
    multipart: Multipart,
) -> Result<ChatTemplate> {
    let session = console.authorize(Route::Chat).await?;
    let mut data = FormData::read(multipart).await?;

    let key = DraftKey::Chat(telegram_id);
    let files = console.drafts.add(key, data.take_files("files"));
    let text = data.text("text").unwrap_or_default().to_string();

    let form = match FormAction::parse(&data) {
        FormAction::Emoji(picked) => {
            let mut form = ChatForm::with_input(text, files);
            if emoji::is_known(&picked) {
                form.insert_emoji(&picked);
            }
            form
        }
        FormAction::RemoveFile(index) => {
            console.drafts.remove(key, index);
            ChatForm::with_input(text, console.drafts.get(key))
        }
        FormAction::Send => {
            let mut form = ChatForm::with_input(text, files);
            send(&console, telegram_id, &mut form).await;
            form
        }
        FormAction::Refresh | FormAction::SelectAll | FormAction::DeselectAll => {
            ChatForm::with_input(text, files)
        }
    };

    render(&console, &session, telegram_id, form).await
}

/// Send the composed message.
///
/// On success the transcript key is invalidated and the form cleared; on
/// failure the form keeps its input and shows the error.
pub async fn send(console: &Console, telegram_id: i64, form: &mut ChatForm) {
    let mutation = &console.mutations.send_message;
    if mutation.is_pending() {
        form.fail("A message is already being sent.");
        return;
    }
    let Some(request) = form.begin_submit(telegram_id) else {
        return;
    };

    let result = mutation
        .run(console.client.messages().send_message(&request), |_| {
            console.queries.messages.invalidate(&messages_key(telegram_id));
            console.drafts.clear(DraftKey::Chat(telegram_id));
        })
        .await;

    match result {
        Ok(_) => form.succeed("Message sent."),
        Err(err) => form.fail(format!("Failed to send: {}", err)),
    }
}

/// Live transcript for one user.
///
/// Holding the stream open keeps the transcript polled every few seconds;
/// when the browser goes away the stream is dropped and polling stops.
pub async fn stream(
    console: Console,
    Path(telegram_id): Path<i64>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    console.authorize(Route::Chat).await?;

    let subscription = console.queries.watch_messages(&console.client, telegram_id);
    info!(telegram_id, "Transcript stream opened");

    let stream = stream::unfold(subscription, |mut subscription| async move {
        loop {
            let snapshot = subscription.changed().await?;
            if snapshot.is_fetching {
                continue;
            }
            return Some((Ok(transcript_event(&snapshot)), subscription));
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn transcript_event(snapshot: &Snapshot<Vec<Message>>) -> Event {
    let fragment = TranscriptTemplate {
        transcript: Load::from_snapshot(snapshot, |messages| chat::transcript(messages)),
    };
    let html = fragment.render().unwrap_or_else(|err| {
        warn!(error = %err, "Failed to render transcript");
        String::new()
    });
    // SSE data may not carry carriage returns.
    Event::default().event("transcript").data(html.replace('\r', ""))
}

async fn render(
    console: &Console,
    session: &Session,
    telegram_id: i64,
    form: ChatForm,
) -> Result<ChatTemplate> {
    let header = match console.queries.user(&console.client, telegram_id).await {
        Ok(user) => ChatHeader::from(&user),
        Err(err) => {
            warn!(telegram_id, error = %err, "Failed to load chat header");
            ChatHeader {
                title: format!("#{}", telegram_id),
                phone: None,
                link: format!("https://t.me/{}", telegram_id),
            }
        }
    };

    let snapshot = console.queries.messages.snapshot(&messages_key(telegram_id));
    let files = AttachmentRow::rows(form.attachments());

    Ok(ChatTemplate {
        nav: Some(Nav::new(session, Route::Chat)),
        telegram_id,
        header,
        transcript: Load::from_snapshot(&snapshot, |messages| chat::transcript(messages)),
        form,
        files,
        categories: &CATEGORIES,
    })
}
