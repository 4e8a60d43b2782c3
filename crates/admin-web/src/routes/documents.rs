//! Retrieval corpus management.

use askama::Template;
use axum::extract::{Multipart, Path};
use tracing::warn;

use crate::console::Console;
use crate::error::Result;
use crate::guard::{Nav, Route};
use crate::queries::documents_key;
use crate::routes::form_data::FormData;
use crate::session::Session;
use crate::views::documents::{
    delete_notice, update_notice, upload_notice, DocumentsView, UploadForm, ACCEPT,
};
use crate::views::Load;

/// Documents page template.
#[derive(Template)]
#[template(path = "documents.html")]
pub struct DocumentsTemplate {
    pub nav: Option<Nav>,
    pub documents: Load<DocumentsView>,
    pub form: UploadForm,
    pub accept: &'static str,
}

/// Render the corpus.
pub async fn documents_page(console: Console) -> Result<DocumentsTemplate> {
    let session = console.authorize(Route::Documents).await?;
    Ok(render(&console, &session, UploadForm::new()).await)
}

/// Upload a new document.
pub async fn upload(console: Console, multipart: Multipart) -> Result<DocumentsTemplate> {
    let session = console.authorize(Route::Documents).await?;
    let mut data = FormData::read(multipart).await?;

    let mut form = UploadForm::new();
    form.replace_all = data.checked("replace_all");
    let file = data.take_files("file").into_iter().next();

    if form.begin_submit(file.as_ref()) {
        if let Some(file) = &file {
            let result = console
                .mutations
                .upload_document
                .run(console.client.documents().upload(file, form.replace_all), |_| {
                    invalidate(&console);
                })
                .await;
            match result {
                Ok(report) => form.succeed(upload_notice(&report)),
                Err(err) => form.fail(format!("Upload failed: {}", err)),
            }
        }
    }

    Ok(render(&console, &session, form).await)
}

/// Replace a document's content with a new file.
pub async fn update(
    console: Console,
    Path(name): Path<String>,
    multipart: Multipart,
) -> Result<DocumentsTemplate> {
    let session = console.authorize(Route::Documents).await?;
    let mut data = FormData::read(multipart).await?;

    let mut form = UploadForm::new();
    let file = data.take_files("file").into_iter().next();

    if form.begin_submit(file.as_ref()) {
        if let Some(file) = &file {
            let result = console
                .mutations
                .update_document
                .run(console.client.documents().update(&name, file), |_| {
                    invalidate(&console);
                })
                .await;
            match result {
                Ok(report) => form.succeed(update_notice(&name, &report)),
                Err(err) => form.fail(format!("Update of {} failed: {}", name, err)),
            }
        }
    }

    Ok(render(&console, &session, form).await)
}

/// Delete a document. The page asks for confirmation before posting.
pub async fn delete(console: Console, Path(name): Path<String>) -> Result<DocumentsTemplate> {
    let session = console.authorize(Route::Documents).await?;

    let mut form = UploadForm::new();
    let result = console
        .mutations
        .delete_document
        .run(console.client.documents().delete(&name), |_| {
            invalidate(&console);
        })
        .await;
    match result {
        Ok(report) => form.succeed(delete_notice(&name, &report)),
        Err(err) => form.fail(format!("Delete of {} failed: {}", name, err)),
    }

    Ok(render(&console, &session, form).await)
}

fn invalidate(console: &Console) {
    console.queries.documents.invalidate(&documents_key());
}

async fn render(console: &Console, session: &Session, form: UploadForm) -> DocumentsTemplate {
    let result = console.queries.documents(&console.client).await;
    if let Err(err) = &result {
        warn!(error = %err, "Failed to load documents");
    }

    DocumentsTemplate {
        nav: Some(Nav::new(session, Route::Documents)),
        documents: Load::from_result(result, |response| DocumentsView::from(&response)),
        form,
        accept: ACCEPT,
    }
}
