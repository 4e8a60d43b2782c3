//! Corpus endpoints of the retrieval API.

use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

use crate::client::{ApiClient, Upstream};
use crate::error::Result;
use crate::types::{Attachment, DeleteReport, DocumentsResponse, UpdateReport, UploadReport};

/// `/documents/*` endpoints of the retrieval API.
#[derive(Debug, Clone, Copy)]
pub struct DocumentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List indexed documents with corpus totals.
    pub async fn list(&self) -> Result<DocumentsResponse> {
        self.client.get_json(Upstream::Rag, "/documents").await
    }

    /// Upload a document for indexing.
    ///
    /// With `replace_all` the existing corpus is dropped first.
    pub async fn upload(&self, file: &Attachment, replace_all: bool) -> Result<UploadReport> {
        info!(file = %file.file_name, replace_all, "Uploading document");

        let form = Form::new()
            .part("file", file.to_part()?)
            .text("replace_all", replace_all.to_string());

        self.client
            .send_form(
                Method::POST,
                Upstream::Rag,
                &format!("/documents?replace_all={}", replace_all),
                form,
            )
            .await
    }

    /// Replace an indexed document with a new file.
    pub async fn update(&self, name: &str, file: &Attachment) -> Result<UpdateReport> {
        info!(document = %name, file = %file.file_name, "Updating document");

        let form = Form::new().part("file", file.to_part()?);
        self.client
            .send_form(Method::PUT, Upstream::Rag, &document_path(name), form)
            .await
    }

    /// Remove a document and its chunks.
    pub async fn delete(&self, name: &str) -> Result<DeleteReport> {
        info!(document = %name, "Deleting document");
        self.client
            .call(Method::DELETE, Upstream::Rag, &document_path(name))
            .await
    }
}

fn document_path(name: &str) -> String {
    format!("/documents/{}", urlencoding::encode(name))
}
