//! Retrieval corpus page.

use admin_client::{Attachment, DeleteReport, DocumentsResponse, UpdateReport, UploadReport};

use super::form::FormPhase;

/// File types the retrieval API indexes. Only a hint for the file picker.
pub const ACCEPT: &str = ".pdf,.docx,.txt,.md";

/// Table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub name: String,
    /// Path segment for the per-document actions.
    pub encoded: String,
    pub chunks: u64,
}

/// The corpus with its totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentsView {
    pub rows: Vec<DocumentRow>,
    pub total_documents: u64,
    pub total_chunks: u64,
}

impl From<&DocumentsResponse> for DocumentsView {
    fn from(response: &DocumentsResponse) -> Self {
        Self {
            rows: response
                .documents
                .iter()
                .map(|doc| DocumentRow {
                    name: doc.document.clone(),
                    encoded: urlencoding::encode(&doc.document).into_owned(),
                    chunks: doc.chunks,
                })
                .collect(),
            total_documents: response.total_documents,
            total_chunks: response.total_chunks,
        }
    }
}

impl DocumentsView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn upload_notice(report: &UploadReport) -> String {
    let name = report.filename.as_deref().unwrap_or("Document");
    format!("{} uploaded: {} chunks indexed.", name, report.chunks)
}

pub fn update_notice(name: &str, report: &UpdateReport) -> String {
    format!(
        "{} updated: {} chunks replaced by {}.",
        name, report.deleted_chunks, report.new_chunks
    )
}

pub fn delete_notice(name: &str, report: &DeleteReport) -> String {
    format!("{} deleted ({} chunks).", name, report.deleted_chunks)
}

/// Upload form and the outcome of the last corpus mutation.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub replace_all: bool,
    phase: FormPhase,
    notice: Option<String>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            replace_all: true,
            phase: FormPhase::Idle,
            notice: None,
        }
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file must be chosen before anything is sent.
    pub fn begin_submit(&mut self, file: Option<&Attachment>) -> bool {
        match file {
            Some(file) if !file.is_empty() => {
                self.notice = None;
                self.phase.submit()
            }
            _ => {
                self.phase.fail("Choose a file first.");
                false
            }
        }
    }

    pub fn succeed(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.phase.succeed();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase.fail(error);
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_client::Document;

    #[test]
    fn test_view_encodes_names() {
        let response = DocumentsResponse {
            documents: vec![Document {
                document: "план курса.pdf".to_string(),
                chunks: 12,
            }],
            total_documents: 1,
            total_chunks: 12,
        };
        let view = DocumentsView::from(&response);
        assert_eq!(view.rows[0].encoded, "%D0%BF%D0%BB%D0%B0%D0%BD%20%D0%BA%D1%83%D1%80%D1%81%D0%B0.pdf");
        assert_eq!(view.total_chunks, 12);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_upload_requires_file() {
        let mut form = UploadForm::new();
        assert!(form.replace_all);
        assert!(!form.begin_submit(None));
        assert_eq!(form.error(), Some("Choose a file first."));

        let file = Attachment::new("guide.pdf", vec![1, 2]);
        assert!(form.begin_submit(Some(&file)));
        form.succeed("done");
        assert_eq!(form.notice(), Some("done"));
    }

    #[test]
    fn test_notices() {
        let report = UploadReport {
            message: "ok".to_string(),
            filename: Some("guide.pdf".to_string()),
            chunks: 4,
        };
        assert_eq!(upload_notice(&report), "guide.pdf uploaded: 4 chunks indexed.");

        let report = DeleteReport {
            message: "ok".to_string(),
            deleted_chunks: 3,
        };
        assert_eq!(delete_notice("a.txt", &report), "a.txt deleted (3 chunks).");
    }
}
