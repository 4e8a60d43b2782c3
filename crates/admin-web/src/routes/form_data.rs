//! Buffered multipart submissions.

use admin_client::Attachment;
use axum::extract::Multipart;

use crate::error::AdminError;

/// A multipart form read into memory: text fields and uploaded files.
#[derive(Debug, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, Attachment)>,
}

impl FormData {
    /// Read every part. File inputs left empty are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AdminError> {
        let mut data = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AdminError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AdminError::BadRequest(e.to_string()))?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let mut file = Attachment::new(file_name, bytes.to_vec());
                    if let Some(content_type) = content_type {
                        if content_type != "application/octet-stream" {
                            file = file.with_content_type(content_type);
                        }
                    }
                    data.files.push((name, file));
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AdminError::BadRequest(e.to_string()))?;
                    data.fields.push((name, value));
                }
            }
        }

        Ok(data)
    }

    /// Build from parts directly.
    pub fn from_parts(fields: Vec<(String, String)>, files: Vec<(String, Attachment)>) -> Self {
        Self { fields, files }
    }

    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value of a repeated text field.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// A checkbox is on when it was submitted at all.
    pub fn checked(&self, name: &str) -> bool {
        self.text(name).is_some()
    }

    /// Take the files uploaded under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<Attachment> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(key, _)| key == name);
        self.files = kept;
        taken.into_iter().map(|(_, file)| file).collect()
    }
}

/// Which button submitted a composer form.
///
/// Composer pages re-render on every post, so helper buttons (emoji, select
/// all, remove file) submit the whole form and are told apart here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Send,
    Refresh,
    SelectAll,
    DeselectAll,
    RemoveFile(usize),
    Emoji(String),
}

impl FormAction {
    pub fn parse(data: &FormData) -> Self {
        if let Some(emoji) = data.text("emoji") {
            return FormAction::Emoji(emoji.to_string());
        }
        match data.text("action").unwrap_or("send") {
            "refresh" => FormAction::Refresh,
            "select_all" => FormAction::SelectAll,
            "deselect_all" => FormAction::DeselectAll,
            other => other
                .strip_prefix("remove:")
                .and_then(|index| index.parse().ok())
                .map_or(FormAction::Send, FormAction::RemoveFile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormData {
        FormData::from_parts(
            vec![
                ("telegram_ids".to_string(), "1".to_string()),
                ("text".to_string(), "Hello".to_string()),
                ("telegram_ids".to_string(), "3".to_string()),
            ],
            vec![
                ("files".to_string(), Attachment::new("a.png", vec![1])),
                ("file".to_string(), Attachment::new("b.pdf", vec![2])),
            ],
        )
    }

    #[test]
    fn test_fields() {
        let data = sample();
        assert_eq!(data.text("text"), Some("Hello"));
        assert_eq!(data.all("telegram_ids").collect::<Vec<_>>(), vec!["1", "3"]);
        assert!(!data.checked("replace_all"));
    }

    #[test]
    fn test_take_files() {
        let mut data = sample();
        let files = data.take_files("files");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "a.png");
        assert!(data.take_files("files").is_empty());
        assert_eq!(data.take_files("file").len(), 1);
    }

    #[test]
    fn test_form_action() {
        let action = |fields: &[(&str, &str)]| {
            let fields = fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            FormAction::parse(&FormData::from_parts(fields, Vec::new()))
        };

        assert_eq!(action(&[]), FormAction::Send);
        assert_eq!(action(&[("action", "select_all")]), FormAction::SelectAll);
        assert_eq!(action(&[("action", "remove:2")]), FormAction::RemoveFile(2));
        assert_eq!(action(&[("action", "remove:x")]), FormAction::Send);
        assert_eq!(
            action(&[("action", "send"), ("emoji", "🔥")]),
            FormAction::Emoji("🔥".to_string())
        );
    }
}
