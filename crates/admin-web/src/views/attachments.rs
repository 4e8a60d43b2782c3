//! Files queued on a form before it is submitted.
//!
//! File inputs lose their selection when the page is re-rendered, so queued
//! attachments are kept server-side per form until it is sent or cleared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use admin_client::Attachment;
use tracing::debug;

/// Which form a queue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Broadcast,
    Chat(i64),
}

/// Display row for a queued file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRow {
    pub index: usize,
    pub file_name: String,
    pub size: String,
    pub is_image: bool,
}

impl AttachmentRow {
    pub fn rows(files: &[Attachment]) -> Vec<AttachmentRow> {
        files
            .iter()
            .enumerate()
            .map(|(index, file)| AttachmentRow {
                index,
                file_name: file.file_name.clone(),
                size: human_size(file.len()),
                is_image: file.is_image(),
            })
            .collect()
    }
}

/// Queued attachments for every open form.
#[derive(Debug, Clone, Default)]
pub struct Drafts {
    inner: Arc<Mutex<HashMap<DraftKey, Vec<Attachment>>>>,
}

impl Drafts {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DraftKey, Vec<Attachment>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the queue.
    pub fn get(&self, key: DraftKey) -> Vec<Attachment> {
        self.lock().get(&key).cloned().unwrap_or_default()
    }

    /// Append files to the queue. Empty uploads are skipped.
    pub fn add(&self, key: DraftKey, files: Vec<Attachment>) -> Vec<Attachment> {
        let mut drafts = self.lock();
        let queue = drafts.entry(key).or_default();
        for file in files.into_iter().filter(|file| !file.is_empty()) {
            debug!(?key, file = %file.file_name, "Queued attachment");
            queue.push(file);
        }
        queue.clone()
    }

    /// Remove one queued file by position.
    pub fn remove(&self, key: DraftKey, index: usize) -> Option<Attachment> {
        let mut drafts = self.lock();
        let queue = drafts.get_mut(&key)?;
        (index < queue.len()).then(|| queue.remove(index))
    }

    pub fn clear(&self, key: DraftKey) {
        self.lock().remove(&key);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }
}

/// `1536` → `1.5 KB`.
pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
