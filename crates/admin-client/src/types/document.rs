//! Retrieval corpus types.

use serde::Deserialize;

/// One indexed document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    /// Document name; also its identifier in `/documents/{name}`.
    pub document: String,
    /// Number of retrievable chunks produced from it.
    pub chunks: u64,
}

/// The corpus listing with aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<Document>,
    pub total_documents: u64,
    pub total_chunks: u64,
}

/// Result of uploading a document.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReport {
    pub message: String,
    pub filename: Option<String>,
    pub chunks: u64,
}

/// Result of replacing a document in place.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReport {
    pub message: String,
    pub deleted_chunks: u64,
    pub new_chunks: u64,
}

/// Result of deleting a document.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteReport {
    pub message: String,
    pub deleted_chunks: u64,
}
