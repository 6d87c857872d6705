use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    /// Relative to the media root, forward slashes on every platform.
    pub path: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub modified_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub total: usize,
    pub items: Vec<MediaEntry>,
    pub current_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    /// Whether the paired `.png` preview was removed alongside a `.gif`.
    pub preview_removed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub message: String,
    pub saved_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_saved_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
