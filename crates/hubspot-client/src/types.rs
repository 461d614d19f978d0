use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Visibility of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileAccess {
    PublicIndexable,
    PublicNotIndexable,
    Private,
}

/// A single file to push into the file manager.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub folder_id: Option<String>,
    pub access: FileAccess,
}

/// Serialized into the `options` multipart field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadOptions<'a> {
    pub access: FileAccess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<&'a str>,
}

/// The file store's view of a created file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Body of a CRM partial update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyPatch {
    pub properties: BTreeMap<String, String>,
}

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}
