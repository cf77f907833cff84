//! EmojiApi trait definition
//!
//! This trait defines the remote operations the uploader needs from a Misskey
//! instance. It keeps the batch logic decoupled from the HTTP client and lets
//! tests substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A file stored in the token owner's Drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub size: u64,

    /// MIME type as detected by the server
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A Drive folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFolder {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub parent_id: Option<String>,
}

/// A custom emoji as listed by the public emoji endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiSummary {
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub aliases: Vec<String>,
}

/// An emoji created by `admin/emoji/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEmoji {
    pub id: String,
}

/// File content to put into the Drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveUpload {
    /// File name sent with the multipart part
    pub file_name: String,

    pub content_type: String,

    pub bytes: Vec<u8>,

    /// Target folder, Drive root when `None`
    pub folder_id: Option<String>,
}

/// Request body for `admin/emoji/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiAddRequest {
    pub name: String,
    pub file_id: String,
    pub category: Option<String>,
    pub license: Option<String>,
    pub is_sensitive: bool,
    pub local_only: bool,
    pub aliases: Vec<String>,
}

/// Largest page `drive/folders` returns
pub const FOLDER_PAGE_LIMIT: usize = 100;

/// Options for one page of a Drive folder listing
///
/// Misskey lists newest first; `until_id` continues after the last folder of
/// the previous page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListOptions {
    /// Parent folder, Drive root when `None`
    pub parent_id: Option<String>,

    pub until_id: Option<String>,
}

/// Request body for `drive/folders/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolder {
    pub name: String,
    pub parent_id: Option<String>,
}

/// Remote operations against a Misskey instance
///
/// Implemented by the HTTP adapter and mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmojiApi: Send + Sync {
    /// Store file content in the Drive
    async fn drive_upload(&self, upload: DriveUpload) -> Result<DriveFile>;

    /// Register a Drive file as a custom emoji
    async fn emoji_add(&self, request: EmojiAddRequest) -> Result<RegisteredEmoji>;

    /// List the custom emoji currently on the instance
    async fn list_emojis(&self) -> Result<Vec<EmojiSummary>>;

    /// List one page of at most [`FOLDER_PAGE_LIMIT`] Drive folders
    async fn list_folders(&self, options: FolderListOptions) -> Result<Vec<DriveFolder>>;

    /// Create a Drive folder
    async fn create_folder(&self, request: CreateFolder) -> Result<DriveFolder>;
}
