//! Misskey API client implementation
//!
//! This module provides the MisskeyClient that implements the EmojiApi trait
//! using HTTP requests authenticated with a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use mku_core::{
    ApiFailure, CreateFolder, Credentials, DriveFile, DriveFolder, DriveUpload, EmojiAddRequest,
    EmojiApi, EmojiSummary, Error, FOLDER_PAGE_LIMIT, FolderListOptions, RegisteredEmoji, Result,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("mku/", env!("CARGO_PKG_VERSION"));

/// Misskey's error envelope: `{"error": {"code": ..., "message": ..., "id": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmojiListResponse {
    emojis: Vec<EmojiSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderListRequest {
    folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    until_id: Option<String>,
    limit: usize,
}

/// HTTP client for one Misskey instance
pub struct MisskeyClient {
    http_client: Client,
    credentials: Credentials,
}

impl MisskeyClient {
    /// Create a new MisskeyClient with the given request timeout
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.credentials.endpoint(path);
        tracing::debug!(%url, "POST");
        self.http_client
            .post(url)
            .bearer_auth(self.credentials.token())
    }

    /// POST a JSON body and decode the JSON response
    async fn post_json<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, ApiFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiFailure::transport(format!("Request failed: {e}")))?;
        decode(response).await
    }
}

/// Decode a response, turning non-success statuses into an [`ApiFailure`]
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, ApiFailure> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiFailure::transport(format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        let failure = failure_from_body(status, &text);
        tracing::debug!(status = status.as_u16(), code = ?failure.code, "request rejected");
        return Err(failure);
    }

    serde_json::from_str(&text).map_err(|e| {
        ApiFailure::http(
            status.as_u16(),
            None,
            format!("Unexpected response body: {e}"),
        )
    })
}

/// Build a failure from an error response, keeping the server's wording
fn failure_from_body(status: StatusCode, body: &str) -> ApiFailure {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let mut message = error
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").into());
            if let Some(id) = error.id {
                message.push_str(&format!(" (id: {id})"));
            }
            ApiFailure::http(status.as_u16(), error.code, message)
        }
        Err(_) => {
            let body = body.trim();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.to_string()
            };
            ApiFailure::http(status.as_u16(), None, message)
        }
    }
}

#[async_trait]
impl EmojiApi for MisskeyClient {
    async fn drive_upload(&self, upload: DriveUpload) -> Result<DriveFile> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| {
                Error::Upload(ApiFailure::transport(format!(
                    "Invalid content type '{}': {e}",
                    upload.content_type
                )))
            })?;

        let mut form = Form::new().part("file", part);
        if let Some(folder_id) = upload.folder_id {
            form = form.text("folderId", folder_id);
        }

        let response = self
            .post("drive/files/create")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(ApiFailure::transport(format!("Request failed: {e}"))))?;

        decode(response).await.map_err(Error::Upload)
    }

    async fn emoji_add(&self, request: EmojiAddRequest) -> Result<RegisteredEmoji> {
        self.post_json("admin/emoji/add", &request)
            .await
            .map_err(Error::Registration)
    }

    async fn list_emojis(&self) -> Result<Vec<EmojiSummary>> {
        let url = self.credentials.endpoint("emojis");
        tracing::debug!(%url, "GET");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Api(ApiFailure::transport(format!("Request failed: {e}"))))?;

        let list: EmojiListResponse = decode(response).await.map_err(Error::Api)?;
        Ok(list.emojis)
    }

    async fn list_folders(&self, options: FolderListOptions) -> Result<Vec<DriveFolder>> {
        let request = FolderListRequest {
            folder_id: options.parent_id,
            until_id: options.until_id,
            limit: FOLDER_PAGE_LIMIT,
        };
        self.post_json("drive/folders", &request)
            .await
            .map_err(Error::Api)
    }

    async fn create_folder(&self, request: CreateFolder) -> Result<DriveFolder> {
        self.post_json("drive/folders/create", &request)
            .await
            .map_err(Error::Api)
    }
}
