//! # contract: the provider boundary
//!
//! [`DriveApi`] is the single seam between the protocol logic in this crate
//! and the network. Each method issues exactly one HTTP request and hands
//! back the raw status and body; interpreting them (which statuses mean
//! "continue", "done" or "failed") is the job of the calling component.
//!
//! The trait is annotated for `mockall` so tests can script provider
//! responses and count requests. Only transport-level failures (connection
//! refused, timeout) surface as `Err` from a trait method.

use async_trait::async_trait;
use mockall::automock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::credential::{Credential, Identity};
use crate::error::Result;
use crate::remote_path::RemotePath;
use crate::transfer::ChunkRange;

/// Status code and raw body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 OK or 201 Created.
    pub fn is_ok_or_created(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Metadata of a drive item as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A single-use upload target for one file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
    #[serde(default)]
    pub expiration_date_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    View,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkScope {
    Anonymous,
}

/// Body of a `createLink` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRequest {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub scope: LinkScope,
}

impl LinkRequest {
    pub fn anonymous(link_type: LinkType) -> Self {
        Self {
            link_type,
            scope: LinkScope::Anonymous,
        }
    }
}

/// A share URL together with what it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub web_url: String,
    pub link_type: LinkType,
    pub scope: LinkScope,
}

/// Provider operations used by the credential, session, transfer and share
/// components.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Client-credentials token exchange.
    async fn request_token(&self, identity: &Identity) -> Result<ApiResponse>;

    /// `createUploadSession` for `path`, replacing any existing item.
    async fn create_upload_session(
        &self,
        credential: &Credential,
        path: &RemotePath,
    ) -> Result<ApiResponse>;

    /// PUT one chunk to a session's upload URL.
    async fn put_chunk(
        &self,
        upload_url: &str,
        range: ChunkRange,
        chunk: Vec<u8>,
    ) -> Result<ApiResponse>;

    /// Look up an item by path.
    async fn get_item(&self, credential: &Credential, path: &RemotePath) -> Result<ApiResponse>;

    /// Create a sharing link for an item id.
    async fn create_link(
        &self,
        credential: &Credential,
        item_id: &str,
        request: &LinkRequest,
    ) -> Result<ApiResponse>;
}
