#![doc = "reqwest implementation of DriveApi against Microsoft Graph."]
//
//! # Graph client
//!
//! [`GraphClient`] issues the HTTP requests behind [`DriveApi`]:
//!
//! - token exchange at `{login_base}/{tenant}/oauth2/v2.0/token`
//! - `createUploadSession`, item lookup and `createLink` under
//!   `{graph_base}/users/{user}/drive`
//! - chunk PUTs to the pre-authenticated upload URL (no bearer token)
//!
//! Non-success statuses are not errors here; they are returned as
//! [`ApiResponse`] for the calling component to interpret.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE};
use serde_json::json;
use tracing::debug;

use crate::config::{ClientSettings, GraphEndpoints, GRAPH_DEFAULT_SCOPE};
use crate::contract::{ApiResponse, DriveApi, LinkRequest};
use crate::credential::{Credential, Identity};
use crate::error::Result;
use crate::remote_path::RemotePath;
use crate::transfer::ChunkRange;

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    endpoints: GraphEndpoints,
}

impl GraphClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoints: settings.endpoints.clone(),
        })
    }

    fn item_url(&self, credential: &Credential, path: &RemotePath) -> String {
        let drive = self.endpoints.drive_url(credential.user_id());
        if path.is_root() {
            format!("{drive}/root")
        } else {
            format!("{drive}/root:/{}", path.encoded())
        }
    }

    async fn read(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, body_len = body.len(), "Received provider response");
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl DriveApi for GraphClient {
    async fn request_token(&self, identity: &Identity) -> Result<ApiResponse> {
        let url = self.endpoints.token_url(&identity.tenant_id);
        debug!(url = %url, "POST token");
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", identity.client_id.as_str()),
                ("client_secret", identity.client_secret.as_str()),
                ("scope", GRAPH_DEFAULT_SCOPE),
            ])
            .send()
            .await?;
        Self::read(response).await
    }

    async fn create_upload_session(
        &self,
        credential: &Credential,
        path: &RemotePath,
    ) -> Result<ApiResponse> {
        let url = format!(
            "{}/root:/{}:/createUploadSession",
            self.endpoints.drive_url(credential.user_id()),
            path.encoded()
        );
        debug!(url = %url, "POST createUploadSession");
        let body = json!({
            "item": {
                "@microsoft.graph.conflictBehavior": "replace"
            }
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(credential.token())
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn put_chunk(
        &self,
        upload_url: &str,
        range: ChunkRange,
        chunk: Vec<u8>,
    ) -> Result<ApiResponse> {
        debug!(range = %range, "PUT chunk");
        let response = self
            .http
            .put(upload_url)
            .header(CONTENT_LENGTH, range.size())
            .header(CONTENT_RANGE, range.content_range())
            .body(chunk)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn get_item(&self, credential: &Credential, path: &RemotePath) -> Result<ApiResponse> {
        let url = self.item_url(credential, path);
        debug!(url = %url, "GET item");
        let response = self
            .http
            .get(&url)
            .bearer_auth(credential.token())
            .send()
            .await?;
        Self::read(response).await
    }

    async fn create_link(
        &self,
        credential: &Credential,
        item_id: &str,
        request: &LinkRequest,
    ) -> Result<ApiResponse> {
        let url = format!(
            "{}/items/{}/createLink",
            self.endpoints.drive_url(credential.user_id()),
            item_id
        );
        debug!(url = %url, "POST createLink");
        let response = self
            .http
            .post(&url)
            .bearer_auth(credential.token())
            .json(request)
            .send()
            .await?;
        Self::read(response).await
    }
}
