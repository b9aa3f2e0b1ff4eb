//! Anonymous share links for drive items.

use serde_json::Value;
use tracing::{error, info};

use crate::contract::{DriveApi, LinkRequest, LinkType, ShareLink};
use crate::credential::Credential;
use crate::error::{PublishError, Result};
use crate::remote_path::RemotePath;

/// Requests an anonymous link of `link_type` for a known item id.
pub async fn create_link<A>(
    api: &A,
    credential: &Credential,
    item_id: &str,
    link_type: LinkType,
) -> Result<ShareLink>
where
    A: DriveApi + ?Sized,
{
    let request = LinkRequest::anonymous(link_type);
    info!(item_id, ?link_type, "Creating share link");
    let response = api.create_link(credential, item_id, &request).await?;

    let parsed: Value = match response.json() {
        Ok(value) => value,
        Err(e) => {
            error!(error = ?e, status = response.status, "Share link response is not JSON");
            return Err(PublishError::MalformedResponse {
                context: "creating share link",
                body: response.body,
            });
        }
    };

    let web_url = parsed
        .get("link")
        .and_then(|link| link.get("webUrl"))
        .and_then(Value::as_str);

    match web_url {
        Some(url) if response.is_ok_or_created() => {
            info!(item_id, web_url = url, "Share link created");
            Ok(ShareLink {
                web_url: url.to_string(),
                link_type: request.link_type,
                scope: request.scope,
            })
        }
        _ => {
            error!(
                item_id,
                status = response.status,
                body = %parsed,
                "Failed to create share link"
            );
            Err(PublishError::ShareLink {
                status: response.status,
                body: response.body,
            })
        }
    }
}

/// Resolves the item at `path` and shares it with `link_type`. Works for
/// files and folders alike.
pub async fn share_path<A>(
    api: &A,
    credential: &Credential,
    path: &RemotePath,
    link_type: LinkType,
) -> Result<ShareLink>
where
    A: DriveApi + ?Sized,
{
    info!(remote_path = %path, "Resolving item id");
    let response = api.get_item(credential, path).await?;

    let item_id = if response.is_ok_or_created() {
        response
            .json::<Value>()
            .ok()
            .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_owned))
            .filter(|id| !id.is_empty())
    } else {
        None
    };

    match item_id {
        Some(id) => create_link(api, credential, &id, link_type).await,
        None => {
            error!(
                remote_path = %path,
                status = response.status,
                body = %response.body,
                "Failed to resolve item id"
            );
            Err(PublishError::Lookup {
                path: path.to_string(),
                status: response.status,
                body: response.body,
            })
        }
    }
}

/// View-only anonymous link for the folder at `path`.
pub async fn share_folder<A>(
    api: &A,
    credential: &Credential,
    path: &RemotePath,
) -> Result<ShareLink>
where
    A: DriveApi + ?Sized,
{
    share_path(api, credential, path, LinkType::View).await
}
