//! Resumable upload session creation.

use tracing::{error, info};

use crate::contract::{DriveApi, UploadSession};
use crate::credential::Credential;
use crate::error::{PublishError, Result};
use crate::remote_path::RemotePath;

/// Asks the provider for an upload URL for `remote_path`. Any existing item
/// at that path is replaced once the transfer completes.
///
/// Only HTTP 200 is accepted; every other status is a
/// [`PublishError::SessionCreation`] carrying the raw body.
pub async fn create_session<A>(
    api: &A,
    credential: &Credential,
    remote_path: &RemotePath,
) -> Result<UploadSession>
where
    A: DriveApi + ?Sized,
{
    info!(remote_path = %remote_path, "Creating upload session");
    let response = api.create_upload_session(credential, remote_path).await?;

    if response.status != 200 {
        error!(
            remote_path = %remote_path,
            status = response.status,
            body = %response.body,
            "Failed to create upload session"
        );
        return Err(PublishError::SessionCreation {
            path: remote_path.to_string(),
            status: response.status,
            body: response.body,
        });
    }

    match response.json::<UploadSession>() {
        Ok(session) => {
            info!(
                remote_path = %remote_path,
                expires = session.expiration_date_time.as_deref().unwrap_or("unknown"),
                "Upload session created"
            );
            Ok(session)
        }
        Err(e) => {
            error!(error = ?e, body = %response.body, "Upload session response has no uploadUrl");
            Err(PublishError::MalformedResponse {
                context: "creating upload session",
                body: response.body,
            })
        }
    }
}
