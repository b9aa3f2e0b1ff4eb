//! Per-file orchestration: credential, then for each file session and
//! chunked transfer, then one share link for the destination folder.
//!
//! # Error Handling
//! File-level failures are logged and recorded in the [`PublishReport`];
//! the run moves on to the next file. Only an authentication failure
//! (initially or when refreshing an expiring token) stops the run.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::contract::{DriveApi, DriveItem, ShareLink};
use crate::credential::{self, Credential, Identity};
use crate::error::{PublishError, Result};
use crate::remote_path::RemotePath;
use crate::transfer::DEFAULT_CHUNK_SIZE;
use crate::{session, share, transfer};

/// Where and how files are uploaded.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub remote_folder: RemotePath,
    pub chunk_size: u64,
}

impl PublishSettings {
    pub fn new(remote_folder: RemotePath) -> Self {
        Self {
            remote_folder,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub local_path: PathBuf,
    pub outcome: Result<DriveItem>,
}

#[derive(Debug)]
pub enum ShareOutcome {
    Skipped,
    Shared(ShareLink),
    Failed(PublishError),
}

#[derive(Debug)]
pub struct PublishReport {
    pub files: Vec<FileReport>,
    pub share: ShareOutcome,
}

impl PublishReport {
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_err())
    }

    pub fn share_url(&self) -> Option<&str> {
        match &self.share {
            ShareOutcome::Shared(link) => Some(&link.web_url),
            _ => None,
        }
    }

    /// Every file uploaded and, if sharing was requested, it succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_files().next().is_none() && !matches!(self.share, ShareOutcome::Failed(_))
    }
}

/// Owns the provider handle and the current credential for one run.
pub struct Publisher<A> {
    api: A,
    identity: Identity,
    credential: Credential,
    settings: PublishSettings,
}

impl<A> Publisher<A>
where
    A: DriveApi,
{
    /// Acquires the initial credential. Fails fast on
    /// [`PublishError::Auth`]; nothing is uploaded without a token.
    pub async fn connect(api: A, identity: Identity, settings: PublishSettings) -> Result<Self> {
        let credential = credential::acquire(&api, &identity).await?;
        Ok(Self {
            api,
            identity,
            credential,
            settings,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    async fn refresh_if_needed(&mut self) -> Result<()> {
        if self.credential.needs_refresh() {
            warn!("Access token close to expiry, re-acquiring");
            self.credential = credential::acquire(&self.api, &self.identity).await?;
        }
        Ok(())
    }

    /// Destination of `local_path`: the configured folder plus the local
    /// base name.
    pub fn remote_path_for(&self, local_path: &Path) -> Result<RemotePath> {
        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PublishError::InvalidLocalPath(local_path.to_path_buf()))?;
        Ok(self.settings.remote_folder.join(name))
    }

    /// Creates a session for one file and transfers it in chunks.
    pub async fn upload_file(&mut self, local_path: &Path) -> Result<DriveItem> {
        let remote_path = self.remote_path_for(local_path)?;
        self.refresh_if_needed().await?;

        info!(
            file = %local_path.display(),
            remote_path = %remote_path,
            "[PUBLISH] Uploading file"
        );
        let upload_session =
            session::create_session(&self.api, &self.credential, &remote_path).await?;
        transfer::upload_in_chunks(
            &self.api,
            &upload_session,
            local_path,
            self.settings.chunk_size,
        )
        .await
    }

    /// Anonymous view link for the configured folder.
    pub async fn share_folder(&mut self) -> Result<ShareLink> {
        self.refresh_if_needed().await?;
        share::share_folder(&self.api, &self.credential, &self.settings.remote_folder).await
    }

    /// Uploads `files` in order, then optionally shares the folder.
    ///
    /// Returns `Err` only for a fatal error; everything else lands in the
    /// report.
    pub async fn publish(&mut self, files: &[PathBuf], share: bool) -> Result<PublishReport> {
        info!(
            files = files.len(),
            remote_folder = %self.settings.remote_folder,
            "[PUBLISH] Starting publish run"
        );

        let mut reports = Vec::with_capacity(files.len());
        for local_path in files {
            let outcome = match self.upload_file(local_path).await {
                Err(e) if e.is_fatal() => {
                    error!(file = %local_path.display(), error = %e, "[PUBLISH][ERROR] Aborting run");
                    return Err(e);
                }
                outcome => outcome,
            };
            match &outcome {
                Ok(item) => info!(
                    file = %local_path.display(),
                    item_id = item.id.as_deref().unwrap_or(""),
                    "[PUBLISH] Upload succeeded"
                ),
                Err(e) => error!(
                    file = %local_path.display(),
                    error = %e,
                    "[PUBLISH][ERROR] Upload failed, continuing with next file"
                ),
            }
            reports.push(FileReport {
                local_path: local_path.clone(),
                outcome,
            });
        }

        let share = if share {
            match self.share_folder().await {
                Ok(link) => {
                    info!(web_url = %link.web_url, "[PUBLISH] Folder shared");
                    ShareOutcome::Shared(link)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(error = %e, "[PUBLISH][ERROR] Folder sharing failed");
                    ShareOutcome::Failed(e)
                }
            }
        } else {
            ShareOutcome::Skipped
        };

        Ok(PublishReport {
            files: reports,
            share,
        })
    }
}
