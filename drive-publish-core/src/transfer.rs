//! Chunk planning and the chunked transfer engine.
//!
//! A file is sent as a strictly ascending sequence of byte ranges, one PUT
//! per range, each awaited before the next range is read. The provider
//! answers 202 while it expects more bytes and 200/201 with the finished
//! item once the upload is complete.

use std::fmt;
use std::io::SeekFrom;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, error, info};

use crate::contract::{DriveApi, DriveItem, UploadSession};
use crate::error::{PublishError, Result};

/// 3,276,800 bytes: ten 320 KiB units, the granularity Graph expects for
/// upload session fragments.
pub const DEFAULT_CHUNK_SIZE: u64 = 3_276_800;

/// One segment of a file transfer. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ChunkRange {
    /// Number of bytes in the range.
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}/{}", self.start, self.end, self.total)
    }
}

/// Iterator over the ranges covering `[0, total)` in `chunk_size` steps.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    next_start: u64,
    total: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(total: u64, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PublishError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            next_start: 0,
            total,
            chunk_size,
        })
    }

    /// `ceil(total / chunk_size)`.
    pub fn chunk_count(&self) -> u64 {
        self.total.div_ceil(self.chunk_size)
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        if self.next_start >= self.total {
            return None;
        }
        let start = self.next_start;
        let end = start.saturating_add(self.chunk_size).min(self.total) - 1;
        self.next_start = end + 1;
        Some(ChunkRange {
            start,
            end,
            total: self.total,
        })
    }
}

/// Streams `file_path` to `session` and returns the created item.
///
/// The first 200/201 ends the transfer, even if bytes remain. Any status
/// other than 200/201/202 abandons the session. Running out of ranges
/// without a completion status is [`PublishError::IncompleteTransfer`].
pub async fn upload_in_chunks<A>(
    api: &A,
    session: &UploadSession,
    file_path: &Path,
    chunk_size: u64,
) -> Result<DriveItem>
where
    A: DriveApi + ?Sized,
{
    let mut file = tokio::fs::File::open(file_path)
        .await
        .map_err(|e| PublishError::io(file_path, e))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| PublishError::io(file_path, e))?
        .len();

    let plan = ChunkPlan::new(file_size, chunk_size)?;
    info!(
        file = %file_path.display(),
        size = file_size,
        chunks = plan.chunk_count(),
        "Starting chunked upload"
    );

    for range in plan {
        let mut chunk = vec![0u8; range.size() as usize];
        file.seek(SeekFrom::Start(range.start))
            .await
            .map_err(|e| PublishError::io(file_path, e))?;
        file.read_exact(&mut chunk)
            .await
            .map_err(|e| PublishError::io(file_path, e))?;

        let response = api.put_chunk(&session.upload_url, range, chunk).await?;
        match response.status {
            200 | 201 => {
                return match response.json::<DriveItem>() {
                    Ok(item) => {
                        info!(
                            file = %file_path.display(),
                            item_id = item.id.as_deref().unwrap_or(""),
                            range = %range,
                            "Upload complete"
                        );
                        Ok(item)
                    }
                    Err(e) => {
                        error!(
                            error = ?e,
                            file = %file_path.display(),
                            body = %response.body,
                            "Completion response is not a drive item"
                        );
                        Err(PublishError::MalformedResponse {
                            context: "completing chunked upload",
                            body: response.body,
                        })
                    }
                };
            }
            202 => {
                debug!(file = %file_path.display(), range = %range, "Chunk accepted");
            }
            status => {
                error!(
                    file = %file_path.display(),
                    range = %range,
                    status,
                    body = %response.body,
                    "Chunk upload failed, abandoning session"
                );
                return Err(PublishError::ChunkTransfer {
                    path: file_path.to_path_buf(),
                    status,
                    body: response.body,
                });
            }
        }
    }

    error!(
        file = %file_path.display(),
        size = file_size,
        "All chunks sent without a completion status"
    );
    Err(PublishError::IncompleteTransfer {
        path: file_path.to_path_buf(),
    })
}
