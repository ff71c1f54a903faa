// ABOUTME: Chunked upload of a local file into file storage
// ABOUTME: MD5 the file, skip if the server already has it, upload shards, then merge

use md5::{Digest, Md5};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use super::file_storage::{self, FileMeta, MergeParams, StoredFile, UploadSlice};
use crate::dispatch::Dispatcher;
use crate::error::ApiError;

/// Default shard size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub chunk_size: usize,
    pub meta: FileMeta,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            meta: FileMeta::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub uploaded_slices: u32,
    pub total_slices: u32,
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server already stores a file with the same checksum.
    AlreadyExists(StoredFile),
    Uploaded { file_sum_md5: String, slices: u32 },
}

/// Hex MD5 of a file, read in chunks.
pub async fn file_md5(path: &Path) -> Result<String, ApiError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Number of shards for `size` bytes; an empty file still takes one shard.
/// Fails when the count does not fit the server's 32-bit slice fields.
pub fn slice_count(size: u64, chunk_size: usize) -> Result<u32, ApiError> {
    let chunk = chunk_size.max(1) as u64;
    let count = size.div_ceil(chunk).max(1);
    u32::try_from(count).map_err(|_| {
        ApiError::InvalidRequest(format!(
            "{size} bytes in {chunk}-byte shards needs {count} shards, too many; use a larger chunk size"
        ))
    })
}

pub async fn upload_file<F>(
    dispatcher: &Dispatcher,
    path: &Path,
    options: &UploadOptions,
    mut on_progress: F,
) -> Result<UploadOutcome, ApiError>
where
    F: FnMut(UploadProgress),
{
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ApiError::InvalidRequest(format!("not a file: {}", path.display())))?;

    let total_bytes = tokio::fs::metadata(path).await?.len();
    let file_sum_md5 = file_md5(path).await?;

    if let Some(existing) = file_storage::has_file(dispatcher, &file_sum_md5).await? {
        info!(md5 = %file_sum_md5, id = %existing.id, "file already stored");
        return Ok(UploadOutcome::AlreadyExists(existing));
    }

    let chunk_size = options.chunk_size.max(1);
    let total_slices = slice_count(total_bytes, chunk_size)?;
    let slice_id = uuid::Uuid::new_v4().simple().to_string();
    debug!(%slice_id, total_slices, total_bytes, "starting sharded upload");

    let mut file = tokio::fs::File::open(path).await?;
    let mut uploaded_bytes = 0u64;
    for now_slice in 0..total_slices {
        let mut bytes = Vec::with_capacity(chunk_size);
        (&mut file)
            .take(chunk_size as u64)
            .read_to_end(&mut bytes)
            .await?;
        uploaded_bytes += bytes.len() as u64;

        file_storage::upload_sharding(
            dispatcher,
            UploadSlice {
                slice_id: slice_id.clone(),
                total_slice: total_slices,
                now_slice,
                file_sum_md5: file_sum_md5.clone(),
                file_name: file_name.clone(),
                bytes,
            },
        )
        .await?;

        on_progress(UploadProgress {
            uploaded_slices: now_slice + 1,
            total_slices,
            uploaded_bytes,
            total_bytes,
        });
    }

    file_storage::upload_sharding_merge(
        dispatcher,
        &MergeParams {
            slice_id,
            total_slice: total_slices,
            file_sum_md5: file_sum_md5.clone(),
            meta: options.meta.clone(),
        },
    )
    .await?;

    info!(md5 = %file_sum_md5, slices = total_slices, "upload merged");
    Ok(UploadOutcome::Uploaded {
        file_sum_md5,
        slices: total_slices,
    })
}
