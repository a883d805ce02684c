//! Filesystem helpers for debug artifacts.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Size of a file in bytes, or 0 when it does not exist.
pub async fn file_len(path: impl AsRef<Path>) -> u64 {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Copy `src` to `dst`, creating the destination directory if needed.
///
/// The copy goes through a temporary sibling and is renamed into place, so a
/// reader never sees a partially written `dst`.
pub async fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<u64> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_dst = dst.with_extension("tmp");

    let bytes = fs::copy(src, &tmp_dst).await.map_err(|e| {
        tracing::error!(
            "Failed to copy file: {} -> {}: {}",
            src.display(),
            tmp_dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    fs::rename(&tmp_dst, dst).await.map_err(|e| {
        let _ = std::fs::remove_file(&tmp_dst);
        tracing::error!(
            "Failed to rename temp file: {} -> {}: {}",
            tmp_dst.display(),
            dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    tracing::debug!("Copied {} -> {} ({} bytes)", src.display(), dst.display(), bytes);

    Ok(bytes)
}
