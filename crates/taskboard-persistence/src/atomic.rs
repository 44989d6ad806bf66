//! Envelope file IO: whole-file reads and crash-safe replacement writes.

use std::path::Path;
use taskboard_core::StoreResult;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Replace `path` with `data` in one step: stage the payload in a temp file
/// alongside the target, flush it to disk, then rename it into place, so
/// readers never observe a half-written envelope. Returns the number of
/// bytes committed.
pub async fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<usize> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let staged = tempfile::NamedTempFile::new_in(parent)?;
    let staged_path = staged.path().to_path_buf();

    let mut file = fs::File::create(&staged_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&staged_path, path).await?;
    Ok(data.len())
}

pub async fn read_all(path: &Path) -> StoreResult<Vec<u8>> {
    Ok(fs::read(path).await?)
}
