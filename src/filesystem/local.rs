//! Local filesystem collaborator, used by `--local` and the tests.

use tracing::debug;

use super::{DirectoryLister, Entry, EntryMetadata, FileFetcher, path};
use crate::error::{AppError, Result};

#[derive(Clone, Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl DirectoryLister for LocalFileSystem {
    async fn read_dir(&self, dir: &str) -> Result<Vec<Entry>> {
        debug!("Local read_dir: {}", dir);
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| AppError::TransportFailure(format!("Cannot read '{dir}': {e}")))?;

        let mut entries = Vec::new();
        while let Some(item) = read_dir
            .next_entry()
            .await
            .map_err(|e| AppError::TransportFailure(format!("Cannot read '{dir}': {e}")))?
        {
            let name = item.file_name().to_string_lossy().into_owned();
            let full_path = path::join(dir, &name)?;

            let is_symlink = item
                .file_type()
                .await
                .map(|t| t.is_symlink())
                .unwrap_or(false);
            // follow symlinks so linked directories stay enterable
            let metadata = tokio::fs::metadata(&full_path).await.ok();
            let is_dir = metadata.as_ref().is_some_and(|m| m.is_dir());

            entries.push(Entry::new(name, is_dir, full_path).with_metadata(EntryMetadata {
                size: metadata.as_ref().filter(|m| !m.is_dir()).map(|m| m.len()),
                modified: metadata.as_ref().and_then(|m| m.modified().ok()),
                is_symlink,
            }));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl FileFetcher for LocalFileSystem {
    async fn fetch(&self, remote_path: &str, local_path: &str) -> Result<u64> {
        debug!("Local copy {} -> {}", remote_path, local_path);
        tokio::fs::copy(remote_path, local_path).await.map_err(|e| {
            AppError::TransportFailure(format!(
                "Cannot copy '{remote_path}' to '{local_path}': {e}"
            ))
        })
    }
}
