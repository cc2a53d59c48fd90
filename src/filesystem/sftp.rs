//! SFTP collaborator over a `russh_sftp` session.

use std::sync::Arc;

use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use super::{DirectoryLister, Entry, EntryMetadata, FileFetcher, path};
use crate::error::{AppError, Result};

/// Lists and downloads remote files through one shared SFTP session.
#[derive(Clone)]
pub struct SftpBrowser {
    session: Arc<SftpSession>,
}

impl SftpBrowser {
    pub fn new(session: Arc<SftpSession>) -> Self {
        Self { session }
    }

    /// Resolve a path such as `.` to the absolute path the server uses.
    pub async fn canonicalize(&self, path: &str) -> Result<String> {
        self.session
            .canonicalize(path)
            .await
            .map_err(|e| AppError::TransportFailure(format!("SFTP canonicalize failed: {e}")))
    }
}

impl DirectoryLister for SftpBrowser {
    async fn read_dir(&self, dir: &str) -> Result<Vec<Entry>> {
        debug!("SFTP read_dir: {}", dir);
        let read_dir = self.session.read_dir(dir).await.map_err(|e| {
            error!("SFTP read_dir failed for '{}': {}", dir, e);
            AppError::TransportFailure(format!("Cannot read '{dir}': {e}"))
        })?;

        let mut entries = Vec::new();
        for item in read_dir {
            let name = item.file_name();
            if name == "." || name == ".." {
                continue;
            }
            let full_path = path::join(dir, &name)?;

            let file_type = item.file_type();
            let is_symlink = file_type.is_symlink();
            let is_dir = if is_symlink {
                match self.session.metadata(full_path.as_str()).await {
                    Ok(target) => target.is_dir(),
                    // dangling links are shown as plain files
                    Err(_) => false,
                }
            } else {
                file_type.is_dir()
            };

            let attrs = item.metadata();
            entries.push(Entry::new(name, is_dir, full_path).with_metadata(EntryMetadata {
                size: if is_dir { None } else { attrs.size },
                modified: attrs.modified().ok(),
                is_symlink,
            }));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("SFTP read_dir completed for '{}': {} entries", dir, entries.len());
        Ok(entries)
    }
}

impl FileFetcher for SftpBrowser {
    async fn fetch(&self, remote_path: &str, local_path: &str) -> Result<u64> {
        debug!("SFTP download {} -> {}", remote_path, local_path);

        let mut source = self.session.open(remote_path).await.map_err(|e| {
            error!("SFTP open failed for '{}': {}", remote_path, e);
            AppError::TransportFailure(format!("Cannot open '{remote_path}': {e}"))
        })?;
        let mut dest = tokio::fs::File::create(local_path).await.map_err(|e| {
            AppError::TransportFailure(format!("Cannot create '{local_path}': {e}"))
        })?;

        let copied = tokio::io::copy(&mut source, &mut dest).await.map_err(|e| {
            error!("SFTP copy failed for '{}': {}", remote_path, e);
            AppError::TransportFailure(format!("Download of '{remote_path}' failed: {e}"))
        })?;
        dest.flush().await?;

        debug!("SFTP download finished: {} bytes", copied);
        Ok(copied)
    }
}
