//! Filesystem collaborators behind the navigation core.

use std::future::Future;

use crate::error::Result;

pub mod entry;
pub mod local;
pub mod path;
pub mod sftp;

pub use entry::{Entry, EntryMetadata};
pub use local::LocalFileSystem;
pub use sftp::SftpBrowser;

/// Produces the ordered entries of a directory.
pub trait DirectoryLister: Send + Sync + 'static {
    fn read_dir(&self, path: &str) -> impl Future<Output = Result<Vec<Entry>>> + Send;
}

/// Copies a remote file to exactly `local_path`, returning the byte count.
pub trait FileFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        remote_path: &str,
        local_path: &str,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Final local file path for a download: a destination that is an existing
/// directory, or that ends with a separator, receives the remote file name.
pub async fn download_target(remote_path: &str, local_path: &str) -> String {
    let is_dir = local_path.ends_with('/')
        || tokio::fs::metadata(local_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

    if is_dir {
        format!(
            "{}/{}",
            local_path.trim_end_matches('/'),
            path::file_name(remote_path)
        )
    } else {
        local_path.to_string()
    }
}
