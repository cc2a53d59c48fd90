//! Backend worker: executes requests against the filesystem collaborators and
//! replies on the application event channel.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::events::{AppEvent, Request, Response, Topic};
use crate::filesystem::{DirectoryLister, FileFetcher, download_target};

/// Run until the request channel closes or `cancel` fires.
pub async fn run_backend<L, F>(
    lister: L,
    fetcher: F,
    mut requests: mpsc::Receiver<Request>,
    events: mpsc::Sender<AppEvent>,
    timeout: Duration,
    cancel: CancellationToken,
) where
    L: DirectoryLister,
    F: FileFetcher,
{
    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => break,
            response = handle_request(&lister, &fetcher, request, timeout) => response,
        };

        if events.send(AppEvent::Backend(response)).await.is_err() {
            warn!("App event channel closed, stopping backend");
            return;
        }
    }

    info!("Backend stopped");
    let _ = events.send(AppEvent::Disconnect).await;
}

async fn handle_request<L, F>(
    lister: &L,
    fetcher: &F,
    request: Request,
    timeout: Duration,
) -> Response
where
    L: DirectoryLister,
    F: FileFetcher,
{
    let Request { id, topic } = request;
    match topic {
        Topic::EnterDirectory { target } | Topic::LeaveDirectory { target, .. } => {
            debug!("Reading directory {}", target);
            let result = with_timeout(timeout, lister.read_dir(&target)).await;
            Response::DirectoryRead {
                id,
                path: target,
                result,
            }
        }
        Topic::DownloadFile {
            remote_path,
            local_path,
        } => {
            let local_path = download_target(&remote_path, &local_path).await;
            info!("Downloading {} to {}", remote_path, local_path);
            let result = with_timeout(timeout, fetcher.fetch(&remote_path, &local_path)).await;
            Response::DownloadComplete {
                id,
                remote_path,
                local_path,
                result,
            }
        }
    }
}

async fn with_timeout<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::TransportFailure(format!(
            "timed out after {}s",
            limit.as_secs_f32()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RequestId;
    use crate::filesystem::{Entry, LocalFileSystem};
    use std::fs;

    struct StalledLister;

    impl DirectoryLister for StalledLister {
        async fn read_dir(&self, _path: &str) -> Result<Vec<Entry>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    fn spawn_backend<L: DirectoryLister>(
        lister: L,
        timeout: Duration,
    ) -> (
        mpsc::Sender<Request>,
        mpsc::Receiver<AppEvent>,
        CancellationToken,
    ) {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (ev_tx, ev_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        tokio::spawn(run_backend(
            lister,
            LocalFileSystem::new(),
            req_rx,
            ev_tx,
            timeout,
            cancel.clone(),
        ));
        (req_tx, ev_rx, cancel)
    }

    #[tokio::test]
    async fn test_directory_request_is_answered_with_entries() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("foo"), "").unwrap();
        let dir = tmp.path().to_str().unwrap().to_string();

        let (tx, mut rx, _cancel) = spawn_backend(LocalFileSystem::new(), Duration::from_secs(5));
        tx.send(Request {
            id: RequestId(3),
            topic: Topic::EnterDirectory {
                target: dir.clone(),
            },
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(AppEvent::Backend(Response::DirectoryRead { id, path, result })) => {
                assert_eq!(id, RequestId(3));
                assert_eq!(path, dir);
                assert_eq!(result.unwrap()[0].name, "foo");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_request_reports_byte_count() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = tmp.path().join("remote.bin");
        fs::write(&remote, [1u8, 2, 3]).unwrap();
        let local = tmp.path().join("local.bin");

        let (tx, mut rx, _cancel) = spawn_backend(LocalFileSystem::new(), Duration::from_secs(5));
        tx.send(Request {
            id: RequestId(1),
            topic: Topic::DownloadFile {
                remote_path: remote.to_str().unwrap().to_string(),
                local_path: local.to_str().unwrap().to_string(),
            },
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(AppEvent::Backend(Response::DownloadComplete { result, .. })) => {
                assert_eq!(result.unwrap(), 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(fs::read(local).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_into_directory_reports_written_file() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = tmp.path().join("report.csv");
        fs::write(&remote, "a,b\n").unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();

        let (tx, mut rx, _cancel) = spawn_backend(LocalFileSystem::new(), Duration::from_secs(5));
        tx.send(Request {
            id: RequestId(2),
            topic: Topic::DownloadFile {
                remote_path: remote.to_str().unwrap().to_string(),
                local_path: format!("{}/", out.to_str().unwrap()),
            },
        })
        .await
        .unwrap();

        let written = out.join("report.csv");
        match rx.recv().await {
            Some(AppEvent::Backend(Response::DownloadComplete {
                local_path, result, ..
            })) => {
                assert_eq!(local_path, written.to_str().unwrap());
                assert_eq!(result.unwrap(), 4);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(fs::read_to_string(written).unwrap(), "a,b\n");
    }

    #[tokio::test]
    async fn test_stalled_lister_times_out() {
        let (tx, mut rx, _cancel) = spawn_backend(StalledLister, Duration::from_millis(20));
        tx.send(Request {
            id: RequestId(1),
            topic: Topic::EnterDirectory {
                target: "/".to_string(),
            },
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(AppEvent::Backend(Response::DirectoryRead { result, .. })) => {
                assert!(matches!(result, Err(AppError::TransportFailure(_))));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_sends_disconnect() {
        let (_tx, mut rx, cancel) = spawn_backend(LocalFileSystem::new(), Duration::from_secs(5));
        cancel.cancel();
        assert!(matches!(rx.recv().await, Some(AppEvent::Disconnect)));
    }
}
