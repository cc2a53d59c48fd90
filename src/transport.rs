//! Shell-spawned SFTP transport: `ssh <host> -s sftp` over child pipes.

use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::task::{Context, Poll};

use russh_sftp::client::SftpSession;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader, ReadBuf};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};

/// Child stdin/stdout joined into one duplex stream for the SFTP client.
pub struct ChildPipe {
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl AsyncRead for ChildPipe {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildPipe {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stdin).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}

/// A running ssh child process with an SFTP session layered on its pipes.
pub struct SshTransport {
    child: Child,
    session: Arc<SftpSession>,
}

impl SshTransport {
    /// Spawn `program [args] host -s sftp` and open an SFTP session on it.
    pub async fn spawn(program: &str, args: &[String], host: &str) -> Result<Self> {
        info!("Spawning transport: {} {:?} {} -s sftp", program, args, host);
        let mut child = Command::new(program)
            .args(args)
            .arg(host)
            .args(["-s", "sftp"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::TransportFailure(format!("Failed to spawn {program}: {e}")))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AppError::TransportFailure("ssh stdin was not captured".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AppError::TransportFailure("ssh stdout was not captured".to_string())
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(target: "wander::ssh", "{}", line);
                }
            });
        }

        let session = SftpSession::new(ChildPipe { stdin, stdout }).await?;
        debug!("SFTP session established with {}", host);

        Ok(Self {
            child,
            session: Arc::new(session),
        })
    }

    pub fn session(&self) -> Arc<SftpSession> {
        Arc::clone(&self.session)
    }

    /// Close the SFTP session and reap the child process.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.session.close().await {
            debug!("SFTP close failed: {}", e);
        }
        self.child.kill().await.ok();
        Ok(())
    }
}
