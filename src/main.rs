use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use wander::filesystem::{LocalFileSystem, SftpBrowser, path};
use wander::{
    App, AppError, AppEvent, ConfigManager, EventChannel, Result, SshTransport, init_panic_hook,
    init_terminal, init_tracing, restore_tui, run_backend, spawn_input_reader,
};

/// Browse a remote host over SFTP and download files from it.
#[derive(Parser, Debug)]
#[command(name = "wander", version, about)]
struct Cli {
    /// ssh destination, e.g. `user@host`
    #[arg(required_unless_present = "local", conflicts_with = "local")]
    host: Option<String>,

    /// Browse the local filesystem instead of a remote host
    #[arg(long)]
    local: bool,

    /// Directory to open first
    #[arg(long)]
    path: Option<String>,

    /// Default directory for downloads
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => ConfigManager::with_path(config_path)?,
        None => ConfigManager::new()?,
    };
    let settings = config.settings_mut();
    if let Some(start_path) = cli.path.clone() {
        settings.start_path = start_path;
    }
    if let Some(download_dir) = cli.download_dir.clone() {
        settings.download_dir = Some(download_dir);
    }
    if let Some(log_level) = cli.log_level.clone() {
        settings.log_level = log_level;
    }
    let settings = config.settings().clone();

    init_tracing(&settings.log_level, &settings.log_dir())?;
    init_panic_hook();
    info!("Starting wander with config {}", config.config_path().display());

    let download_dir = std::path::absolute(settings.download_dir()?)?
        .to_string_lossy()
        .into_owned();

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(100);
    let (request_tx, request_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let timeout = settings.request_timeout();

    // ssh may prompt for credentials, so connect before the terminal goes raw.
    let (transport, start_path, backend) = if cli.local {
        let start = path::expand_tilde(&settings.start_path);
        let start = tokio::fs::canonicalize(&start)
            .await?
            .to_string_lossy()
            .into_owned();
        let local = LocalFileSystem::new();
        let backend = tokio::spawn(run_backend(
            local.clone(),
            local,
            request_rx,
            event_tx.clone(),
            timeout,
            cancel.clone(),
        ));
        (None, start, backend)
    } else {
        let host = cli
            .host
            .clone()
            .ok_or_else(|| AppError::ConfigError("No host given".to_string()))?;
        let transport =
            SshTransport::spawn(&settings.ssh_program, &settings.ssh_args, &host).await?;
        let browser = SftpBrowser::new(transport.session());
        let start = browser.canonicalize(&settings.start_path).await?;
        let backend = tokio::spawn(run_backend(
            browser.clone(),
            browser,
            request_rx,
            event_tx.clone(),
            timeout,
            cancel.clone(),
        ));
        (Some(transport), start, backend)
    };

    let mut app = App::new(EventChannel::new(request_tx), &start_path, download_dir)?;

    let mut terminal = match init_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_tui();
            return Err(e);
        }
    };
    let input = spawn_input_reader(event_tx, cancel.clone());

    app.start();
    let res = app.run(&mut terminal, &mut event_rx).await;

    if let Err(e) = restore_tui() {
        warn!("Failed to restore terminal: {}", e);
    }
    cancel.cancel();
    drop(event_rx);
    let _ = input.await;
    let _ = backend.await;
    if let Some(transport) = transport {
        if let Err(e) = transport.close().await {
            warn!("Failed to close transport: {}", e);
        }
    }

    if let Err(e) = &res {
        error!("Exited with error: {}", e);
    }
    res
}
