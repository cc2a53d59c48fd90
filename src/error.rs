use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Nothing selected")]
    EmptyListing,

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Malformed path: {0}")]
    MalformedPath(String),

    #[error("Busy: {0}")]
    RequestInFlight(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Channel closed: {0}")]
    ChannelClosedError(String),

    #[error("Russh Sftp error: {0}")]
    RusshSftpError(#[from] russh_sftp::client::error::Error),
}

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;
