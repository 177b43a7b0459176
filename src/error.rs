use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Exchange Errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Exchange API error: status={status}, message={message}")]
    Api {
        status: String,
        message: String,
    },

    #[error("Response decode failed: {0}")]
    DecodeError(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    // Pipeline Errors
    #[error("Symbol universe unavailable: {0}")]
    UniverseError(String),

    #[error("No valid symbols left after validation")]
    EmptyUniverse,

    #[error("Concurrency gate closed")]
    GateClosed,

    #[error("Snapshot write failed: {0}")]
    SnapshotError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_decode() {
            Error::DecodeError(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
