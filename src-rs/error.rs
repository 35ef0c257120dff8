use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChroniclerError>;

#[derive(Debug, Error)]
pub enum ChroniclerError {
    #[error("cannot find token file: {}", .path.display())]
    TokenMissing { path: PathBuf },

    #[error(
        "cannot read token file: {} ({source}). Forgot sudo? If that's not it, then \
         `sudo chown root {}` it and `sudo chmod ug-rwx {}` immediately",
        .path.display(),
        .path.display(),
        .path.display()
    )]
    TokenUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("token file is empty: {}", .path.display())]
    TokenEmpty { path: PathBuf },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("store {} must hold a JSON object at {at}", .path.display())]
    StoreShape { path: PathBuf, at: String },
}

impl ChroniclerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Short stable name used in collector diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenMissing { .. } => "token_missing",
            Self::TokenUnreadable { .. } => "token_unreadable",
            Self::TokenEmpty { .. } => "token_empty",
            Self::Http(_) => "http_error",
            Self::InvalidHeader(_) => "invalid_header",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Decode(_) => "decode_error",
            Self::StoreShape { .. } => "store_shape",
        }
    }
}
