use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::error::{ChroniclerError, Result};

/// Bearer token held in memory for the lifetime of the process.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Debug)]
pub struct LoadedToken {
    pub token: Token,
    /// Whitespace was trimmed off the file contents.
    pub stripped: bool,
}

pub fn load_token(path: &Path) -> Result<LoadedToken> {
    if !path.is_file() {
        return Err(ChroniclerError::TokenMissing {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ChroniclerError::TokenMissing {
            path: path.to_path_buf(),
        },
        _ => ChroniclerError::TokenUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChroniclerError::TokenEmpty {
            path: path.to_path_buf(),
        });
    }

    let stripped = trimmed.len() != raw.len();
    if stripped {
        warn!(path = %path.display(), "whitespace stripped from token file");
    }

    Ok(LoadedToken {
        token: Token::new(trimmed),
        stripped,
    })
}
