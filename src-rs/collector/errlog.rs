use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ChroniclerError, Result};

/// Flat append-only text file, one diagnostic per line.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| ChroniclerError::io(&self.path, err))?;
        writeln!(file, "{}", message.trim_end()).map_err(|err| ChroniclerError::io(&self.path, err))
    }
}
