use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{ChroniclerError, Result};
use crate::jsonfile::{read_json, write_json};

pub const STORE_INDENT: usize = 2;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// JSON file shaped `{ url: { timestamp: body } }`.
///
/// Every `record` reads the whole file and writes it back. With a `keep`
/// bound the oldest timestamps of a URL are dropped once it holds more.
pub struct SampleStore {
    path: PathBuf,
    keep: Option<usize>,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>, keep: Option<usize>) -> Self {
        Self {
            path: path.into(),
            keep: keep.filter(|n| *n > 0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        write_json(&self.path, &Value::Object(Map::new()), Some(4))
    }

    /// Stores `body` under `[url][timestamp]`, overwriting an equal key.
    /// Returns how many samples the URL holds afterwards.
    pub fn record(&self, url: &str, timestamp: &str, body: Value) -> Result<usize> {
        self.ensure_exists()?;
        let mut data = read_json(&self.path)?;

        let root = data.as_object_mut().ok_or_else(|| self.shape_error("root"))?;
        let series = root
            .entry(url.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| self.shape_error(url))?;

        series.insert(timestamp.to_string(), body);
        if let Some(keep) = self.keep {
            while series.len() > keep {
                let oldest = match series.keys().next() {
                    Some(key) => key.clone(),
                    None => break,
                };
                series.remove(&oldest);
            }
        }
        let held = series.len();

        write_json(&self.path, &data, Some(STORE_INDENT))?;
        Ok(held)
    }

    pub fn samples(&self, url: &str) -> Result<Map<String, Value>> {
        let data = read_json(&self.path)?;
        match data.get(url) {
            Some(Value::Object(series)) => Ok(series.clone()),
            Some(_) => Err(self.shape_error(url)),
            None => Ok(Map::new()),
        }
    }

    fn shape_error(&self, at: &str) -> ChroniclerError {
        ChroniclerError::StoreShape {
            path: self.path.clone(),
            at: at.to_string(),
        }
    }
}
