use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::error::{ChroniclerError, Result};

pub fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).map_err(|err| ChroniclerError::io(path, err))?;
    serde_json::from_str(&data).map_err(|err| ChroniclerError::json(path, err))
}

/// Overwrites `path` with the whole of `value`. The bytes land in a sibling
/// temp file first and are renamed over the target. A symlinked `path` keeps
/// its link; the file it points at is the one replaced.
pub fn write_json(path: &Path, value: &Value, indent: Option<usize>) -> Result<()> {
    let serialized = match indent {
        Some(width) => to_string_indented(value, width),
        None => serde_json::to_string(value),
    }
    .map_err(|err| ChroniclerError::json(path, err))?;

    let target = resolve_link(path);
    let staging = staging_path(&target);
    fs::write(&staging, serialized).map_err(|err| ChroniclerError::io(path, err))?;
    fs::rename(&staging, &target).map_err(|err| {
        let _ = fs::remove_file(&staging);
        ChroniclerError::io(path, err)
    })
}

pub fn to_string_indented<T: Serialize + ?Sized>(
    value: &T,
    indent: usize,
) -> serde_json::Result<String> {
    let pad = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(pad.as_bytes()));
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn resolve_link(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
