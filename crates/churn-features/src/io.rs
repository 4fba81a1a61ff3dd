//! JSON-lines input and output.

use crate::cleaner::empty_events;
use crate::error::{PipelineError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a newline-delimited JSON event log.
///
/// The whole file is scanned for schema inference. A file with no records
/// yields an empty frame with the event schema.
pub fn read_events(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading data from {}...", path.display());

    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).context(format!("Reading {}", path.display()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("{} contains no records", path.display());
        return Ok(empty_events());
    }

    let df = JsonReader::new(Cursor::new(bytes))
        .with_json_format(JsonFormat::JsonLines)
        .infer_schema_len(None)
        .finish()
        .context(format!("Parsing JSON lines from {}", path.display()))?;

    info!("Data loaded: {} rows.", df.height());
    Ok(df)
}

/// Write a frame as newline-delimited JSON, one object per row.
///
/// The frame is written to a temporary sibling file first and renamed into
/// place, so a failed write never leaves a partial file at `path`.
pub fn write_features(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let partial = partial_path(path);
    if let Err(e) = write_json_lines(df, &partial) {
        fs::remove_file(&partial).ok();
        return Err(e.with_context(format!("Writing {}", path.display())));
    }
    fs::rename(&partial, path).context(format!("Moving output to {}", path.display()))?;

    info!("Saved {} rows to {}", df.height(), path.display());
    Ok(())
}

fn write_json_lines(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    JsonWriter::new(&mut file)
        .with_json_format(JsonFormat::JsonLines)
        .finish(df)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
