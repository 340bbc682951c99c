//! The output artifact: a JSON array of [`OutputRecord`]s.
//!
//! Written once per run. The file is staged next to its destination and renamed
//! into place, so a reader never sees a half-written artifact and an earlier
//! artifact is replaced only by a complete one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::OutputRecord;
use crate::error::AppError;

/// Write the artifact, replacing any previous one.
pub fn write_artifact(path: &Path, records: &[OutputRecord], pretty: bool) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create output directory '{}': {e}", parent.display())))?;
    }

    let staging = staging_path(path);
    let file = File::create(&staging)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", staging.display())))?;
    let mut writer = BufWriter::new(file);

    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, records)
    } else {
        serde_json::to_writer(&mut writer, records)
    };
    written.map_err(|e| AppError::io(format!("Failed to serialize output artifact: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", staging.display())))?;
    drop(writer);

    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        AppError::io(format!("Failed to move artifact into place at '{}': {e}", path.display()))
    })?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Read a previously written artifact.
pub fn read_artifact(path: &Path) -> Result<Vec<OutputRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open artifact '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::io(format!("Invalid artifact JSON '{}': {e}", path.display())))
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{name}.partial"))
}
