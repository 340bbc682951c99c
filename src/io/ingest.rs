//! Catalog loading.
//!
//! Both inputs are Space-Track JSON exports: a top-level array of flat objects.
//! Any failure here (missing file, malformed JSON, wrong shape) is fatal to the
//! run; individual odd values inside a well-formed record are left for the
//! resolver to judge.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{CatalogEntry, ConjunctionRecord};
use crate::error::AppError;

/// Load the conjunction catalog (`cdm_public`).
pub fn load_conjunctions(path: &Path) -> Result<Vec<ConjunctionRecord>, AppError> {
    let records: Vec<ConjunctionRecord> = read_json_array(path, "conjunction catalog")?;
    log::info!("Loaded {} conjunction records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the element catalog (`gp`).
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, AppError> {
    let entries: Vec<CatalogEntry> = read_json_array(path, "element catalog")?;
    log::info!("Loaded {} element sets from {}", entries.len(), path.display());
    Ok(entries)
}

fn read_json_array<T: DeserializeOwned>(path: &Path, label: &str) -> Result<Vec<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open {label} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::io(format!("Invalid {label} JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObjectId;
    use crate::error::EXIT_IO;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_catalog_entries() {
        let file = file_with(
            r#"[
                {"NORAD_CAT_ID": "25544", "OBJECT_NAME": "ISS (ZARYA)", "TLE_LINE1": "1 ...", "TLE_LINE2": "2 ...", "EPOCH": "2024-03-01"},
                {"NORAD_CAT_ID": 43013, "TLE_LINE1": "1 x", "TLE_LINE2": "2 x"}
            ]"#,
        );
        let entries = load_catalog(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, Some(ObjectId::new("25544")));
        assert_eq!(entries[0].elements.line1, "1 ...");
        assert_eq!(entries[1].name, None);
    }

    #[test]
    fn loads_conjunctions_in_file_order() {
        let file = file_with(
            r#"[
                {"CDM_ID": "1", "PC": "0.001", "SAT_1_ID": "1", "SAT_2_ID": "2", "TCA": "2024-01-01T00:00:00"},
                {"CDM_ID": "2", "MIN_RNG": 12.5}
            ]"#,
        );
        let records = load_conjunctions(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cdm_id.as_deref(), Some("1"));
        assert_eq!(records[1].min_rng, Some(12.5));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_conjunctions(Path::new("/definitely/not/here/cdm_public.json")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO);
        assert!(err.message().contains("conjunction catalog"));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let file = file_with(r#"{"not": "an array"}"#);
        let err = load_catalog(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO);
        assert!(err.message().starts_with("Invalid element catalog JSON"));
    }
}
