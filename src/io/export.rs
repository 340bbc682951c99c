//! Export output records to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or GIS tools that do
//! not read nested JSON.

use std::path::Path;

use crate::domain::OutputRecord;
use crate::error::AppError;

const HEADER: [&str; 13] = [
    "cdm_id",
    "tca",
    "longitude",
    "latitude",
    "altitude_km",
    "rso1_id",
    "rso1_name",
    "rso1_type",
    "rso2_id",
    "rso2_name",
    "rso2_type",
    "pc",
    "min_rng_km",
];

/// Write one CSV row per output record.
pub fn write_records_csv(path: &Path, records: &[OutputRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        writer
            .write_record([
                opt(&r.cdm_id),
                r.tca.clone(),
                format!("{:.6}", r.position.longitude),
                format!("{:.6}", r.position.latitude),
                format!("{:.3}", r.position.altitude),
                r.rso1_id.clone(),
                opt(&r.rso1_name),
                opt(&r.rso1_type),
                r.rso2_id.clone(),
                opt(&r.rso2_name),
                opt(&r.rso2_type),
                opt(&r.pc),
                r.md.map(|v| v.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}
