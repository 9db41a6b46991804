//! CSV persistence of the sample table.
//!
//! The artifact has a header row with the seven record columns and one
//! row per record, in table order.

use super::LoadError;
use crate::models::Record;
use std::fs;
use std::path::Path;

/// Write the sample table, creating the parent directory if needed.
pub fn write_sample(path: &Path, records: &[Record]) -> Result<(), LoadError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a sample table previously written by [`write_sample`].
pub fn read_sample(path: &Path) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<Record>, _>>()?;
    Ok(records)
}
