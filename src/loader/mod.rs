//! Local dataset loader: JSON exports or CSV sheets of raw API rows.

use crate::error::{RadarError, Result};
use crate::models::ApiEnvelope;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Locate `<stem>.json` or `<stem>.csv` inside `dir`, preferring JSON.
pub fn find_dataset(dir: &Path, stem: &str) -> Result<PathBuf> {
    ["json", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
        .ok_or_else(|| RadarError::MissingDataset {
            dataset: stem.to_string(),
            dir: dir.display().to_string(),
        })
}

/// Load raw rows from a `.json` or `.csv` file, chosen by extension.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let records = if is_csv {
        load_csv(path)?
    } else {
        load_json(path)?
    };

    info!("{:?}: {} rows loaded", path, records.len());
    Ok(records)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(path)?;
    let envelope: ApiEnvelope<T> = serde_json::from_str(&text)?;
    Ok(envelope.into_records())
}

/// Every cell is handed to serde as text; blank cells become null.
fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let object: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, cell)| {
                let cell = cell.trim();
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (key.to_string(), value)
            })
            .collect();

        match serde_json::from_value(Value::Object(object)) {
            Ok(row) => rows.push(row),
            Err(e) => debug!("Row {} in {:?} skipped: {}", i + 1, path, e),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawFundingRecord, RawParityRecord, RawValue};
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crypto_radar_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_json_wrapped() {
        let dir = scratch_dir("json");
        let path = dir.join("funding.json");
        fs::write(&path, r#"{"data":[{"Name":"Acme","Date":"$5m","Amount Raised":"01 Jan 2025"}]}"#).unwrap();

        let rows: Vec<RawFundingRecord> = load_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, Some(RawValue::text("$5m")));
        assert_eq!(find_dataset(&dir, "funding").unwrap(), path);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_csv_cells_as_text() {
        let dir = scratch_dir("csv");
        let path = dir.join("parity.csv");
        fs::write(&path, "ticker,name,binance,okx\nABC,Abc,true,\nXYZ,Xyz,0,yes\n").unwrap();

        let rows: Vec<RawParityRecord> = load_records(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, Some(RawValue::text("ABC")));
        assert_eq!(rows[0].presence.get("okx"), Some(&None));
        assert_eq!(rows[1].presence.get("okx"), Some(&Some(RawValue::text("yes"))));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_dataset() {
        let dir = scratch_dir("missing");
        let err = find_dataset(&dir, "listings").unwrap_err();
        assert!(matches!(err, RadarError::MissingDataset { .. }));
        fs::remove_dir_all(dir).ok();
    }
}
