use crate::error::{PipelineError, Result};
use crate::types::RawTable;
use csv::ReaderBuilder;
use log::{debug, info};
use serde_json::Value as JsonValue;
use std::path::Path;

/// Load a raw table from disk, dispatching on the file extension.
///
/// * `.csv`  – header row followed by data rows
/// * `.json` – `[{ "Region": "North", "Trainees": 12, ... }, ...]`, the shape
///   a spreadsheet "get all records" export produces
pub fn load_file(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path)?;
    load_bytes(path, &bytes)
}

/// Parse already-read file contents; `path` only selects the format.
pub fn load_bytes(path: &Path, bytes: &[u8]) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => parse_csv(bytes)?,
        "json" => parse_json_records(bytes)?,
        other => return Err(PipelineError::UnsupportedFormat(other.to_string())),
    };
    info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

pub fn parse_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut ragged = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.len() != headers.len() {
            ragged += 1;
        }
        // Extra trailing cells have no header to hang off.
        rows.push(record.iter().take(headers.len()).map(str::to_string).collect());
    }
    if ragged > 0 {
        debug!("{} CSV rows had a different cell count than the header", ragged);
    }
    Ok(RawTable::new(normalize_headers(headers), rows))
}

pub fn parse_json_records(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root.as_array().ok_or_else(|| {
        PipelineError::InvalidJsonRecords("expected a top-level array".to_string())
    })?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            PipelineError::InvalidJsonRecords(format!("row {} is not an object", i))
        })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::new(normalize_sheet_headers(headers), rows))
}

fn json_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trim surrounding whitespace from every column name.
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    headers.into_iter().map(|h| h.trim().to_string()).collect()
}

/// Spreadsheet exports get snake_case-ish names: trimmed, spaces to `_`,
/// lowercased.
pub fn normalize_sheet_headers(headers: Vec<String>) -> Vec<String> {
    headers
        .into_iter()
        .map(|h| h.trim().replace(' ', "_").to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_parse_csv_trims_headers_and_pads_rows() {
        let data = b" Region ,Course,Trainees\nNorth,Welding,12\nSouth,Tailoring\n";
        let t = parse_csv(data).unwrap();
        assert_eq!(t.headers, vec!["Region", "Course", "Trainees"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[1], vec!["South", "Tailoring", ""]);
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        let t = parse_csv(b"Region,Trainees\n").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.headers.len(), 2);
    }

    #[test]
    fn test_parse_json_records() {
        let data = br#"[
            {"Region": "North", "Total Trainees": 12, "Active": true},
            {"Region": "South", "Total Trainees": null, "Course Name": "Welding"}
        ]"#;
        let t = parse_json_records(data).unwrap();
        assert_eq!(
            t.headers,
            vec!["region", "total_trainees", "active", "course_name"]
        );
        assert_eq!(t.rows[0], vec!["North", "12", "true", ""]);
        assert_eq!(t.rows[1], vec!["South", "", "", "Welding"]);
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        let err = parse_json_records(br#"{"Region": "North"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidJsonRecords(_)));
    }

    #[test]
    fn test_load_file_dispatches_on_extension() {
        let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "Region,Trainees").unwrap();
        writeln!(f, "East,3").unwrap();
        let t = load_file(f.path()).unwrap();
        assert_eq!(t.rows, vec![vec!["East".to_string(), "3".to_string()]]);

        let other = Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            load_file(other.path()),
            Err(PipelineError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }
}
