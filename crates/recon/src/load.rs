use std::collections::HashMap;

use crate::config::LibrarySchema;
use crate::error::ReconError;
use crate::model::{Library, RejectedRecord, ScanRecord, Substituent};

/// Load scan-library CSV text into records, addressing every field by name.
///
/// The header is validated against the schema before any row is read:
/// a missing column is fatal. Individual rows with unusable substituent
/// identifiers or non-numeric values are logged and returned in
/// `Library::rejected` instead of aborting the load. Records come back in
/// ascending row-index order.
pub fn load_library(
    csv_data: &str,
    delimiter: u8,
    schema: &LibrarySchema,
) -> Result<Library, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers
            .iter()
            .position(|h| h == name.trim())
            .ok_or_else(|| ReconError::MissingColumn { column: name.into() })
    };

    let index_idx = match schema.index_column {
        Some(ref name) => idx(name)?,
        None => 0,
    };
    let sub_a_idx = idx(&schema.substituent_a)?;
    let sub_b_idx = idx(&schema.substituent_b)?;
    let value_idx: Vec<(&str, usize)> = schema
        .value_columns()
        .into_iter()
        .map(|name| idx(name).map(|i| (name, i)))
        .collect::<Result<_, _>>()?;

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Csv(e.to_string()))?;
        let index = match record.get(index_idx).map(str::trim) {
            Some(i) if !i.is_empty() => i.to_string(),
            // header is line 1
            _ => format!("line {}", line + 2),
        };

        match parse_record(&record, index.clone(), sub_a_idx, sub_b_idx, &value_idx) {
            Ok(r) => records.push(r),
            Err(reason) => {
                let err = ReconError::MalformedRecord { index: index.clone(), reason: reason.clone() };
                log::warn!("skipping {err}");
                rejected.push(RejectedRecord { index, reason });
            }
        }
    }

    records.sort_by_cached_key(|r| index_sort_key(&r.index));

    log::debug!(
        "loaded {} records ({} rejected), {} value columns",
        records.len(),
        rejected.len(),
        value_idx.len()
    );

    Ok(Library { records, rejected })
}

fn parse_record(
    record: &csv::StringRecord,
    index: String,
    sub_a_idx: usize,
    sub_b_idx: usize,
    value_idx: &[(&str, usize)],
) -> Result<ScanRecord, String> {
    let ring_a = Substituent::parse(record.get(sub_a_idx).unwrap_or(""))
        .map_err(|e| format!("ring A: {e}"))?;
    let ring_b = Substituent::parse(record.get(sub_b_idx).unwrap_or(""))
        .map_err(|e| format!("ring B: {e}"))?;

    let mut values = HashMap::with_capacity(value_idx.len());
    for &(name, i) in value_idx {
        let raw = record.get(i).unwrap_or("");
        let value = parse_value(raw).map_err(|e| format!("column '{name}': {e}"))?;
        values.insert(name.to_string(), value);
    }

    Ok(ScanRecord { index, ring_a, ring_b, values })
}

/// Empty and NaN cells are missing. Anything else must parse to a finite
/// number; infinities are rejected with the rest of the row.
fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Err(format!("'{trimmed}' is not a finite number")),
        Err(_) => Err(format!("cannot parse '{trimmed}' as a number")),
    }
}

/// Numeric indices sort numerically; anything else sorts after them as text.
fn index_sort_key(index: &str) -> (bool, i64, String) {
    match index.parse::<i64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, index.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChargeColumns, ChargeSchema, QuantitySpec};

    fn small_schema() -> LibrarySchema {
        let charges = |ring: &str| ChargeColumns {
            c1: format!("{ring}1"),
            c2: format!("{ring}2"),
            c3: format!("{ring}3"),
            c4: format!("{ring}4"),
            c5: format!("{ring}5"),
            c6: format!("{ring}6"),
            c_nr: format!("{ring}NR"),
            n: format!("{ring}N"),
            o: format!("{ring}O"),
        };
        LibrarySchema {
            index_column: None,
            substituent_a: "SubA".into(),
            substituent_b: "SubB".into(),
            quantities: vec![QuantitySpec::new("e", "Energy", "EA", "EB")],
            charges: ChargeSchema { ring_a: charges("a"), ring_b: charges("b") },
        }
    }

    fn header() -> String {
        let charge_cols: Vec<String> = ["a", "b"]
            .iter()
            .flat_map(|r| {
                ["1", "2", "3", "4", "5", "6", "NR", "N", "O"]
                    .iter()
                    .map(move |d| format!("{r}{d}"))
            })
            .collect();
        format!(",EA,EB,{},SubA,SubB", charge_cols.join(","))
    }

    fn row(index: &str, ea: &str, eb: &str, sub_a: &str, sub_b: &str) -> String {
        format!("{index},{ea},{eb},{},{sub_a},{sub_b}", vec!["0.1"; 18].join(","))
    }

    #[test]
    fn load_sorted_by_index() {
        let csv = [
            header(),
            row("2", "7.0", "", "NO2_3", "None"),
            row("0", "6.0", "6.0", "None", "\"None,None\""),
            row("10", "", "5.5", "None", "NO2_3"),
        ]
        .join("\n");
        let lib = load_library(&csv, b',', &small_schema()).unwrap();
        assert_eq!(lib.records.len(), 3);
        let order: Vec<&str> = lib.records.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(order, ["0", "2", "10"]);
        assert!(lib.records[0].is_baseline());
        assert_eq!(lib.records[1].value("EA"), Some(7.0));
        assert_eq!(lib.records[1].value("EB"), None);
        assert!(lib.has_baseline());
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = ",EA,SubA,SubB\n0,1.0,None,None\n";
        let err = load_library(csv, b',', &small_schema()).unwrap_err();
        assert_eq!(err, ReconError::MissingColumn { column: "EB".into() });
    }

    #[test]
    fn reordered_columns_load_identically() {
        let forward = [header(), row("0", "6.0", "6.5", "None", "None")].join("\n");
        let lib_forward = load_library(&forward, b',', &small_schema()).unwrap();

        // Same data with EA/EB swapped in the header *and* the row.
        let swapped = forward.replacen(",EA,EB,", ",EB,EA,", 1).replacen("0,6.0,6.5,", "0,6.5,6.0,", 1);
        let lib_swapped = load_library(&swapped, b',', &small_schema()).unwrap();

        assert_eq!(lib_forward.records[0].values, lib_swapped.records[0].values);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let csv = [
            header(),
            row("0", "6.0", "6.0", "None", "None"),
            row("1", "abc", "6.0", "NO2_3", "None"),
            row("2", "6.0", "6.0", "none", "None"),
            row("3", "6.0", "6.0", "", "None"),
        ]
        .join("\n");
        let lib = load_library(&csv, b',', &small_schema()).unwrap();
        assert_eq!(lib.records.len(), 1);
        assert_eq!(lib.rejected.len(), 3);
        assert_eq!(lib.rejected[0].index, "1");
        assert!(lib.rejected[0].reason.contains("'EA'"));
        assert!(lib.rejected[1].reason.contains("non-canonical"));
    }

    #[test]
    fn nan_is_missing() {
        assert_eq!(parse_value("NaN").unwrap(), None);
        assert_eq!(parse_value(" ").unwrap(), None);
        assert_eq!(parse_value("4").unwrap(), Some(4.0));
        assert!(parse_value("n/a").is_err());
    }

    #[test]
    fn infinite_values_reject_the_row() {
        assert!(parse_value("inf").is_err());
        assert!(parse_value("-Infinity").is_err());
        assert!(parse_value("1e999").is_err());

        let csv = [
            header(),
            row("0", "6.0", "6.0", "None", "None"),
            row("1", "inf", "6.0", "NO2_3", "None"),
            row("2", "6.5", "-infinity", "Cl_2", "None"),
        ]
        .join("\n");
        let lib = load_library(&csv, b',', &small_schema()).unwrap();
        assert_eq!(lib.records.len(), 1);
        let rejected: Vec<&str> = lib.rejected.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(rejected, ["1", "2"]);
        assert!(lib.rejected[0].reason.contains("column 'EA'"));
        assert!(lib.rejected[1].reason.contains("not a finite number"));
    }
}
