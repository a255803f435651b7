// Scan library import, matrix export

use std::path::Path;

use ringscan_recon::{load_library, Library, LibrarySchema, ReconciledMatrix};

use crate::error::IoError;

/// Load the scan library at `path`.
///
/// Without an explicit `delimiter` the header line decides: see
/// [`sniff_delimiter`].
pub fn load_library_file(
    path: &Path,
    schema: &LibrarySchema,
    delimiter: Option<u8>,
) -> Result<Library, IoError> {
    let content = read_library_text(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content, schema));
    log::debug!("{}: delimiter {:?}", path.display(), delimiter as char);
    Ok(load_library(&content, delimiter, schema)?)
}

const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Pick the delimiter under which the header names the most schema columns.
///
/// Value cells say little here: decimal commas and quoted `None,None`
/// substituents both look like separators. Header names do not. When no
/// candidate yields a single known column, the one splitting the header
/// into the most fields wins; ties keep the earlier candidate, comma first.
pub fn sniff_delimiter(content: &str, schema: &LibrarySchema) -> u8 {
    let Some(header) = content.lines().next() else {
        return b',';
    };
    let mut known: Vec<&str> = schema.value_columns();
    known.push(schema.substituent_a.as_str());
    known.push(schema.substituent_b.as_str());

    let (mut best, mut best_score) = (b',', (0usize, 0usize));
    for delimiter in CANDIDATES {
        let fields = header_fields(header, delimiter);
        let matched = fields.iter().filter(|f| known.contains(&f.as_str())).count();
        let score = (matched, fields.len());
        if score > best_score {
            (best, best_score) = (delimiter, score);
        }
    }
    best
}

fn header_fields(header: &str, delimiter: u8) -> Vec<String> {
    ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_reader(header.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map(|r| r.iter().map(|f| f.trim().to_string()).collect())
        .unwrap_or_default()
}

/// Read the library as text. A UTF-8 byte-order mark is dropped; bytes that
/// are not UTF-8 are decoded as Windows-1252, the usual spreadsheet export
/// encoding for `Å` in length headers.
pub fn read_library_text(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::io(path, e))?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }
    log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
    Ok(text.into_owned())
}

/// Write a reconciled matrix as a square table: header row of column keys,
/// one line per row in the matrix's display order.
pub fn write_matrix_csv(path: &Path, matrix: &ReconciledMatrix) -> Result<(), IoError> {
    let mut writer = ::csv::Writer::from_path(path).map_err(|e| IoError::Csv(e.to_string()))?;

    let mut header = vec![matrix.quantity().to_string()];
    header.extend(matrix.columns().iter().map(|c| c.id().to_string()));
    writer.write_record(&header).map_err(|e| IoError::Csv(e.to_string()))?;

    for row in matrix.rows() {
        let mut record = vec![row.id().to_string()];
        if let Some(values) = matrix.row_values(row) {
            record.extend(values.iter().map(|v| v.to_string()));
        }
        writer.write_record(&record).map_err(|e| IoError::Csv(e.to_string()))?;
    }

    writer.flush().map_err(|e| IoError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringscan_recon::{RowOrder, Substituent};
    use std::fs;
    use tempfile::tempdir;

    fn schema() -> LibrarySchema {
        LibrarySchema::default()
    }

    #[test]
    fn test_header_decides_over_decimal_commas() {
        // decimal commas in the values, semicolons in the header
        let content = ";Activation energy - bridge A;A ring substitution ID;B ring substitution ID\n\
                       0;6,1;None;None\n1;6,5;NO2_3;None\n";
        assert_eq!(sniff_delimiter(content, &schema()), b';');
    }

    #[test]
    fn test_tab_header() {
        let content = "\tA ring substitution ID\tB ring substitution ID\n0\tNone\tNone\n";
        assert_eq!(sniff_delimiter(content, &schema()), b'\t');
    }

    #[test]
    fn test_pipe_header_with_quoted_baseline() {
        let content = "a|b|A ring substitution ID\n0|1|\"None,None\"\n";
        assert_eq!(sniff_delimiter(content, &schema()), b'|');
    }

    #[test]
    fn test_unknown_header_falls_back_to_widest_split() {
        assert_eq!(sniff_delimiter("x;y;z\n1;2;3\n", &schema()), b';');
        assert_eq!(sniff_delimiter("x,y\n", &schema()), b',');
        assert_eq!(sniff_delimiter("", &schema()), b',');
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Ring A starting length [Å]" encoded as Windows-1252
        fs::write(&path, b"Ring A starting length [\xc5]\n").unwrap();
        assert_eq!(read_library_text(&path).unwrap(), "Ring A starting length [Å]\n");
    }

    #[test]
    fn test_utf8_bom_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{FEFF},A ring substitution ID\n").unwrap();
        assert_eq!(read_library_text(&path).unwrap(), ",A ring substitution ID\n");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_library_text(Path::new("/nonexistent/ScanLibrary.csv")).unwrap_err();
        assert!(err.to_string().contains("ScanLibrary.csv"));
    }

    #[test]
    fn test_load_semicolon_library() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ScanLibrary.csv");
        let schema = LibrarySchema::default();

        let columns = schema.value_columns();
        let header = format!(";{};A ring substitution ID;B ring substitution ID", columns.join(";"));
        let values = vec!["1.5"; columns.len()].join(";");
        let row = |index: usize, a: &str, b: &str| format!("{index};{values};{a};{b}");
        let content = [header, row(1, "NO2_3", "None"), row(0, "None", "None,None")].join("\n");
        fs::write(&path, content).unwrap();

        let library = load_library_file(&path, &schema, None).unwrap();
        assert_eq!(library.records.len(), 2);
        assert!(library.records[0].is_baseline());
        assert_eq!(library.records[1].value("Activation energy - bridge A"), Some(1.5));
    }

    #[test]
    fn test_write_matrix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        let m = ReconciledMatrix::from_dense(
            "Energy",
            vec![Substituent::Unsubstituted, Substituent::group("NO2_3")],
            vec![6.0, 7.25, 5.5, 8.0],
            RowOrder::Descending,
        )
        .unwrap();
        write_matrix_csv(&path, &m).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Energy,None,NO2_3\nNO2_3,5.5,8\nNone,6,7.25\n");
    }
}
