// Statistical summary CSVs

use std::path::Path;

use ringscan_recon::SummaryRecord;

use crate::error::IoError;

/// Write one summary CSV: distal (row) records, then proximal (column) records.
///
/// `mean_header` names the mean column (`Mean activation energy [kcal/mol]`,
/// `Charge on N`, ...). Values are written at full precision; a missing
/// standard deviation is an empty cell.
pub fn write_summary_csv(
    path: &Path,
    mean_header: &str,
    distal: &[SummaryRecord],
    proximal: &[SummaryRecord],
) -> Result<(), IoError> {
    let mut writer = ::csv::Writer::from_path(path).map_err(|e| IoError::Csv(e.to_string()))?;

    writer
        .write_record([
            "Substituent",
            mean_header,
            "Standard deviation",
            "Minimal value",
            "Maximal Value",
            "header_title",
        ])
        .map_err(|e| IoError::Csv(e.to_string()))?;

    for record in distal.iter().chain(proximal) {
        writer
            .write_record([
                record.substituent.id().to_string(),
                record.mean.to_string(),
                record.std_dev.map(|s| s.to_string()).unwrap_or_default(),
                record.min.to_string(),
                record.max.to_string(),
                record.effect.to_string(),
            ])
            .map_err(|e| IoError::Csv(e.to_string()))?;
    }

    writer.flush().map_err(|e| IoError::io(path, e))?;
    log::debug!("{}: {} summary rows", path.display(), distal.len() + proximal.len());
    Ok(())
}
