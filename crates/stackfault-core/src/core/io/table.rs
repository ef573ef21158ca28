use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("I/O error while writing table: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the batch metadata table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "S_x")]
    pub s_x: f64,
    #[serde(rename = "S_y")]
    pub s_y: f64,
    #[serde(rename = "S_z")]
    pub s_z: f64,
    #[serde(rename = "P")]
    pub probability: f64,
    /// Display rendering of the stacking vector, e.g. `[0.25, 0, 0]`.
    #[serde(rename = "Vector")]
    pub vector_label: String,
    /// Display rendering of the probability, e.g. `10%`.
    #[serde(rename = "Probability")]
    pub probability_label: String,
}

/// Writes rows as comma-delimited text with a header line.
pub fn write_rows(rows: &[ModelRow], writer: impl Write) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_rows_to_path(rows: &[ModelRow], path: &Path) -> Result<(), TableError> {
    let file = std::fs::File::create(path)?;
    write_rows(rows, file).map_err(|e| TableError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
