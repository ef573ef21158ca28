use crate::core::models::transition::{
    ProbabilitySpec, TransitionError, TransitionRecord, TransitionTable,
};
use nalgebra::Vector3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid transition on data row {row} of '{path}': {source}")]
    Record {
        path: String,
        row: usize,
        source: TransitionError,
    },
    #[error("Invalid transition table '{path}': {source}")]
    Table {
        path: String,
        source: TransitionError,
    },
}

#[derive(Debug, Deserialize)]
struct RawTransitionRow {
    start: String,
    next: String,
    probability: String,
    dx: f64,
    dy: f64,
    dz: f64,
}

/// Reads a transition table from CSV with the header
/// `start,next,probability,dx,dy,dz`.
///
/// # Errors
///
/// Returns `TransitionLoadError::Csv` on I/O or schema errors,
/// `TransitionLoadError::Record` when a probability specification cannot be
/// parsed, and `TransitionLoadError::Table` for an empty table.
pub fn read_csv(path: &Path) -> Result<TransitionTable, TransitionLoadError> {
    let path_str = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| TransitionLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<RawTransitionRow>().enumerate() {
        let row = result.map_err(|e| TransitionLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let probability: ProbabilitySpec =
            row.probability
                .parse()
                .map_err(|e| TransitionLoadError::Record {
                    path: path_str.clone(),
                    row: i + 1,
                    source: e,
                })?;
        records.push(TransitionRecord::new(
            &row.start,
            &row.next,
            probability,
            Vector3::new(row.dx, row.dy, row.dz),
        ));
    }

    TransitionTable::new(records).map_err(|e| TransitionLoadError::Table {
        path: path_str,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::transition::Bound;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_csv_parses_records_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(
            &path,
            "start,next,probability,dx,dy,dz\n\
             # intralayer stacking\n\
             A,B,1-P,0.0,0.0,0.0\n\
             A,F,P,0.333,0.667,0.0\n\
             B,A,1,0,0,0\n",
        )
        .unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.records().len(), 3);
        assert_eq!(table.initial_layer(), "A");
        assert_eq!(
            table.records()[0].probability,
            ProbabilitySpec::BoundedRange(Bound::Value(1.0), Bound::Placeholder)
        );
        assert_eq!(table.records()[1].next, "F");
        assert!((table.records()[1].displacement.y - 0.667).abs() < 1e-12);
        assert_eq!(table.records()[2].probability, ProbabilitySpec::Literal(1.0));
    }

    #[test]
    fn read_csv_reports_row_of_malformed_probability() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(
            &path,
            "start,next,probability,dx,dy,dz\nA,B,1,0,0,0\nB,A,often,0,0,0\n",
        )
        .unwrap();
        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, TransitionLoadError::Record { row: 2, .. }));
    }

    #[test]
    fn read_csv_rejects_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, "start,next,probability,dx,dy,dz\n").unwrap();
        assert!(matches!(
            read_csv(&path),
            Err(TransitionLoadError::Table {
                source: TransitionError::EmptyTable,
                ..
            })
        ));
    }
}
