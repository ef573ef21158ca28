use crate::core::io::cif::{CifError, CifWriter};
use crate::core::io::records::AtomicStructure;
use crate::core::io::table::TableError;
use crate::core::io::traits::StructureWriter;
use crate::core::models::error::ModelError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Cannot create output directory '{path}': {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("Structure '{name}' cannot be exported: {source}")]
    Record { name: String, source: ModelError },
    #[error("Failed to write CIF '{path}': {source}")]
    Cif { path: String, source: CifError },
    #[error(transparent)]
    Table(#[from] TableError),
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(|e| OutputError::CreateDir {
        path: dir.to_string_lossy().to_string(),
        source: e,
    })
}

/// Writes `structure` as `<dir>/<name>.cif` and returns the path.
pub fn write_structure(structure: &impl AtomicStructure, dir: &Path) -> Result<PathBuf, OutputError> {
    ensure_dir(dir)?;
    let record = structure.to_record().map_err(|e| OutputError::Record {
        name: structure.name().to_string(),
        source: e,
    })?;
    let path = dir.join(format!("{}.cif", structure.name()));
    CifWriter::write_to_path(&record, &path).map_err(|e| OutputError::Cif {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), atoms = record.atoms.len(), "Structure written.");
    Ok(path)
}
