use crate::core::models::error::ModelError;
use crate::core::models::lattice::Lattice;
use crate::core::models::unitcell::{Unitcell, UnitcellBuilder};
use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UnitcellLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid unit cell in '{path}': {source}")]
    Model { path: String, source: ModelError },
    #[error("Unsupported unit cell format for '{0}' (expected .toml or .csv)")]
    UnsupportedFormat(String),
    #[error("A lattice is required to read the CSV unit cell '{0}'")]
    MissingLattice(String),
}

fn default_occupancy() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAtom {
    label: String,
    element: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default = "default_occupancy")]
    occupancy: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLayer {
    name: String,
    #[serde(default)]
    atoms: Vec<RawAtom>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnitcellFile {
    name: String,
    lattice: Lattice,
    layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
struct CsvAtomRow {
    layer: String,
    label: String,
    element: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default = "default_occupancy")]
    occupancy: f64,
}

/// On-disk representations a unit cell can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitcellFormat {
    Toml,
    Csv,
}

impl FromStr for UnitcellFormat {
    type Err = UnitcellLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "csv" => Ok(Self::Csv),
            other => Err(UnitcellLoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl UnitcellFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Some(Self::Toml),
            Some("csv") => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Reads a unit cell from a TOML file carrying its own name and lattice.
///
/// # Errors
///
/// Returns `UnitcellLoadError::Io` if the file cannot be read,
/// `UnitcellLoadError::Toml` on a syntax or schema error, and
/// `UnitcellLoadError::Model` if the described cell is invalid.
pub fn read_toml(path: &Path) -> Result<Unitcell, UnitcellLoadError> {
    let path_str = path.to_string_lossy().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| UnitcellLoadError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    let unitcell = parse_toml(&content).map_err(|e| match e {
        ParseFailure::Toml(source) => UnitcellLoadError::Toml {
            path: path_str.clone(),
            source,
        },
        ParseFailure::Model(source) => UnitcellLoadError::Model {
            path: path_str.clone(),
            source,
        },
    })?;
    debug!(
        "Loaded unit cell '{}' with {} layer(s) from {}",
        unitcell.name(),
        unitcell.layers().len(),
        path_str
    );
    Ok(unitcell)
}

enum ParseFailure {
    Toml(toml::de::Error),
    Model(ModelError),
}

fn parse_toml(content: &str) -> Result<Unitcell, ParseFailure> {
    let raw: RawUnitcellFile = toml::from_str(content).map_err(ParseFailure::Toml)?;
    let mut builder = UnitcellBuilder::new(&raw.name, raw.lattice);
    for layer in raw.layers {
        builder.start_layer(&layer.name);
        for atom in layer.atoms {
            builder
                .add_atom(
                    &layer.name,
                    &atom.label,
                    &atom.element,
                    Point3::new(atom.x, atom.y, atom.z),
                    atom.occupancy,
                )
                .map_err(ParseFailure::Model)?;
        }
    }
    builder.build().map_err(ParseFailure::Model)
}

/// Reads a unit cell from a CSV atom table with the header
/// `layer,label,element,x,y,z[,occupancy]`.
///
/// Layers are created in the order they first appear.
///
/// # Errors
///
/// Returns `UnitcellLoadError::Csv` on malformed rows and
/// `UnitcellLoadError::Model` if the described cell is invalid.
pub fn read_csv(path: &Path, name: &str, lattice: Lattice) -> Result<Unitcell, UnitcellLoadError> {
    let path_str = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| UnitcellLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

    let mut builder = UnitcellBuilder::new(name, lattice);
    for result in reader.deserialize::<CsvAtomRow>() {
        let row = result.map_err(|e| UnitcellLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        builder
            .add_atom(
                &row.layer,
                &row.label,
                &row.element,
                Point3::new(row.x, row.y, row.z),
                row.occupancy,
            )
            .map_err(|e| UnitcellLoadError::Model {
                path: path_str.clone(),
                source: e,
            })?;
    }
    builder.build().map_err(|e| UnitcellLoadError::Model {
        path: path_str,
        source: e,
    })
}

/// Reads a unit cell, choosing the format from the file extension.
///
/// CSV files carry no lattice, so `csv_lattice` must be supplied for them;
/// the cell is then named after the file stem.
pub fn read_path(path: &Path, csv_lattice: Option<Lattice>) -> Result<Unitcell, UnitcellLoadError> {
    let format = UnitcellFormat::from_path(path)
        .ok_or_else(|| UnitcellLoadError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    read_as(path, format, csv_lattice)
}

/// Reads `path` as `format` regardless of its extension. A CSV cell is named
/// after the file stem.
pub fn read_as(
    path: &Path,
    format: UnitcellFormat,
    csv_lattice: Option<Lattice>,
) -> Result<Unitcell, UnitcellLoadError> {
    match format {
        UnitcellFormat::Toml => read_toml(path),
        UnitcellFormat::Csv => {
            let lattice = csv_lattice.ok_or_else(|| {
                UnitcellLoadError::MissingLattice(path.to_string_lossy().to_string())
            })?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "unitcell".to_string());
            read_csv(path, &name, lattice)
        }
    }
}
