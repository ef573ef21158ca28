//! Provides input/output functionality for structure and table formats.
//!
//! Readers build unit cells and transition tables from TOML or CSV files;
//! writers consume the flattened [`records::StructureRecord`] shape, so every
//! structure handed to them already carries unique labels and validated atom
//! data.

pub mod cif;
pub mod records;
pub mod table;
pub mod traits;
pub mod transition;
pub mod unitcell;
