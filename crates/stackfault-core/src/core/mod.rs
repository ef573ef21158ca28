//! # Core Module
//!
//! Stateless building blocks for layered crystal structures: the data model,
//! element utilities and file I/O.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Lattices, atoms, layers, unit cells
//!   and transition tables
//! - **File I/O** ([`io`]) - Unit cell and transition table readers, CIF and table
//!   writers, and the flattened atom-record contract
//! - **Utilities** ([`utils`]) - Element and oxidation-state tag handling

pub mod io;
pub mod models;
pub mod utils;
