//! # Core Models Module
//!
//! Value types describing layered crystal structures.
//!
//! ## Overview
//!
//! The models are deliberately plain values: a [`lattice::Lattice`] is `Copy`,
//! and layers and unit cells own their atoms outright. Generated structures
//! therefore never alias the unit cell they were built from.
//!
//! ## Key Components
//!
//! - [`lattice`] - Six-parameter cell geometry
//! - [`atom`] - A labelled atom with fractional coordinates and occupancy
//! - [`layer`] - An ordered sheet of atoms sharing a layer name
//! - [`unitcell`] - The repeat unit along the stacking axis
//! - [`transition`] - Layer-to-layer transition tables for Markov stacking
//! - [`error`] - Validation errors raised while building models
//!
//! ## Usage
//!
//! ```ignore
//! use stackfault::core::models::{lattice::Lattice, unitcell::UnitcellBuilder};
//!
//! let lattice = Lattice::new(2.46, 2.46, 6.7, 90.0, 90.0, 120.0)?;
//! let mut builder = UnitcellBuilder::new("graphite", lattice);
//! builder.add_atom("A", "C1", "C", Point3::new(0.0, 0.0, 0.25), 1.0)?;
//! builder.add_atom("B", "C1", "C", Point3::new(1.0 / 3.0, 2.0 / 3.0, 0.75), 1.0)?;
//! let unitcell = builder.build()?;
//! ```

pub mod atom;
pub mod error;
pub mod lattice;
pub mod layer;
pub mod transition;
pub mod unitcell;
