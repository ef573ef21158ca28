//! # Stackfault Core Library
//!
//! Builds supercells of layered crystal structures with stochastic stacking
//! faults, for comparing the diffraction signatures of fault models.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Value-type data model (`Lattice`, `LayerAtom`,
//!   `Layer`, `Unitcell`, `TransitionTable`), element-tag utilities, and I/O:
//!   unit-cell and transition-table readers, CIF and metadata-table writers.
//!
//! - **[`engine`]: The Fault Models.** The independent-probability
//!   [`Supercell`](engine::supercell::Supercell) builder and the transition-matrix
//!   walk in [`engine::markov`], with their validated configuration types, seeding
//!   helpers, progress reporting and the diffraction-simulator seam.
//!
//! - **[`workflows`]: The Public API.** Batch generation over probability and
//!   stacking-vector grids, one-structure-per-probability Markov runs, output
//!   writing, and diffraction simulation of the results.
//!
//! Randomness is always injected: every operation that draws takes a
//! `&mut impl rand::Rng`, so seeding that generator makes a run reproducible.

pub mod core;
pub mod engine;
pub mod workflows;
