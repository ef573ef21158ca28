//! # Workflows Module
//!
//! User-facing procedures built on the [`engine`](crate::engine).
//!
//! - [`batch`] generates an unfaulted reference and one independently faulted
//!   supercell per (probability, stacking vector) pair, plus a metadata table.
//! - [`markov`] generates one transition-matrix supercell per probability.
//! - [`simulate`] hands generated structures to an external diffraction simulator.
//! - [`output`] writes structures as CIF files.
//!
//! Every generating workflow takes the caller's random generator explicitly and
//! derives per-structure generators from it, so a seeded run is reproducible
//! regardless of how many threads build the structures.

pub mod batch;
pub mod markov;
pub mod output;
pub mod simulate;
