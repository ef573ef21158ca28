//! # Engine Module
//!
//! Fault-injection algorithms that turn a [`Unitcell`](crate::core::models::unitcell::Unitcell)
//! into enlarged, possibly faulted supercells.
//!
//! - [`supercell`] replicates the cell along c and faults a designated layer
//!   with an independent probability per copy.
//! - [`markov`] walks a layer-to-layer transition table and materializes the
//!   resulting sequence.
//! - [`config`] holds the validated parameter types and their builders.
//! - [`rng`] derives per-job generators so parallel output stays reproducible.
//! - [`progress`] and [`diffraction`] are the seams to the caller's UI and to an
//!   external diffraction simulator.

pub mod config;
pub mod diffraction;
pub mod error;
pub mod markov;
pub mod progress;
pub mod rng;
pub mod supercell;
