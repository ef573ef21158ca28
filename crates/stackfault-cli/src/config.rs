mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_batch_config, build_markov_config, build_supercell_config};
pub use models::StructureSettings;
