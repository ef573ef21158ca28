use stackfault::core::io::unitcell::UnitcellFormat;
use stackfault::core::models::lattice::Lattice;
use stackfault::engine::config::{BatchConfig, FaultParameters, MarkovConfig};
use std::path::PathBuf;

/// Where the unit cell comes from and how it is replicated.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSettings {
    pub path: PathBuf,
    /// `None` means "guess from the extension".
    pub format: Option<UnitcellFormat>,
    pub csv_lattice: Option<Lattice>,
    pub n_stacks: usize,
    pub seed: u64,
    /// The seed was drawn from entropy rather than configured.
    pub seed_drawn: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub table_name: String,
}

pub struct SupercellAppConfig {
    pub structure: StructureSettings,
    pub fault: Option<FaultParameters>,
    pub name: Option<String>,
    pub output: OutputSettings,
}

pub struct BatchAppConfig {
    pub structure: StructureSettings,
    pub batch: BatchConfig,
    pub output: OutputSettings,
}

pub struct MarkovAppConfig {
    pub structure: StructureSettings,
    pub table_path: PathBuf,
    pub markov: MarkovConfig,
    pub output: OutputSettings,
}
