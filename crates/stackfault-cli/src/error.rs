use stackfault::core::io::transition::TransitionLoadError;
use stackfault::core::io::unitcell::UnitcellLoadError;
use stackfault::engine::config::ConfigError;
use stackfault::engine::error::EngineError;
use stackfault::workflows::output::OutputError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid parameters: {0}")]
    Parameters(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load unit cell: {0}")]
    Unitcell(#[from] UnitcellLoadError),

    #[error("Failed to load transition table: {0}")]
    TransitionTable(#[from] TransitionLoadError),

    #[error("Failed to write output: {0}")]
    Output(#[from] OutputError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
