use super::config::ConfigError;
use super::diffraction::DiffractionError;
use crate::core::models::error::ModelError;
use crate::core::models::transition::TransitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid structure: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid transition table: {0}")]
    Transition(#[from] TransitionError),

    #[error("Faulted layer '{0}' does not exist in the unit cell")]
    UnknownFaultedLayer(String),

    #[error("Layer '{layer}' has no viable outgoing transition (sequence position {position})")]
    NoViableTransition { layer: String, position: usize },

    #[error(
        "Transition walk stalled at layer '{layer}' (sequence position {position}) after {attempts} attempts"
    )]
    WalkStalled {
        layer: String,
        position: usize,
        attempts: usize,
    },

    #[error("Diffraction simulation failed for '{name}': {source}")]
    Diffraction {
        name: String,
        #[source]
        source: DiffractionError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
