use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid lattice parameter '{name}': {value} ({reason})")]
    InvalidLattice {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Occupancy {occupancy} of atom '{label}' is outside [0, 1]")]
    InvalidOccupancy { label: String, occupancy: f64 },

    #[error("Atom '{label}' has an unrecognized element tag '{tag}'")]
    UnknownElement { label: String, tag: String },

    #[error("Atom label must not be empty (layer '{layer}')")]
    EmptyLabel { layer: String },

    #[error("Layer name must not be empty")]
    EmptyLayerName,

    #[error("Duplicate layer name '{0}' in structure")]
    DuplicateLayer(String),

    #[error("Duplicate atom label '{0}' in structure")]
    DuplicateLabel(String),

    #[error("Layer '{layer}' is expressed in a different lattice than its unit cell")]
    LatticeMismatch { layer: String },

    #[error("Unit cell '{0}' contains no layers")]
    EmptyUnitcell(String),
}
