use super::config::{ConfigError, FaultParameters};
use super::error::EngineError;
use crate::core::io::records::AtomicStructure;
use crate::core::models::lattice::Lattice;
use crate::core::models::layer::Layer;
use crate::core::models::unitcell::Unitcell;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::{debug, instrument, trace, warn};

/// Suffix appended to the name of a layer copy that received a fault.
pub const FAULT_SUFFIX: &str = "_fault";

/// Name of the `n`-th (0-based) copy of `layer`.
pub(crate) fn copy_name(layer: &str, n: usize, faulted: bool) -> String {
    if faulted {
        format!("{}_n{}{}", layer, n + 1, FAULT_SUFFIX)
    } else {
        format!("{}_n{}", layer, n + 1)
    }
}

/// Places a unit-cell fractional position into replication slot `n` of an
/// `n_stacks`-fold stretched cell after shifting it by `shift`.
///
/// The shift is applied in unit-cell fractions, so its z component is
/// scaled down along with the coordinate.
pub(crate) fn stack_position(
    position: Point3<f64>,
    shift: &Vector3<f64>,
    n: usize,
    n_stacks: usize,
) -> Point3<f64> {
    Point3::new(
        position.x + shift.x,
        position.y + shift.y,
        (position.z + shift.z + n as f64) / n_stacks as f64,
    )
}

/// Copies `layer` into replication slot `n`, shifted by `shift`.
pub(crate) fn place_layer(
    layer: &Layer,
    name: &str,
    lattice: Lattice,
    shift: &Vector3<f64>,
    n: usize,
    n_stacks: usize,
) -> Result<Layer, EngineError> {
    Ok(layer
        .renamed(name)?
        .with_lattice(lattice)
        .map_atoms(|atom| atom.set_position(stack_position(atom.position(), shift, n, n_stacks))))
}

/// Warns when `faulted_layer` names no layer of `source`; such a run places
/// no faults.
pub(crate) fn warn_if_unmatched(source: &Unitcell, faulted_layer: &str) {
    if !source.contains_layer(faulted_layer) {
        warn!(
            layer = faulted_layer,
            cell = source.name(),
            "Faulted layer matches no layer in the unit cell; no faults will be placed."
        );
    }
}

/// A unit cell replicated along c, with optional independent faults.
///
/// Layers are grouped by unit-cell layer and then by replication index:
/// for a cell `[A, B]` and two stacks the order is `A_n1, A_n2, B_n1, B_n2`.
#[derive(Debug, Clone)]
pub struct Supercell<'a> {
    source: &'a Unitcell,
    name: String,
    lattice: Lattice,
    n_stacks: usize,
    fault: Option<FaultParameters>,
    layers: Vec<Layer>,
    faulted: Vec<bool>,
}

impl<'a> Supercell<'a> {
    /// Builds an `n_stacks`-fold supercell of `source`.
    ///
    /// With fault parameters, one uniform draw is taken from `rng` for every
    /// (layer, replication) pair in output order, whether or not the layer is
    /// the faulted one; the copy is faulted when it is the faulted layer and
    /// the draw is below the probability. Without them no entropy is used.
    ///
    /// A faulted-layer name matching no layer is logged as a warning and
    /// yields a supercell without faults.
    pub fn build(
        source: &'a Unitcell,
        n_stacks: usize,
        fault: Option<&FaultParameters>,
        rng: &mut impl Rng,
    ) -> Result<Self, EngineError> {
        if let Some(f) = fault {
            warn_if_unmatched(source, f.faulted_layer());
        }
        Self::assemble(source, n_stacks, fault, rng)
    }

    /// [`Supercell::build`] without the unmatched-layer warning, for callers
    /// that check the faulted layer once for many supercells.
    #[instrument(skip_all, name = "supercell_build", fields(cell = source.name(), n_stacks = n_stacks))]
    pub(crate) fn assemble(
        source: &'a Unitcell,
        n_stacks: usize,
        fault: Option<&FaultParameters>,
        rng: &mut impl Rng,
    ) -> Result<Self, EngineError> {
        if n_stacks == 0 {
            return Err(ConfigError::InvalidStackCount(n_stacks).into());
        }
        let lattice = source.lattice().stretched_c(n_stacks)?;

        let capacity = source.layers().len() * n_stacks;
        let mut layers = Vec::with_capacity(capacity);
        let mut faulted = Vec::with_capacity(capacity);
        let zero = Vector3::zeros();

        for layer in source.layers() {
            for n in 0..n_stacks {
                let is_faulted = match fault {
                    Some(f) => {
                        let draw: f64 = rng.r#gen();
                        trace!(layer = layer.name(), n, draw, "Fault draw.");
                        layer.name() == f.faulted_layer() && draw < f.probability()
                    }
                    None => false,
                };
                let shift = match fault {
                    Some(f) if is_faulted => f.displacement(),
                    _ => &zero,
                };
                let name = copy_name(layer.name(), n, is_faulted);
                layers.push(place_layer(layer, &name, lattice, shift, n, n_stacks)?);
                faulted.push(is_faulted);
            }
        }

        let supercell = Self {
            source,
            name: format!("{}_x{}", source.name(), n_stacks),
            lattice,
            n_stacks,
            fault: fault.cloned(),
            layers,
            faulted,
        };
        debug!(
            layers = supercell.layers.len(),
            faults = supercell.fault_count(),
            "Supercell built."
        );
        Ok(supercell)
    }

    /// Renames the structure, e.g. to a batch model tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn source(&self) -> &Unitcell {
        self.source
    }

    pub fn n_stacks(&self) -> usize {
        self.n_stacks
    }

    pub fn fault(&self) -> Option<&FaultParameters> {
        self.fault.as_ref()
    }

    pub fn fault_count(&self) -> usize {
        self.faulted.iter().filter(|&&f| f).count()
    }

    /// Whether the layer at output position `index` was faulted.
    pub fn is_faulted(&self, index: usize) -> bool {
        self.faulted.get(index).copied().unwrap_or(false)
    }

    /// Converts into an owned unit cell, e.g. to feed another stacking pass.
    pub fn into_unitcell(self) -> Result<Unitcell, EngineError> {
        Ok(Unitcell::new(&self.name, self.lattice, self.layers)?)
    }
}

impl AtomicStructure for Supercell<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

/// Step-by-step construction of a [`Supercell`].
pub struct SupercellBuilder<'a> {
    source: &'a Unitcell,
    n_stacks: usize,
    fault: Option<FaultParameters>,
    name: Option<String>,
}

impl<'a> SupercellBuilder<'a> {
    pub fn new(source: &'a Unitcell) -> Self {
        Self {
            source,
            n_stacks: 1,
            fault: None,
            name: None,
        }
    }

    pub fn n_stacks(mut self, n: usize) -> Self {
        self.n_stacks = n;
        self
    }

    pub fn fault(mut self, fault: FaultParameters) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self, rng: &mut impl Rng) -> Result<Supercell<'a>, EngineError> {
        let supercell = Supercell::build(self.source, self.n_stacks, self.fault.as_ref(), rng)?;
        Ok(match self.name {
            Some(name) => supercell.with_name(name),
            None => supercell,
        })
    }
}
