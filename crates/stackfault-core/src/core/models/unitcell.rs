use super::atom::LayerAtom;
use super::error::ModelError;
use super::lattice::Lattice;
use super::layer::Layer;
use nalgebra::Point3;
use std::collections::HashSet;

/// One repeat unit along the stacking axis: an ordered stack of layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Unitcell {
    name: String,
    lattice: Lattice,
    layers: Vec<Layer>,
}

impl Unitcell {
    /// Creates a unit cell from already-built layers.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyUnitcell` if `layers` is empty,
    /// `ModelError::DuplicateLayer` if two layers share a name, and
    /// `ModelError::LatticeMismatch` if a layer carries a different lattice.
    pub fn new(name: &str, lattice: Lattice, layers: Vec<Layer>) -> Result<Self, ModelError> {
        if layers.is_empty() {
            return Err(ModelError::EmptyUnitcell(name.to_string()));
        }
        let mut seen = HashSet::with_capacity(layers.len());
        for layer in &layers {
            if !seen.insert(layer.name()) {
                return Err(ModelError::DuplicateLayer(layer.name().to_string()));
            }
            if *layer.lattice() != lattice {
                return Err(ModelError::LatticeMismatch {
                    layer: layer.name().to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            lattice,
            layers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.layer(name).is_some()
    }

    pub fn atom_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }
}

/// Incrementally assembles a [`Unitcell`] from flat atom rows.
///
/// Layers are created in first-appearance order; atoms keep their insertion
/// order within a layer. Used by the CSV and TOML readers.
#[derive(Debug)]
pub struct UnitcellBuilder {
    name: String,
    lattice: Lattice,
    layers: Vec<(String, Vec<LayerAtom>)>,
}

impl UnitcellBuilder {
    pub fn new(name: &str, lattice: Lattice) -> Self {
        Self {
            name: name.to_string(),
            lattice,
            layers: Vec::new(),
        }
    }

    /// Starts a new (possibly empty) layer if it does not exist yet.
    pub fn start_layer(&mut self, layer: &str) -> &mut Self {
        let layer = layer.trim();
        if !self.layers.iter().any(|(name, _)| name == layer) {
            self.layers.push((layer.to_string(), Vec::new()));
        }
        self
    }

    /// Adds an atom to `layer`, creating the layer on first use.
    pub fn add_atom(
        &mut self,
        layer: &str,
        label: &str,
        element: &str,
        position: Point3<f64>,
        occupancy: f64,
    ) -> Result<&mut Self, ModelError> {
        let layer = layer.trim();
        let atom = LayerAtom::new(label, layer, element, position, occupancy)?;
        match self.layers.iter_mut().find(|(name, _)| name == layer) {
            Some((_, atoms)) => atoms.push(atom),
            None => self.layers.push((layer.to_string(), vec![atom])),
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Unitcell, ModelError> {
        let lattice = self.lattice;
        let layers = self
            .layers
            .into_iter()
            .map(|(name, atoms)| Layer::new(&name, lattice, atoms))
            .collect::<Result<Vec<_>, _>>()?;
        Unitcell::new(&self.name, lattice, layers)
    }
}
