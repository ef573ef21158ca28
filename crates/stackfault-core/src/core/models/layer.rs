use super::atom::LayerAtom;
use super::error::ModelError;
use super::lattice::Lattice;
use nalgebra::Vector3;
use std::collections::HashSet;

/// One atomic sheet: an ordered set of atoms sharing a layer name and lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    lattice: Lattice,
    atoms: Vec<LayerAtom>,
}

impl Layer {
    /// Creates a layer and reassigns every atom to it.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyLayerName` for a blank name and
    /// `ModelError::DuplicateLabel` if two atoms share a base label.
    pub fn new(name: &str, lattice: Lattice, atoms: Vec<LayerAtom>) -> Result<Self, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyLayerName);
        }
        let mut seen = HashSet::with_capacity(atoms.len());
        let atoms: Vec<LayerAtom> = atoms
            .into_iter()
            .map(|atom| {
                if atom.layer() == name {
                    atom
                } else {
                    atom.with_layer(name)
                }
            })
            .collect();
        for atom in &atoms {
            if !seen.insert(atom.base_label()) {
                return Err(ModelError::DuplicateLabel(atom.label()));
            }
        }
        Ok(Self {
            name: name.to_string(),
            lattice,
            atoms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn atoms(&self) -> &[LayerAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Derives a new layer whose atoms are this layer's atoms shifted by
    /// `translation` and relabelled with `new_name`.
    pub fn child(&self, new_name: &str, translation: &Vector3<f64>) -> Result<Self, ModelError> {
        let atoms = self
            .atoms
            .iter()
            .map(|atom| atom.translated(translation))
            .collect();
        Self::new(new_name, self.lattice, atoms)
    }

    /// Same atoms and positions under a new name.
    pub fn renamed(&self, new_name: &str) -> Result<Self, ModelError> {
        Self::new(new_name, self.lattice, self.atoms.clone())
    }

    /// Same layer re-expressed against another lattice. Fractional
    /// coordinates are left untouched.
    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = lattice;
        self
    }

    /// Applies `f` to every atom in place.
    pub(crate) fn map_atoms(mut self, mut f: impl FnMut(&mut LayerAtom)) -> Self {
        for atom in &mut self.atoms {
            f(atom);
        }
        self
    }
}
