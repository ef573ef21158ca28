use crate::core::models::error::ModelError;
use crate::core::models::lattice::Lattice;
use crate::core::models::layer::Layer;
use nalgebra::Point3;
use std::collections::HashSet;

/// Isotropic displacement placeholder written for every atom site.
pub const DEFAULT_U_ISO: f64 = 0.0;

/// A flat atom site, the shape consumed by structure writers and diffraction
/// simulators.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// Label unique within the structure.
    pub label: String,
    /// Element/oxidation-state tag as given in the input (e.g. "Fe3+").
    pub element: String,
    /// Bare element symbol (e.g. "Fe").
    pub symbol: &'static str,
    /// Fractional coordinates.
    pub position: Point3<f64>,
    pub u_iso: f64,
    pub occupancy: f64,
}

/// A lattice plus its flattened atom sites.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub name: String,
    pub lattice: Lattice,
    pub atoms: Vec<AtomRecord>,
}

impl StructureRecord {
    /// Atom positions in Cartesian coordinates (Angstrom).
    pub fn cartesian_positions(&self) -> Vec<Point3<f64>> {
        let m = self.lattice.to_cartesian_matrix().transpose();
        self.atoms
            .iter()
            .map(|a| Point3::from(m * a.position.coords))
            .collect()
    }
}

/// Anything made of layers within a single lattice.
pub trait AtomicStructure {
    fn name(&self) -> &str;

    fn lattice(&self) -> &Lattice;

    fn layers(&self) -> &[Layer];

    /// Flattens the structure into atom records in layer order.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::DuplicateLabel` if two atoms would share a label.
    fn to_record(&self) -> Result<StructureRecord, ModelError> {
        let capacity = self.layers().iter().map(Layer::len).sum();
        let mut atoms = Vec::with_capacity(capacity);
        let mut seen = HashSet::with_capacity(capacity);

        for layer in self.layers() {
            for atom in layer.atoms() {
                let label = atom.label();
                if !seen.insert(label.clone()) {
                    return Err(ModelError::DuplicateLabel(label));
                }
                atoms.push(AtomRecord {
                    label,
                    element: atom.element().to_string(),
                    symbol: atom.element_symbol(),
                    position: atom.position(),
                    u_iso: DEFAULT_U_ISO,
                    occupancy: atom.occupancy(),
                });
            }
        }

        Ok(StructureRecord {
            name: self.name().to_string(),
            lattice: *self.lattice(),
            atoms,
        })
    }
}

impl AtomicStructure for crate::core::models::unitcell::Unitcell {
    fn name(&self) -> &str {
        self.name()
    }

    fn lattice(&self) -> &Lattice {
        self.lattice()
    }

    fn layers(&self) -> &[Layer] {
        self.layers()
    }
}

impl<T: AtomicStructure + ?Sized> AtomicStructure for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lattice(&self) -> &Lattice {
        (**self).lattice()
    }

    fn layers(&self) -> &[Layer] {
        (**self).layers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::LayerAtom;
    use crate::core::models::unitcell::{Unitcell, UnitcellBuilder};

    fn cell() -> Unitcell {
        let lattice = Lattice::new(4.0, 4.0, 4.0, 90.0, 90.0, 90.0).unwrap();
        let mut builder = UnitcellBuilder::new("cubic", lattice);
        builder
            .add_atom("A", "Na1", "Na+", Point3::new(0.0, 0.0, 0.0), 1.0)
            .unwrap()
            .add_atom("B", "Cl1", "Cl-", Point3::new(0.5, 0.5, 0.5), 0.5)
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn to_record_flattens_atoms_in_layer_order() {
        let record = cell().to_record().unwrap();
        assert_eq!(record.name, "cubic");
        let labels: Vec<_> = record.atoms.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["Na1_A", "Cl1_B"]);
        assert_eq!(record.atoms[1].symbol, "Cl");
        assert_eq!(record.atoms[1].element, "Cl-");
        assert_eq!(record.atoms[1].occupancy, 0.5);
        assert_eq!(record.atoms[0].u_iso, DEFAULT_U_ISO);
    }

    #[test]
    fn cartesian_positions_scale_by_lattice() {
        let record = cell().to_record().unwrap();
        let carts = record.cartesian_positions();
        assert!((carts[1] - Point3::new(2.0, 2.0, 2.0)).norm() < 1e-9);
    }

    struct Colliding(Lattice, Vec<Layer>);

    impl AtomicStructure for Colliding {
        fn name(&self) -> &str {
            "colliding"
        }
        fn lattice(&self) -> &Lattice {
            &self.0
        }
        fn layers(&self) -> &[Layer] {
            &self.1
        }
    }

    #[test]
    fn to_record_rejects_label_collisions() {
        let lattice = Lattice::new(4.0, 4.0, 4.0, 90.0, 90.0, 90.0).unwrap();
        let atom = LayerAtom::new("O1", "A", "O", Point3::origin(), 1.0).unwrap();
        let layer = Layer::new("A", lattice, vec![atom]).unwrap();
        let structure = Colliding(lattice, vec![layer.clone(), layer]);
        assert_eq!(
            structure.to_record(),
            Err(ModelError::DuplicateLabel("O1_A".to_string()))
        );
    }
}
