use super::records::StructureRecord;
use super::traits::StructureWriter;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Structure '{0}' has no atoms to write")]
    EmptyStructure(String),
}

/// Writes P1 crystallographic information files.
pub struct CifWriter;

impl CifWriter {
    /// CIF data block names may not contain whitespace.
    fn block_name(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        if cleaned.is_empty() {
            "structure".to_string()
        } else {
            cleaned
        }
    }
}

impl StructureWriter for CifWriter {
    type Error = CifError;

    fn write_to(record: &StructureRecord, writer: &mut impl Write) -> Result<(), Self::Error> {
        if record.atoms.is_empty() {
            return Err(CifError::EmptyStructure(record.name.clone()));
        }
        let [a, b, c, alpha, beta, gamma] = record.lattice.parameters();

        writeln!(writer, "data_{}", Self::block_name(&record.name))?;
        writeln!(writer, "_symmetry_space_group_name_H-M 'P 1'")?;
        writeln!(writer, "_symmetry_Int_Tables_number 1")?;
        writeln!(writer, "_cell_length_a    {:.6}", a)?;
        writeln!(writer, "_cell_length_b    {:.6}", b)?;
        writeln!(writer, "_cell_length_c    {:.6}", c)?;
        writeln!(writer, "_cell_angle_alpha {:.6}", alpha)?;
        writeln!(writer, "_cell_angle_beta  {:.6}", beta)?;
        writeln!(writer, "_cell_angle_gamma {:.6}", gamma)?;
        writeln!(writer, "_cell_volume      {:.6}", record.lattice.volume())?;
        writeln!(writer)?;
        writeln!(writer, "loop_")?;
        writeln!(writer, " _symmetry_equiv_pos_as_xyz")?;
        writeln!(writer, " 'x, y, z'")?;
        writeln!(writer)?;
        writeln!(writer, "loop_")?;
        writeln!(writer, " _atom_site_label")?;
        writeln!(writer, " _atom_site_type_symbol")?;
        writeln!(writer, " _atom_site_fract_x")?;
        writeln!(writer, " _atom_site_fract_y")?;
        writeln!(writer, " _atom_site_fract_z")?;
        writeln!(writer, " _atom_site_U_iso_or_equiv")?;
        writeln!(writer, " _atom_site_occupancy")?;

        for atom in &record.atoms {
            writeln!(
                writer,
                " {} {} {:.6} {:.6} {:.6} {:.4} {:.4}",
                atom.label,
                atom.element,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.u_iso,
                atom.occupancy
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::records::{AtomRecord, DEFAULT_U_ISO};
    use crate::core::models::lattice::Lattice;
    use nalgebra::Point3;
    use tempfile::tempdir;

    fn record() -> StructureRecord {
        StructureRecord {
            name: "S1 P10".to_string(),
            lattice: Lattice::new(2.5, 2.5, 14.0, 90.0, 90.0, 120.0).unwrap(),
            atoms: vec![AtomRecord {
                label: "C1_A_n1".to_string(),
                element: "C".to_string(),
                symbol: "C",
                position: Point3::new(0.0, 0.5, 0.125),
                u_iso: DEFAULT_U_ISO,
                occupancy: 1.0,
            }],
        }
    }

    #[test]
    fn write_to_emits_cell_and_atom_loop() {
        let mut buffer = Vec::new();
        CifWriter::write_to(&record(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("data_S1_P10\n"));
        assert!(text.contains("_cell_length_c    14.000000"));
        assert!(text.contains("_cell_angle_gamma 120.000000"));
        assert!(text.contains("_atom_site_occupancy"));
        assert!(text.contains(" C1_A_n1 C 0.000000 0.500000 0.125000 0.0000 1.0000"));
    }

    #[test]
    fn write_to_rejects_empty_structures() {
        let mut empty = record();
        empty.atoms.clear();
        let result = CifWriter::write_to(&empty, &mut Vec::new());
        assert!(matches!(result, Err(CifError::EmptyStructure(_))));
    }

    #[test]
    fn write_to_path_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.cif");
        CifWriter::write_to_path(&record(), &path).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("_atom_site_fract_z"));
    }

    #[test]
    fn write_to_path_propagates_io_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.cif");
        assert!(matches!(
            CifWriter::write_to_path(&record(), &path),
            Err(CifError::Io(_))
        ));
    }
}
