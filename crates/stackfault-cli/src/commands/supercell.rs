use super::{load_unitcell, seeded_rng};
use crate::cli::SupercellArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use stackfault::core::io::records::AtomicStructure;
use stackfault::engine::progress::ProgressReporter;
use stackfault::engine::supercell::SupercellBuilder;
use stackfault::workflows::output::write_structure;
use std::path::PathBuf;
use tracing::info;

pub fn run(args: SupercellArgs) -> Result<PathBuf> {
    info!("Merging configuration from file and CLI arguments...");
    let app = config::build_supercell_config(&args)?;

    let cell = load_unitcell(&app.structure)?;
    let mut rng = seeded_rng(&app.structure);

    let mut builder = SupercellBuilder::new(&cell).n_stacks(app.structure.n_stacks);
    if let Some(fault) = app.fault {
        builder = builder.fault(fault);
    }
    if let Some(name) = app.name {
        builder = builder.name(name);
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let supercell = reporter.phase("Building supercell", || builder.build(&mut rng))?;

    let path = write_structure(&supercell, &app.output.directory)?;
    info!(
        name = supercell.name(),
        faults = supercell.fault_count(),
        "Supercell written to {:?}",
        &path
    );
    println!(
        "✓ Supercell '{}' ({} layer(s), {} faulted) written to: {}",
        supercell.name(),
        supercell.layers().len(),
        supercell.fault_count(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::test_support::write_cell;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn args(argv: &[&str]) -> SupercellArgs {
        let mut full = vec!["stackfault", "supercell"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Supercell(a) => a,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn writes_an_unfaulted_supercell() {
        let dir = tempdir().unwrap();
        let cell = write_cell(dir.path());
        let out = dir.path().join("out");

        let path = run(args(&[
            "-i",
            cell.to_str().unwrap(),
            "-n",
            "3",
            "--seed",
            "1",
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(path, out.join("cell_x3.cif"));
        let cif = fs::read_to_string(path).unwrap();
        assert!(cif.contains("A_n3"));
        assert!(!cif.contains("_fault"));
    }

    #[test]
    fn certain_fault_marks_every_copy_of_the_layer() {
        let dir = tempdir().unwrap();
        let cell = write_cell(dir.path());

        let path = run(args(&[
            "-i",
            cell.to_str().unwrap(),
            "-n",
            "2",
            "--faulted-layer",
            "B",
            "--vector",
            "0.3333,0,0",
            "-p",
            "1",
            "--name",
            "shifted",
            "-o",
            dir.path().to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(path, dir.path().join("shifted.cif"));
        let cif = fs::read_to_string(path).unwrap();
        assert!(cif.contains("B_n1_fault"));
        assert!(cif.contains("B_n2_fault"));
    }
}
