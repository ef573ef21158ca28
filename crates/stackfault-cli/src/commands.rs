pub mod batch;
pub mod markov;
pub mod supercell;

use crate::config::StructureSettings;
use crate::error::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stackfault::core::io::unitcell;
use stackfault::core::models::unitcell::Unitcell;
use tracing::info;

/// Loads the unit cell named by `settings`, honouring a forced format.
fn load_unitcell(settings: &StructureSettings) -> Result<Unitcell> {
    info!("Loading unit cell from {:?}", &settings.path);
    let cell = match settings.format {
        Some(format) => unitcell::read_as(&settings.path, format, settings.csv_lattice)?,
        None => unitcell::read_path(&settings.path, settings.csv_lattice)?,
    };
    info!(
        name = cell.name(),
        layers = cell.layers().len(),
        atoms = cell.atom_count(),
        "Unit cell loaded."
    );
    Ok(cell)
}

/// Status line announcing a seed drawn from entropy, so the run can be repeated.
fn seed_notice(settings: &StructureSettings) -> Option<String> {
    settings.seed_drawn.then(|| {
        format!(
            "Using random seed {}. Pass --seed {} to reproduce this run.",
            settings.seed, settings.seed
        )
    })
}

fn seeded_rng(settings: &StructureSettings) -> StdRng {
    info!(seed = settings.seed, "Seeding random generator.");
    if let Some(notice) = seed_notice(settings) {
        println!("{}", notice);
    }
    StdRng::seed_from_u64(settings.seed)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(seed: u64, seed_drawn: bool) -> StructureSettings {
        StructureSettings {
            path: PathBuf::from("cell.toml"),
            format: None,
            csv_lattice: None,
            n_stacks: 1,
            seed,
            seed_drawn,
        }
    }

    #[test]
    fn drawn_seed_is_announced_with_the_flag_to_reuse_it() {
        let notice = seed_notice(&settings(8675309, true)).unwrap();
        assert!(notice.contains("8675309"));
        assert!(notice.contains("--seed 8675309"));
    }

    #[test]
    fn configured_seed_is_not_announced() {
        assert_eq!(seed_notice(&settings(42, false)), None);
    }
}
