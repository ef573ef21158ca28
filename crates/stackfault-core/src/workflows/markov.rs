use super::output::{OutputError, ensure_dir, write_structure};
use crate::core::models::transition::TransitionTable;
use crate::core::models::unitcell::Unitcell;
use crate::engine::config::MarkovConfig;
use crate::engine::error::EngineError;
use crate::engine::markov::{self, MarkovSupercell};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::rng::{job_rng, job_seeds};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builds one transition-matrix supercell per configured probability, in the
/// configured order.
#[instrument(skip_all, name = "markov_workflow", fields(cell = unitcell.name()))]
pub fn run(
    unitcell: &Unitcell,
    table: &TransitionTable,
    config: &MarkovConfig,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<Vec<MarkovSupercell>, EngineError> {
    config.validate()?;
    info!(
        n_stacks = config.n_stacks,
        probabilities = config.probabilities.len(),
        transitions = table.records().len(),
        "Starting transition-matrix generation."
    );

    let jobs: Vec<(f64, u64)> = config
        .probabilities
        .iter()
        .copied()
        .zip(job_seeds(rng, config.probabilities.len()))
        .collect();

    reporter.report(Progress::PhaseStart {
        name: "Walking Transition Table",
    });
    reporter.report(Progress::TaskStart {
        total_steps: jobs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let results = iterator
        .map(|&(probability, seed)| -> Result<MarkovSupercell, EngineError> {
            let supercell = markov::build(
                unitcell,
                table,
                config.n_stacks,
                &config.faulted_layer,
                probability,
                &mut job_rng(seed),
            )?;
            reporter.report(Progress::TaskIncrement);
            Ok(supercell)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(structures = results.len(), "Transition-matrix generation complete.");
    Ok(results)
}

/// Writes one `<label>.cif` per supercell into `output_dir`.
pub fn write_outputs(
    results: &[MarkovSupercell],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, OutputError> {
    ensure_dir(output_dir)?;
    results
        .iter()
        .map(|supercell| write_structure(supercell, output_dir))
        .collect()
}
