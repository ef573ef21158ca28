use super::output::{OutputError, ensure_dir, write_structure};
use crate::core::io::table::{ModelRow, write_rows_to_path};
use crate::core::models::unitcell::Unitcell;
use crate::engine::config::{BatchConfig, FaultParameters, probability_percent};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::rng::{job_rng, job_seeds};
use crate::engine::supercell::{Supercell, warn_if_unmatched};
use nalgebra::Vector3;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tag of the unfaulted reference model.
pub const UNFAULTED_TAG: &str = "Unfaulted";

/// Tag of the model faulted with vector `vector_index` (0-based) at `probability`.
pub fn model_tag(vector_index: usize, probability: f64) -> String {
    format!("S{}_P{}", vector_index + 1, probability_percent(probability))
}

fn vector_label(v: &Vector3<f64>) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}

fn probability_label(p: f64) -> String {
    format!("{}%", probability_percent(p))
}

fn model_row(tag: &str, vector: &Vector3<f64>, probability: f64) -> ModelRow {
    ModelRow {
        model: tag.to_string(),
        s_x: vector.x,
        s_y: vector.y,
        s_z: vector.z,
        probability,
        vector_label: vector_label(vector),
        probability_label: probability_label(probability),
    }
}

struct Job {
    tag: String,
    vector: Vector3<f64>,
    probability: f64,
    seed: u64,
}

/// Supercells of one batch run together with their metadata rows.
///
/// `models[i]` is described by `rows[i]`.
#[derive(Debug, Clone)]
pub struct BatchResult<'a> {
    pub models: Vec<Supercell<'a>>,
    pub rows: Vec<ModelRow>,
}

/// Paths produced by [`write_outputs`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub structures: Vec<PathBuf>,
    pub table: PathBuf,
}

/// Generates the unfaulted reference plus one faulted supercell per
/// (probability, vector) pair, probabilities in the outer loop.
///
/// One seed per faulted model is drawn from `rng` in model order before any
/// model is built, so the result does not depend on the thread count.
///
/// # Errors
///
/// Returns `EngineError::Config` when `config` breaks a rule of
/// [`BatchConfig::validate`], e.g. two probabilities sharing a model tag.
#[instrument(skip_all, name = "batch_workflow", fields(cell = unitcell.name()))]
pub fn generate_all<'a>(
    unitcell: &'a Unitcell,
    config: &BatchConfig,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<BatchResult<'a>, EngineError> {
    config.validate()?;
    info!(
        n_stacks = config.n_stacks,
        models = config.model_count(),
        faulted_layer = %config.faulted_layer,
        "Starting batch generation."
    );
    warn_if_unmatched(unitcell, &config.faulted_layer);

    let seeds = job_seeds(rng, config.probabilities.len() * config.vectors.len());
    let jobs: Vec<Job> = config
        .probabilities
        .iter()
        .flat_map(|&p| {
            config
                .vectors
                .iter()
                .enumerate()
                .map(move |(vi, v)| (vi, *v, p))
        })
        .zip(seeds)
        .map(|((vi, vector, probability), seed)| Job {
            tag: model_tag(vi, probability),
            vector,
            probability,
            seed,
        })
        .collect();

    reporter.report(Progress::PhaseStart {
        name: "Generating Supercells",
    });
    reporter.report(Progress::TaskStart {
        total_steps: config.model_count() as u64,
    });

    // The reference consumes no entropy; any generator will do.
    let reference = Supercell::assemble(unitcell, config.n_stacks, None, &mut job_rng(0))?
        .with_name(UNFAULTED_TAG);
    reporter.report(Progress::TaskIncrement);

    #[cfg(not(feature = "parallel"))]
    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let faulted = iterator
        .map(|job| -> Result<Supercell<'a>, EngineError> {
            let fault =
                FaultParameters::new(&config.faulted_layer, job.vector, job.probability)?;
            let model = Supercell::assemble(
                unitcell,
                config.n_stacks,
                Some(&fault),
                &mut job_rng(job.seed),
            )?
            .with_name(job.tag.clone());
            reporter.report(Progress::TaskIncrement);
            Ok(model)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let mut rows = Vec::with_capacity(config.model_count());
    rows.push(model_row(UNFAULTED_TAG, &Vector3::zeros(), 0.0));
    rows.extend(
        jobs.iter()
            .map(|job| model_row(&job.tag, &job.vector, job.probability)),
    );

    let mut models = Vec::with_capacity(config.model_count());
    models.push(reference);
    models.extend(faulted);

    info!(models = models.len(), "Batch generation complete.");
    Ok(BatchResult { models, rows })
}

/// Writes one `<tag>.cif` per model and the metadata table into `output_dir`.
#[instrument(skip_all, name = "batch_output", fields(dir = %output_dir.display()))]
pub fn write_outputs(
    result: &BatchResult<'_>,
    output_dir: &Path,
    table_name: &str,
) -> Result<BatchOutput, OutputError> {
    ensure_dir(output_dir)?;
    let structures = result
        .models
        .iter()
        .map(|model| write_structure(model, output_dir))
        .collect::<Result<Vec<_>, _>>()?;
    let table = output_dir.join(table_name);
    write_rows_to_path(&result.rows, &table)?;
    info!(
        structures = structures.len(),
        table = %table.display(),
        "Batch outputs written."
    );
    Ok(BatchOutput { structures, table })
}
