use super::{load_unitcell, seeded_rng};
use crate::cli::MarkovArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use stackfault::core::io::transition;
use stackfault::engine::progress::ProgressReporter;
use stackfault::workflows::markov;
use std::path::PathBuf;
use tracing::info;

pub fn run(args: MarkovArgs) -> Result<Vec<PathBuf>> {
    info!("Merging configuration from file and CLI arguments...");
    let app = config::build_markov_config(&args)?;

    let cell = load_unitcell(&app.structure)?;
    info!("Loading transition table from {:?}", &app.table_path);
    let table = transition::read_csv(&app.table_path)?;
    info!(
        transitions = table.records().len(),
        "Transition table loaded."
    );

    let mut rng = seeded_rng(&app.structure);
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Walking {} stacking sequence(s) of {} layer(s)...",
        app.markov.probabilities.len(),
        app.markov.n_stacks * cell.layers().len()
    );
    let results = markov::run(&cell, &table, &app.markov, &mut rng, &reporter)?;
    for result in &results {
        info!(
            label = %result.label,
            faults = result.fault_count(),
            "Stacking sequence generated."
        );
    }

    let paths = markov::write_outputs(&results, &app.output.directory)?;
    println!(
        "✓ {} structure(s) written to: {}",
        paths.len(),
        app.output.directory.display()
    );
    Ok(paths)
}
