use super::{load_unitcell, seeded_rng};
use crate::cli::BatchArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use stackfault::engine::progress::ProgressReporter;
use stackfault::workflows::batch::{self, BatchOutput};
use tracing::info;

pub fn run(args: BatchArgs) -> Result<BatchOutput> {
    info!("Merging configuration from file and CLI arguments...");
    let app = config::build_batch_config(&args)?;

    let cell = load_unitcell(&app.structure)?;
    let mut rng = seeded_rng(&app.structure);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating {} model(s) from '{}'...",
        app.batch.model_count(),
        cell.name()
    );
    let result = batch::generate_all(&cell, &app.batch, &mut rng, &reporter)?;

    let output = batch::write_outputs(&result, &app.output.directory, &app.output.table_name)?;
    println!(
        "✓ {} structure(s) written to: {}",
        output.structures.len(),
        app.output.directory.display()
    );
    println!("✓ Model table written to: {}", output.table.display());
    Ok(output)
}
