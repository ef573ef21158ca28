use crate::core::io::records::AtomicStructure;
use crate::engine::diffraction::{DiffractionParams, DiffractionPattern, DiffractionSimulator};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A pattern and the name of the structure it was simulated from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPattern {
    pub name: String,
    pub pattern: DiffractionPattern,
}

/// Flattens every structure and runs it through `simulator`, preserving order.
#[instrument(skip_all, name = "simulate_workflow")]
pub fn run<T, S>(
    structures: &[T],
    simulator: &S,
    params: &DiffractionParams,
    reporter: &ProgressReporter,
) -> Result<Vec<SimulatedPattern>, EngineError>
where
    T: AtomicStructure + Sync,
    S: DiffractionSimulator,
{
    info!(
        structures = structures.len(),
        wavelength = params.wavelength(),
        max_two_theta = params.max_two_theta(),
        "Simulating diffraction patterns."
    );
    reporter.report(Progress::PhaseStart {
        name: "Simulating Diffraction",
    });
    reporter.report(Progress::TaskStart {
        total_steps: structures.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = structures.iter();

    #[cfg(feature = "parallel")]
    let iterator = structures.par_iter();

    let patterns = iterator
        .map(|structure| -> Result<SimulatedPattern, EngineError> {
            let record = structure.to_record()?;
            let pattern =
                simulator
                    .simulate(&record, params)
                    .map_err(|e| EngineError::Diffraction {
                        name: record.name.clone(),
                        source: e,
                    })?;
            reporter.report(Progress::TaskIncrement);
            Ok(SimulatedPattern {
                name: record.name,
                pattern,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(patterns)
}
