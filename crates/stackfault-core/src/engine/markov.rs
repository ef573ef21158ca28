use super::config::{ConfigError, probability_percent};
use super::error::EngineError;
use super::supercell::{copy_name, place_layer};
use crate::core::io::records::AtomicStructure;
use crate::core::models::lattice::Lattice;
use crate::core::models::layer::Layer;
use crate::core::models::transition::{FAULT_PLACEHOLDER, ResolvedTransition, TransitionTable};
use crate::core::models::unitcell::Unitcell;
use nalgebra::Vector3;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, instrument, trace, warn};

/// Upper bound on the number of full passes over a layer's candidates before
/// a step is declared stalled.
pub const MAX_STEP_ATTEMPTS: usize = 10_000;

/// One element of a walked layer sequence, in transition-table names.
#[derive(Debug, Clone, PartialEq)]
pub struct StackStep {
    /// Table name of the layer; may be the fault placeholder.
    pub layer: String,
    /// Displacement of the transition that led here (zero for the first element).
    pub displacement: Vector3<f64>,
}

impl StackStep {
    pub fn is_fault(&self) -> bool {
        self.layer == FAULT_PLACEHOLDER
    }
}

/// A supercell produced by a transition-matrix walk for one probability.
#[derive(Debug, Clone)]
pub struct MarkovSupercell {
    /// `P<round(probability * 100)>`.
    pub label: String,
    pub probability: f64,
    pub unitcell: Unitcell,
    pub sequence: Vec<StackStep>,
}

impl MarkovSupercell {
    pub fn fault_count(&self) -> usize {
        self.sequence.iter().filter(|s| s.is_fault()).count()
    }
}

impl AtomicStructure for MarkovSupercell {
    fn name(&self) -> &str {
        &self.label
    }

    fn lattice(&self) -> &Lattice {
        self.unitcell.lattice()
    }

    fn layers(&self) -> &[Layer] {
        self.unitcell.layers()
    }
}

fn candidates_by_layer<'t, 'a>(
    resolved: &'t [ResolvedTransition<'a>],
) -> HashMap<&'a str, Vec<&'t ResolvedTransition<'a>>> {
    let mut map: HashMap<&'a str, Vec<&'t ResolvedTransition<'a>>> = HashMap::new();
    for transition in resolved {
        map.entry(transition.record.start.as_str())
            .or_default()
            .push(transition);
    }
    map
}

/// Tries the candidates in table order with a fresh draw each, repeating the
/// pass until one accepts or the attempt ceiling is hit.
fn take_step<'t, 'a>(
    candidates: &[&'t ResolvedTransition<'a>],
    rng: &mut impl Rng,
) -> Option<&'t ResolvedTransition<'a>> {
    for _ in 0..MAX_STEP_ATTEMPTS {
        for &candidate in candidates {
            let draw: f64 = rng.r#gen();
            if candidate.interval.accepts(draw) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Walks `length` layers starting from `initial`.
///
/// # Errors
///
/// Returns `EngineError::NoViableTransition` when the current layer has no
/// outgoing transition of positive width, and `EngineError::WalkStalled` when
/// [`MAX_STEP_ATTEMPTS`] passes produce no accepted transition.
pub fn walk<'a>(
    resolved: &[ResolvedTransition<'a>],
    initial: &'a str,
    length: usize,
    rng: &mut impl Rng,
) -> Result<Vec<StackStep>, EngineError> {
    let mut sequence = Vec::with_capacity(length);
    if length == 0 {
        return Ok(sequence);
    }
    let candidates = candidates_by_layer(resolved);

    sequence.push(StackStep {
        layer: initial.to_string(),
        displacement: Vector3::zeros(),
    });
    let mut current: &'a str = initial;

    for position in 1..length {
        let outgoing = candidates.get(current).map(Vec::as_slice).unwrap_or(&[]);
        if outgoing.iter().all(|t| t.interval.width() <= 0.0) {
            return Err(EngineError::NoViableTransition {
                layer: current.to_string(),
                position,
            });
        }
        let chosen = take_step(outgoing, rng).ok_or_else(|| EngineError::WalkStalled {
            layer: current.to_string(),
            position,
            attempts: MAX_STEP_ATTEMPTS,
        })?;
        trace!(from = current, to = %chosen.record.next, position, "Transition taken.");

        sequence.push(StackStep {
            layer: chosen.record.next.clone(),
            displacement: chosen.record.displacement,
        });
        current = chosen.record.next.as_str();
    }
    Ok(sequence)
}

/// Builds one transition-matrix supercell of `unitcell` for `probability`.
///
/// The walk produces `layers × n_stacks` elements. Element `i` is a copy of
/// its layer (the fault placeholder resolving to `faulted_layer`), shifted by
/// the displacement of the transition that produced it and folded into
/// replication slot `i / layers`.
#[instrument(skip_all, name = "markov_build", fields(cell = unitcell.name(), probability = probability))]
pub fn build(
    unitcell: &Unitcell,
    table: &TransitionTable,
    n_stacks: usize,
    faulted_layer: &str,
    probability: f64,
    rng: &mut impl Rng,
) -> Result<MarkovSupercell, EngineError> {
    if n_stacks == 0 {
        return Err(ConfigError::InvalidStackCount(n_stacks).into());
    }
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(ConfigError::InvalidProbability(probability).into());
    }
    table.validate_layers(|name| unitcell.contains_layer(name))?;
    if !unitcell.contains_layer(faulted_layer) {
        if table.uses_fault_placeholder() {
            return Err(EngineError::UnknownFaultedLayer(faulted_layer.to_string()));
        }
        warn!(
            layer = faulted_layer,
            "Faulted layer matches no layer in the unit cell; the table never refers to it."
        );
    }

    let resolved = table.resolve(probability)?;
    let per_cell = unitcell.layers().len();
    let sequence = walk(&resolved, table.initial_layer(), per_cell * n_stacks, rng)?;

    let lattice = unitcell.lattice().stretched_c(n_stacks)?;
    let mut layers = Vec::with_capacity(sequence.len());
    for (i, step) in sequence.iter().enumerate() {
        let actual = if step.is_fault() {
            faulted_layer
        } else {
            step.layer.as_str()
        };
        let base = unitcell.layer(actual).ok_or_else(|| {
            EngineError::Internal(format!("walked into unvalidated layer '{}'", actual))
        })?;
        let name = copy_name(actual, i, step.is_fault());
        layers.push(place_layer(
            base,
            &name,
            lattice,
            &step.displacement,
            i / per_cell,
            n_stacks,
        )?);
    }

    let label = format!("P{}", probability_percent(probability));
    let supercell = MarkovSupercell {
        unitcell: Unitcell::new(&label, lattice, layers)?,
        label,
        probability,
        sequence,
    };
    debug!(
        label = %supercell.label,
        faults = supercell.fault_count(),
        "Transition-matrix supercell built."
    );
    Ok(supercell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::transition::TransitionRecord;
    use crate::core::models::unitcell::UnitcellBuilder;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cell() -> Unitcell {
        let lattice = Lattice::new(2.5, 2.5, 7.0, 90.0, 90.0, 120.0).unwrap();
        let mut builder = UnitcellBuilder::new("graphite", lattice);
        builder
            .add_atom("A", "C1", "C", Point3::new(0.0, 0.0, 0.25), 1.0)
            .unwrap()
            .add_atom("B", "C1", "C", Point3::new(1.0 / 3.0, 2.0 / 3.0, 0.75), 1.0)
            .unwrap();
        builder.build().unwrap()
    }

    fn record(start: &str, next: &str, spec: &str, dx: f64) -> TransitionRecord {
        TransitionRecord::new(start, next, spec.parse().unwrap(), Vector3::new(dx, 0.0, 0.0))
    }

    fn faulting_table() -> TransitionTable {
        TransitionTable::new(vec![
            record("A", "B", "1-P", 0.0),
            record("A", "F", "P", 0.5),
            record("B", "A", "1", 0.0),
            record("F", "A", "1", 0.0),
        ])
        .unwrap()
    }

    fn names(sc: &MarkovSupercell) -> Vec<&str> {
        sc.unitcell.layers().iter().map(|l| l.name()).collect()
    }

    #[test]
    fn zero_probability_gives_the_ideal_sequence() {
        let cell = cell();
        let mut rng = StdRng::seed_from_u64(1);
        let sc = build(&cell, &faulting_table(), 3, "B", 0.0, &mut rng).unwrap();

        assert_eq!(sc.label, "P0");
        assert_eq!(names(&sc), ["A_n1", "B_n2", "A_n3", "B_n4", "A_n5", "B_n6"]);
        assert_eq!(sc.fault_count(), 0);
        assert_eq!(sc.unitcell.lattice().c(), 21.0);
    }

    #[test]
    fn certain_fault_resolves_placeholder_to_faulted_layer() {
        let cell = cell();
        let mut rng = StdRng::seed_from_u64(1);
        let sc = build(&cell, &faulting_table(), 2, "B", 1.0, &mut rng).unwrap();

        assert_eq!(sc.label, "P100");
        assert_eq!(names(&sc), ["A_n1", "B_n2_fault", "A_n3", "B_n4_fault"]);
        assert_eq!(sc.fault_count(), 2);

        // Element 1 sits in replication slot 0 and carries the 0.5 shift.
        let faulted = &sc.unitcell.layers()[1].atoms()[0];
        assert!((faulted.x() - (1.0 / 3.0 + 0.5)).abs() < 1e-12);
        assert!((faulted.z() - 0.75 / 2.0).abs() < 1e-12);
        assert_eq!(faulted.label(), "C1_B_n2_fault");

        // Element 2 is in slot 1.
        let third = &sc.unitcell.layers()[2].atoms()[0];
        assert!((third.z() - (0.25 + 1.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn first_element_is_the_initial_layer_without_displacement() {
        let table = faulting_table();
        let resolved = table.resolve(0.5).unwrap();
        let steps = walk(&resolved, table.initial_layer(), 5, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].layer, "A");
        assert_eq!(steps[0].displacement, Vector3::zeros());
        assert!(walk(&resolved, "A", 0, &mut StdRng::seed_from_u64(4)).unwrap().is_empty());
    }

    #[test]
    fn same_seed_reproduces_the_walk() {
        let cell = cell();
        let table = faulting_table();
        let a = build(&cell, &table, 50, "B", 0.3, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = build(&cell, &table, 50, "B", 0.3, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a.sequence, b.sequence);
        assert_eq!(a.unitcell, b.unitcell);
        assert_eq!(a.unitcell.layers().len(), 100);
    }

    #[test]
    fn layer_without_outgoing_transition_is_reported() {
        let cell = cell();
        let table = TransitionTable::new(vec![record("A", "B", "1", 0.0)]).unwrap();
        let err = build(&cell, &table, 2, "B", 0.5, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoViableTransition { ref layer, position: 2 } if layer == "B"
        ));
    }

    #[test]
    fn zero_width_outgoing_transitions_are_not_viable() {
        let cell = cell();
        let table =
            TransitionTable::new(vec![record("A", "B", "1", 0.0), record("B", "A", "P", 0.0)])
                .unwrap();
        let err = build(&cell, &table, 2, "B", 0.0, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, EngineError::NoViableTransition { .. }));
    }

    #[test]
    fn vanishing_transition_stalls_after_the_attempt_ceiling() {
        let table = TransitionTable::new(vec![record("A", "A", "1e-300", 0.0)]).unwrap();
        let resolved = table.resolve(0.0).unwrap();
        let err = walk(&resolved, "A", 2, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::WalkStalled { attempts: MAX_STEP_ATTEMPTS, position: 1, .. }
        ));
    }

    #[test]
    fn unknown_layers_and_faulted_layer_are_rejected() {
        let cell = cell();
        let table = TransitionTable::new(vec![record("A", "C", "1", 0.0)]).unwrap();
        assert!(matches!(
            build(&cell, &table, 1, "B", 0.5, &mut StdRng::seed_from_u64(0)),
            Err(EngineError::Transition(_))
        ));

        assert!(matches!(
            build(&cell, &faulting_table(), 1, "Z", 0.5, &mut StdRng::seed_from_u64(0)),
            Err(EngineError::UnknownFaultedLayer(ref l)) if l == "Z"
        ));
    }

    #[test]
    fn invalid_run_parameters_are_rejected() {
        let cell = cell();
        let table = faulting_table();
        assert!(matches!(
            build(&cell, &table, 0, "B", 0.5, &mut StdRng::seed_from_u64(0)),
            Err(EngineError::Config(ConfigError::InvalidStackCount(0)))
        ));
        assert!(matches!(
            build(&cell, &table, 1, "B", 1.5, &mut StdRng::seed_from_u64(0)),
            Err(EngineError::Config(ConfigError::InvalidProbability(_)))
        ));
    }
}
