use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Layer name that stands for "the faulted layer" inside a transition table.
pub const FAULT_PLACEHOLDER: &str = "F";

/// Token that stands for the run's global fault probability.
pub const PROBABILITY_PLACEHOLDER: &str = "P";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Malformed probability specification '{0}'")]
    MalformedSpec(String),

    #[error(
        "Probability '{spec}' resolves to the invalid interval [{low}, {high}) for P = {probability}"
    )]
    InvalidInterval {
        spec: String,
        probability: f64,
        low: f64,
        high: f64,
    },

    #[error("Transition table is empty")]
    EmptyTable,

    #[error("Transition {start} -> {next} references unknown layer '{layer}'")]
    UnknownLayer {
        start: String,
        next: String,
        layer: String,
    },
}

/// One endpoint of a bounded range: a number or the probability placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Value(f64),
    Placeholder,
}

impl Bound {
    fn resolve(self, probability: f64) -> f64 {
        match self {
            Bound::Value(v) => v,
            Bound::Placeholder => probability,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Value(v) => write!(f, "{}", v),
            Bound::Placeholder => f.write_str(PROBABILITY_PLACEHOLDER),
        }
    }
}

impl FromStr for Bound {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(PROBABILITY_PLACEHOLDER) {
            return Ok(Bound::Placeholder);
        }
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Bound::Value)
            .ok_or_else(|| TransitionError::MalformedSpec(s.to_string()))
    }
}

/// How a transition's probability is specified in the table.
///
/// Every variant resolves, for a given run probability `P`, to a half-open
/// interval over [0, 1) that a uniform draw must land in:
///
/// - `Literal(v)` resolves to `[0, v)`.
/// - `Placeholder` resolves to `[0, P)`.
/// - `BoundedRange(a, b)`, written `a-b`, resolves to `[b, a)`; its width is
///   `a - b`, so `1-P` is taken with probability `1 - P`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbabilitySpec {
    Literal(f64),
    Placeholder,
    BoundedRange(Bound, Bound),
}

impl ProbabilitySpec {
    /// Resolves the specification against the run probability.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidInterval` unless
    /// `0 <= low <= high <= 1`.
    pub fn resolve(&self, probability: f64) -> Result<Interval, TransitionError> {
        let (low, high) = match *self {
            ProbabilitySpec::Literal(v) => (0.0, v),
            ProbabilitySpec::Placeholder => (0.0, probability),
            ProbabilitySpec::BoundedRange(upper, lower) => {
                (lower.resolve(probability), upper.resolve(probability))
            }
        };
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(TransitionError::InvalidInterval {
                spec: self.to_string(),
                probability,
                low,
                high,
            });
        }
        Ok(Interval { low, high })
    }
}

impl fmt::Display for ProbabilitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilitySpec::Literal(v) => write!(f, "{}", v),
            ProbabilitySpec::Placeholder => f.write_str(PROBABILITY_PLACEHOLDER),
            ProbabilitySpec::BoundedRange(a, b) => write!(f, "{}-{}", a, b),
        }
    }
}

impl FromStr for ProbabilitySpec {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<Bound>() {
            Ok(Bound::Placeholder) => return Ok(ProbabilitySpec::Placeholder),
            Ok(Bound::Value(v)) => return Ok(ProbabilitySpec::Literal(v)),
            Err(_) => {}
        }
        // A leading '-' belongs to a negative number and a '-' after an
        // exponent marker to the exponent, never to the separator.
        let bytes = s.as_bytes();
        let separator = (1..bytes.len())
            .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'))
            .ok_or_else(|| TransitionError::MalformedSpec(s.to_string()))?;
        let upper: Bound = s[..separator]
            .parse()
            .map_err(|_| TransitionError::MalformedSpec(s.to_string()))?;
        let lower: Bound = s[separator + 1..]
            .parse()
            .map_err(|_| TransitionError::MalformedSpec(s.to_string()))?;
        Ok(ProbabilitySpec::BoundedRange(upper, lower))
    }
}

/// A resolved half-open acceptance interval `[low, high)` within [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Whether a uniform draw in [0, 1) is accepted. A zero-width interval
    /// accepts nothing; `[0, 1)` accepts everything.
    pub fn accepts(&self, draw: f64) -> bool {
        self.low <= draw && draw < self.high
    }
}

/// One row of a transition table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub start: String,
    pub next: String,
    pub probability: ProbabilitySpec,
    pub displacement: Vector3<f64>,
}

impl TransitionRecord {
    pub fn new(
        start: &str,
        next: &str,
        probability: ProbabilitySpec,
        displacement: Vector3<f64>,
    ) -> Self {
        Self {
            start: start.trim().to_string(),
            next: next.trim().to_string(),
            probability,
            displacement,
        }
    }
}

/// An ordered table of layer-to-layer transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    records: Vec<TransitionRecord>,
}

impl TransitionTable {
    pub fn new(records: Vec<TransitionRecord>) -> Result<Self, TransitionError> {
        if records.is_empty() {
            return Err(TransitionError::EmptyTable);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// The layer the walk starts from: the first record's start layer.
    pub fn initial_layer(&self) -> &str {
        // Non-empty by construction.
        &self.records[0].start
    }

    /// Resolves every record against `probability`, preserving table order.
    pub fn resolve(&self, probability: f64) -> Result<Vec<ResolvedTransition<'_>>, TransitionError> {
        self.records
            .iter()
            .map(|record| {
                Ok(ResolvedTransition {
                    record,
                    interval: record.probability.resolve(probability)?,
                })
            })
            .collect()
    }

    /// Checks that every layer name used by the table is either known to
    /// `is_known` or the fault placeholder.
    pub fn validate_layers(&self, is_known: impl Fn(&str) -> bool) -> Result<(), TransitionError> {
        for record in &self.records {
            for layer in [&record.start, &record.next] {
                if layer != FAULT_PLACEHOLDER && !is_known(layer) {
                    return Err(TransitionError::UnknownLayer {
                        start: record.start.clone(),
                        next: record.next.clone(),
                        layer: layer.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn uses_fault_placeholder(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.start == FAULT_PLACEHOLDER || r.next == FAULT_PLACEHOLDER)
    }
}

/// A transition record paired with its interval for one run probability.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTransition<'a> {
    pub record: &'a TransitionRecord,
    pub interval: Interval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals_placeholders_and_ranges() {
        assert_eq!(
            "0.25".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::Literal(0.25))
        );
        assert_eq!(
            " P ".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::Placeholder)
        );
        assert_eq!(
            "1-P".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::BoundedRange(Bound::Value(1.0), Bound::Placeholder))
        );
        assert_eq!(
            "0.8-0.3".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::BoundedRange(Bound::Value(0.8), Bound::Value(0.3)))
        );
    }

    #[test]
    fn range_bounds_may_use_exponent_notation() {
        assert_eq!(
            "1e-3-P".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::BoundedRange(Bound::Value(1e-3), Bound::Placeholder))
        );
        assert_eq!(
            "1-2.5E-1".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::BoundedRange(Bound::Value(1.0), Bound::Value(0.25)))
        );
        assert_eq!(
            "1e-3".parse::<ProbabilitySpec>(),
            Ok(ProbabilitySpec::Literal(1e-3))
        );
    }

    #[test]
    fn rejects_malformed_specs() {
        for bad in ["", "Q", "1-", "-", "a-b", "1-2-3"] {
            assert!(
                bad.parse::<ProbabilitySpec>().is_err(),
                "'{}' should not parse",
                bad
            );
        }
    }

    #[test]
    fn range_resolves_to_reversed_interval() {
        let spec: ProbabilitySpec = "1-P".parse().unwrap();
        let interval = spec.resolve(0.3).unwrap();
        assert_eq!(interval, Interval { low: 0.3, high: 1.0 });
        assert!((interval.width() - 0.7).abs() < 1e-12);
        assert!(interval.accepts(0.3));
        assert!(interval.accepts(0.99));
        assert!(!interval.accepts(0.29));
    }

    #[test]
    fn placeholder_and_literal_start_at_zero() {
        assert_eq!(
            ProbabilitySpec::Placeholder.resolve(0.2).unwrap(),
            Interval { low: 0.0, high: 0.2 }
        );
        assert_eq!(
            ProbabilitySpec::Literal(1.0).resolve(0.2).unwrap(),
            Interval { low: 0.0, high: 1.0 }
        );
    }

    #[test]
    fn certain_interval_accepts_every_draw_and_empty_accepts_none() {
        let certain = ProbabilitySpec::Literal(1.0).resolve(0.0).unwrap();
        let empty = ProbabilitySpec::Placeholder.resolve(0.0).unwrap();
        for draw in [0.0, 0.5, 0.999_999] {
            assert!(certain.accepts(draw));
            assert!(!empty.accepts(draw));
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let spec: ProbabilitySpec = "P-1".parse().unwrap();
        assert!(matches!(
            spec.resolve(0.5),
            Err(TransitionError::InvalidInterval { .. })
        ));
        assert!(ProbabilitySpec::Literal(1.5).resolve(0.5).is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["0.5", "P", "1-P", "P-0.1"] {
            let spec: ProbabilitySpec = text.parse().unwrap();
            assert_eq!(spec.to_string().parse::<ProbabilitySpec>().unwrap(), spec);
        }
    }

    #[test]
    fn table_validates_layer_names() {
        let table = TransitionTable::new(vec![
            TransitionRecord::new("A", "B", ProbabilitySpec::Literal(1.0), Vector3::zeros()),
            TransitionRecord::new("B", "F", ProbabilitySpec::Placeholder, Vector3::zeros()),
            TransitionRecord::new("B", "C", "1-P".parse().unwrap(), Vector3::zeros()),
        ])
        .unwrap();
        assert_eq!(table.initial_layer(), "A");
        assert!(table.uses_fault_placeholder());
        let err = table
            .validate_layers(|name| name == "A" || name == "B")
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownLayer { layer, .. } if layer == "C"));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(TransitionTable::new(Vec::new()), Err(TransitionError::EmptyTable));
    }
}
