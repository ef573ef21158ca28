use nalgebra::Vector3;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error(
        "Fault parameters must be given together; missing: {}",
        missing.join(", ")
    )]
    PartialFaultParameters { missing: Vec<&'static str> },

    #[error("Fault probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("Displacement vector must be finite, got [{0}, {1}, {2}]")]
    InvalidDisplacement(f64, f64, f64),

    #[error("Stack count must be at least 1 (got {0})")]
    InvalidStackCount(usize),

    #[error("The {0} list must not be empty")]
    EmptyList(&'static str),

    #[error("Probabilities {first} and {second} both map to model tag suffix 'P{percent}'")]
    DuplicateTag {
        first: f64,
        second: f64,
        percent: i64,
    },
}

/// Rounds a probability to the whole percentage used in model tags.
pub fn probability_percent(probability: f64) -> i64 {
    (probability * 100.0).round() as i64
}

fn validate_probability(probability: f64) -> Result<f64, ConfigError> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(ConfigError::InvalidProbability(probability))
    }
}

fn validate_stack_count(n_stacks: usize) -> Result<usize, ConfigError> {
    if n_stacks >= 1 {
        Ok(n_stacks)
    } else {
        Err(ConfigError::InvalidStackCount(n_stacks))
    }
}

/// Rejects probability lists whose tags would collide after rounding.
pub fn validate_distinct_tags(probabilities: &[f64]) -> Result<(), ConfigError> {
    let mut seen: HashMap<i64, f64> = HashMap::with_capacity(probabilities.len());
    for &p in probabilities {
        let percent = probability_percent(p);
        if let Some(&first) = seen.get(&percent) {
            return Err(ConfigError::DuplicateTag {
                first,
                second: p,
                percent,
            });
        }
        seen.insert(percent, p);
    }
    Ok(())
}

/// The complete parameter set for an independently faulted supercell.
///
/// Either all three values are present or the supercell is unfaulted;
/// [`FaultParameters::from_parts`] enforces this.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultParameters {
    faulted_layer: String,
    displacement: Vector3<f64>,
    probability: f64,
}

impl FaultParameters {
    pub fn new(
        faulted_layer: &str,
        displacement: Vector3<f64>,
        probability: f64,
    ) -> Result<Self, ConfigError> {
        if displacement.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::InvalidDisplacement(
                displacement.x,
                displacement.y,
                displacement.z,
            ));
        }
        Ok(Self {
            faulted_layer: faulted_layer.trim().to_string(),
            displacement,
            probability: validate_probability(probability)?,
        })
    }

    /// Assembles fault parameters from optional pieces.
    ///
    /// Returns `Ok(None)` when nothing is given (unfaulted mode).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PartialFaultParameters` if only some pieces are
    /// given.
    pub fn from_parts(
        faulted_layer: Option<&str>,
        displacement: Option<Vector3<f64>>,
        probability: Option<f64>,
    ) -> Result<Option<Self>, ConfigError> {
        match (faulted_layer, displacement, probability) {
            (None, None, None) => Ok(None),
            (Some(layer), Some(vector), Some(p)) => Self::new(layer, vector, p).map(Some),
            (layer, vector, p) => {
                let mut missing = Vec::new();
                if layer.is_none() {
                    missing.push("faulted_layer");
                }
                if vector.is_none() {
                    missing.push("displacement");
                }
                if p.is_none() {
                    missing.push("probability");
                }
                Err(ConfigError::PartialFaultParameters { missing })
            }
        }
    }

    pub fn faulted_layer(&self) -> &str {
        &self.faulted_layer
    }

    pub fn displacement(&self) -> &Vector3<f64> {
        &self.displacement
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

/// Parameters for a batch of independently faulted supercells.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub n_stacks: usize,
    pub faulted_layer: String,
    pub probabilities: Vec<f64>,
    pub vectors: Vec<Vector3<f64>>,
}

impl BatchConfig {
    /// Number of structures the batch produces, the unfaulted reference included.
    pub fn model_count(&self) -> usize {
        1 + self.probabilities.len() * self.vectors.len()
    }

    /// Checks the invariants [`BatchConfigBuilder::build`] enforces.
    /// Workflows re-run it before generating.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: stack count, empty lists, probability
    /// range, finite vectors, then distinct model tags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stack_count(self.n_stacks)?;
        if self.probabilities.is_empty() {
            return Err(ConfigError::EmptyList("probabilities"));
        }
        if self.vectors.is_empty() {
            return Err(ConfigError::EmptyList("vectors"));
        }
        for &p in &self.probabilities {
            validate_probability(p)?;
        }
        for v in &self.vectors {
            if v.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::InvalidDisplacement(v.x, v.y, v.z));
            }
        }
        validate_distinct_tags(&self.probabilities)
    }
}

#[derive(Default)]
pub struct BatchConfigBuilder {
    n_stacks: Option<usize>,
    faulted_layer: Option<String>,
    probabilities: Option<Vec<f64>>,
    vectors: Option<Vec<Vector3<f64>>>,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_stacks(mut self, n: usize) -> Self {
        self.n_stacks = Some(n);
        self
    }
    pub fn faulted_layer(mut self, layer: impl Into<String>) -> Self {
        self.faulted_layer = Some(layer.into());
        self
    }
    pub fn probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }
    pub fn vectors(mut self, vectors: Vec<Vector3<f64>>) -> Self {
        self.vectors = Some(vectors);
        self
    }

    pub fn build(self) -> Result<BatchConfig, ConfigError> {
        let n_stacks = self.n_stacks.ok_or(ConfigError::MissingParameter("n_stacks"))?;
        let faulted_layer = self
            .faulted_layer
            .ok_or(ConfigError::MissingParameter("faulted_layer"))?;
        let probabilities = self
            .probabilities
            .ok_or(ConfigError::MissingParameter("probabilities"))?;
        let vectors = self
            .vectors
            .ok_or(ConfigError::MissingParameter("vectors"))?;

        let config = BatchConfig {
            n_stacks,
            faulted_layer: faulted_layer.trim().to_string(),
            probabilities,
            vectors,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parameters for transition-matrix supercells, one per probability.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovConfig {
    pub n_stacks: usize,
    pub faulted_layer: String,
    pub probabilities: Vec<f64>,
}

impl MarkovConfig {
    /// Checks the invariants [`MarkovConfigBuilder::build`] enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stack_count(self.n_stacks)?;
        if self.probabilities.is_empty() {
            return Err(ConfigError::EmptyList("probabilities"));
        }
        for &p in &self.probabilities {
            validate_probability(p)?;
        }
        validate_distinct_tags(&self.probabilities)
    }
}

#[derive(Default)]
pub struct MarkovConfigBuilder {
    n_stacks: Option<usize>,
    faulted_layer: Option<String>,
    probabilities: Option<Vec<f64>>,
}

impl MarkovConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_stacks(mut self, n: usize) -> Self {
        self.n_stacks = Some(n);
        self
    }
    pub fn faulted_layer(mut self, layer: impl Into<String>) -> Self {
        self.faulted_layer = Some(layer.into());
        self
    }
    pub fn probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    pub fn build(self) -> Result<MarkovConfig, ConfigError> {
        let n_stacks = self.n_stacks.ok_or(ConfigError::MissingParameter("n_stacks"))?;
        let faulted_layer = self
            .faulted_layer
            .ok_or(ConfigError::MissingParameter("faulted_layer"))?;
        let probabilities = self
            .probabilities
            .ok_or(ConfigError::MissingParameter("probabilities"))?;

        let config = MarkovConfig {
            n_stacks,
            faulted_layer: faulted_layer.trim().to_string(),
            probabilities,
        };
        config.validate()?;
        Ok(config)
    }
}
