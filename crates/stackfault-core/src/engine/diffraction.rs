//! The seam to an external powder-diffraction simulator.
//!
//! Scattering physics lives outside this crate. Generated structures are
//! flattened into [`StructureRecord`]s and handed to an implementation of
//! [`DiffractionSimulator`], which returns a Q/intensity pattern.

use crate::core::io::records::StructureRecord;
use thiserror::Error;

/// Cu Kα1 wavelength in Å, the usual laboratory source.
pub const CU_K_ALPHA1: f64 = 1.5406;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiffractionError {
    #[error("Invalid diffraction parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Pattern has {q} Q values but {intensity} intensities")]
    LengthMismatch { q: usize, intensity: usize },

    #[error("Simulator backend error: {0}")]
    Backend(String),
}

/// Instrument settings passed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffractionParams {
    wavelength: f64,
    max_two_theta: f64,
    peak_width: Option<f64>,
    background: Option<f64>,
}

impl DiffractionParams {
    /// `wavelength` in Å, `max_two_theta` in degrees.
    pub fn new(wavelength: f64, max_two_theta: f64) -> Result<Self, DiffractionError> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(DiffractionError::InvalidParameter {
                name: "wavelength",
                value: wavelength,
            });
        }
        if !(max_two_theta.is_finite() && max_two_theta > 0.0 && max_two_theta <= 180.0) {
            return Err(DiffractionError::InvalidParameter {
                name: "max_two_theta",
                value: max_two_theta,
            });
        }
        Ok(Self {
            wavelength,
            max_two_theta,
            peak_width: None,
            background: None,
        })
    }

    pub fn with_peak_width(mut self, width: f64) -> Result<Self, DiffractionError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(DiffractionError::InvalidParameter {
                name: "peak_width",
                value: width,
            });
        }
        self.peak_width = Some(width);
        Ok(self)
    }

    pub fn with_background(mut self, background: f64) -> Result<Self, DiffractionError> {
        if !(background.is_finite() && background >= 0.0) {
            return Err(DiffractionError::InvalidParameter {
                name: "background",
                value: background,
            });
        }
        self.background = Some(background);
        Ok(self)
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }
    pub fn max_two_theta(&self) -> f64 {
        self.max_two_theta
    }
    pub fn peak_width(&self) -> Option<f64> {
        self.peak_width
    }
    pub fn background(&self) -> Option<f64> {
        self.background
    }

    /// Largest reachable scattering vector, `4π sin(θ) / λ`.
    pub fn max_q(&self) -> f64 {
        let theta = (self.max_two_theta / 2.0).to_radians();
        4.0 * std::f64::consts::PI * theta.sin() / self.wavelength
    }
}

/// A simulated powder pattern as paired Q and intensity values.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffractionPattern {
    q: Vec<f64>,
    intensity: Vec<f64>,
}

impl DiffractionPattern {
    pub fn new(q: Vec<f64>, intensity: Vec<f64>) -> Result<Self, DiffractionError> {
        if q.len() != intensity.len() {
            return Err(DiffractionError::LengthMismatch {
                q: q.len(),
                intensity: intensity.len(),
            });
        }
        Ok(Self { q, intensity })
    }

    pub fn q(&self) -> &[f64] {
        &self.q
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.q.iter().copied().zip(self.intensity.iter().copied())
    }

    /// Scales intensities so that the strongest point is 1. Patterns with no
    /// positive intensity are returned unchanged.
    pub fn normalized(&self) -> Self {
        let max = self.intensity.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return self.clone();
        }
        Self {
            q: self.q.clone(),
            intensity: self.intensity.iter().map(|i| i / max).collect(),
        }
    }
}

/// An external powder-diffraction backend.
pub trait DiffractionSimulator: Sync {
    fn simulate(
        &self,
        structure: &StructureRecord,
        params: &DiffractionParams,
    ) -> Result<DiffractionPattern, DiffractionError>;
}
