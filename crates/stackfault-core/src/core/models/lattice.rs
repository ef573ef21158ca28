use super::error::ModelError;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// The geometric description of a repeating cell.
///
/// All six parameters are fixed together at construction. The value is `Copy`,
/// so every structure holds its own lattice and replacing one structure's
/// lattice can never affect another's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLattice", into = "RawLattice")]
pub struct Lattice {
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawLattice {
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl TryFrom<RawLattice> for Lattice {
    type Error = ModelError;

    fn try_from(raw: RawLattice) -> Result<Self, Self::Error> {
        Lattice::new(raw.a, raw.b, raw.c, raw.alpha, raw.beta, raw.gamma)
    }
}

impl From<Lattice> for RawLattice {
    fn from(l: Lattice) -> Self {
        Self {
            a: l.a,
            b: l.b,
            c: l.c,
            alpha: l.alpha,
            beta: l.beta,
            gamma: l.gamma,
        }
    }
}

impl Lattice {
    /// Creates a lattice from edge lengths and angles (in degrees).
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidLattice` if any length is not strictly
    /// positive and finite, or any angle lies outside the open interval (0, 180).
    pub fn new(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, ModelError> {
        for (name, value) in [("a", a), ("b", b), ("c", c)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::InvalidLattice {
                    name,
                    value,
                    reason: "edge lengths must be positive",
                });
            }
        }
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !value.is_finite() || value <= 0.0 || value >= 180.0 {
                return Err(ModelError::InvalidLattice {
                    name,
                    value,
                    reason: "angles must lie strictly between 0 and 180 degrees",
                });
            }
        }
        Ok(Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        })
    }

    pub fn a(&self) -> f64 {
        self.a
    }
    pub fn b(&self) -> f64 {
        self.b
    }
    pub fn c(&self) -> f64 {
        self.c
    }
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
    pub fn beta(&self) -> f64 {
        self.beta
    }
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// The six parameters in `(a, b, c, alpha, beta, gamma)` order.
    pub fn parameters(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }

    /// Returns a copy with the c edge replaced.
    pub fn with_c(&self, c: f64) -> Result<Self, ModelError> {
        Self::new(self.a, self.b, c, self.alpha, self.beta, self.gamma)
    }

    /// Returns a copy with the c edge multiplied by the stack count.
    pub fn stretched_c(&self, n_stacks: usize) -> Result<Self, ModelError> {
        self.with_c(self.c * n_stacks as f64)
    }

    pub fn volume(&self) -> f64 {
        let (ca, cb, cg) = self.angle_cosines();
        self.a
            * self.b
            * self.c
            * (1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg)
                .max(0.0)
                .sqrt()
    }

    /// Row-major matrix whose rows are the a, b and c lattice vectors in
    /// Cartesian coordinates (a along x, b in the xy plane).
    pub fn to_cartesian_matrix(&self) -> Matrix3<f64> {
        let (ca, cb, cg) = self.angle_cosines();
        let sg = self.gamma.to_radians().sin();
        let v = (1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg)
            .max(0.0)
            .sqrt();
        Matrix3::new(
            self.a,
            0.0,
            0.0,
            self.b * cg,
            self.b * sg,
            0.0,
            self.c * cb,
            self.c * (ca - cb * cg) / sg,
            self.c * v / sg,
        )
    }

    fn angle_cosines(&self) -> (f64, f64, f64) {
        (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        )
    }
}
