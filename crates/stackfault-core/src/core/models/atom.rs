use super::error::ModelError;
use crate::core::utils::elements;
use nalgebra::{Point3, Vector3};

/// A single atom within a layer.
///
/// The atom stores its base label (e.g. `"O1"`) and the name of the layer it
/// belongs to separately; the full label is always rendered as
/// `<base_label>_<layer>`. Moving an atom to another layer replaces the suffix
/// rather than appending to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerAtom {
    /// Base label without any layer suffix.
    base_label: String,
    /// Name of the enclosing layer.
    layer: String,
    /// Element or element/oxidation-state tag (e.g. "Fe3+").
    element: String,
    /// Fractional coordinates.
    position: Point3<f64>,
    /// Site occupancy fraction in [0, 1].
    occupancy: f64,
}

impl LayerAtom {
    /// Creates an atom belonging to `layer`.
    ///
    /// If `label` already ends in `_<layer>` the suffix is stripped so that
    /// labels never accumulate layer names.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyLabel` for a blank label,
    /// `ModelError::UnknownElement` if the element tag names no element, and
    /// `ModelError::InvalidOccupancy` if the occupancy is outside [0, 1].
    pub fn new(
        label: &str,
        layer: &str,
        element: &str,
        position: Point3<f64>,
        occupancy: f64,
    ) -> Result<Self, ModelError> {
        let base_label = strip_layer_suffix(label.trim(), layer);
        if base_label.is_empty() {
            return Err(ModelError::EmptyLabel {
                layer: layer.to_string(),
            });
        }
        let full_label = format!("{}_{}", base_label, layer);
        if !elements::is_valid_element_tag(element) {
            return Err(ModelError::UnknownElement {
                label: full_label,
                tag: element.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&occupancy) {
            return Err(ModelError::InvalidOccupancy {
                label: full_label,
                occupancy,
            });
        }
        Ok(Self {
            base_label: base_label.to_string(),
            layer: layer.to_string(),
            element: element.trim().to_string(),
            position,
            occupancy,
        })
    }

    /// The full label, `<base_label>_<layer>`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.base_label, self.layer)
    }

    pub fn base_label(&self) -> &str {
        &self.base_label
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// The bare element symbol with any oxidation state removed.
    pub fn element_symbol(&self) -> &'static str {
        // The tag was validated at construction.
        elements::element_symbol(&self.element).unwrap_or("X")
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }
    pub fn y(&self) -> f64 {
        self.position.y
    }
    pub fn z(&self) -> f64 {
        self.position.z
    }

    pub fn occupancy(&self) -> f64 {
        self.occupancy
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }
    pub fn set_x(&mut self, x: f64) {
        self.position.x = x;
    }
    pub fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }
    pub fn set_z(&mut self, z: f64) {
        self.position.z = z;
    }

    /// Returns a copy rigidly shifted by `offset` (fractional units).
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            position: self.position + offset,
            ..self.clone()
        }
    }

    /// Returns a copy reassigned to `layer`; the label suffix follows.
    pub fn with_layer(&self, layer: &str) -> Self {
        Self {
            layer: layer.to_string(),
            ..self.clone()
        }
    }
}

fn strip_layer_suffix<'a>(label: &'a str, layer: &str) -> &'a str {
    label
        .strip_suffix(layer)
        .and_then(|rest| rest.strip_suffix('_'))
        .unwrap_or(label)
}
