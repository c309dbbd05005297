use nalgebra::{Point3, Unit, Vector3};
use serde::Deserialize;

/// Implicit membrane slab described by its center, normal and half thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneGeometry {
    pub center: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
    /// Half thickness of the hydrophobic core, in Angstroms.
    pub thickness: f64,
    /// Steepness of the transition between the core and the solvent.
    pub steepness: f64,
}

impl MembraneGeometry {
    pub fn new(center: Point3<f64>, normal: Vector3<f64>, thickness: f64, steepness: f64) -> Self {
        Self {
            center,
            normal: Unit::new_normalize(normal),
            thickness,
            steepness,
        }
    }

    /// Signed distance of a point from the membrane center plane.
    #[inline]
    pub fn depth(&self, point: &Point3<f64>) -> f64 {
        (point - self.center).dot(&self.normal)
    }
}

impl Default for MembraneGeometry {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::z(), 15.0, 10.0)
    }
}

/// Serializable form of [`MembraneGeometry`] used by configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MembraneSpec {
    pub center: [f64; 3],
    pub normal: [f64; 3],
    pub thickness: f64,
    pub steepness: f64,
}

impl From<MembraneSpec> for MembraneGeometry {
    fn from(spec: MembraneSpec) -> Self {
        Self::new(
            Point3::from(spec.center),
            Vector3::from(spec.normal),
            spec.thickness,
            spec.steepness,
        )
    }
}
