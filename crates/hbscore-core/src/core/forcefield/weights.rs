use super::potentials::burial_weight;
use crate::core::models::membrane::MembraneGeometry;
use nalgebra::Point3;

/// Below this combined neighbor count a pair is treated as exposed.
const EXPOSED_TOTAL_NEIGHBORS: usize = 14;
/// At or above this combined neighbor count a pair is treated as buried.
const BURIED_TOTAL_NEIGHBORS: usize = 28;

/// Environment (burial) weight of a donor/acceptor residue pair.
///
/// The smooth form averages the per-residue burial weights; the stepped form
/// classifies the combined neighbor count as exposed, intermediate or buried.
pub fn environment_weight(smooth: bool, don_neighbors: usize, acc_neighbors: usize) -> f64 {
    if smooth {
        0.5 * (burial_weight(don_neighbors) + burial_weight(acc_neighbors))
    } else {
        let total = don_neighbors + acc_neighbors;
        if total < EXPOSED_TOTAL_NEIGHBORS {
            0.5
        } else if total < BURIED_TOTAL_NEIGHBORS {
            0.75
        } else {
            1.0
        }
    }
}

/// Fraction of the way from the membrane core (0) to bulk solvent (1).
#[inline]
fn solvent_fraction(membrane: &MembraneGeometry, point: &Point3<f64>) -> f64 {
    let z = membrane.depth(point).abs() / membrane.thickness;
    let zn = z.powf(membrane.steepness);
    zn / (1.0 + zn)
}

/// Blends the environment weight toward 1 as the bond leaves the membrane core.
///
/// Inside the hydrophobic core the bond keeps full strength (weight 1); in
/// bulk solvent it gets the ordinary environment weight.
pub fn membrane_weight(
    membrane: &MembraneGeometry,
    env_weight: f64,
    hydrogen: &Point3<f64>,
    acceptor: &Point3<f64>,
) -> f64 {
    let f = 0.5 * (solvent_fraction(membrane, hydrogen) + solvent_fraction(membrane, acceptor));
    f * env_weight + (1.0 - f)
}

/// Helix-length scaling of short-range backbone/backbone bonds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixLengthScale {
    pub low_scale: f64,
    pub high_scale: f64,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for HelixLengthScale {
    fn default() -> Self {
        Self {
            low_scale: 0.5,
            high_scale: 2.0,
            min_length: 4,
            max_length: 17,
        }
    }
}

impl HelixLengthScale {
    /// Scale for a bond inside a helix of `length` residues.
    pub fn scale(&self, length: usize) -> f64 {
        if length <= self.min_length {
            self.low_scale
        } else if length >= self.max_length {
            self.high_scale
        } else {
            let t = (length - self.min_length) as f64 / (self.max_length - self.min_length) as f64;
            self.low_scale + t * (self.high_scale - self.low_scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn smooth_environment_weight_averages_burial() {
        let w = environment_weight(true, 3, 30);
        assert!((w - 0.55).abs() < 1e-12);
    }

    #[test]
    fn stepped_environment_weight_uses_total_neighbor_classes() {
        assert_eq!(environment_weight(false, 5, 5), 0.5);
        assert_eq!(environment_weight(false, 10, 10), 0.75);
        assert_eq!(environment_weight(false, 14, 14), 1.0);
    }

    #[test]
    fn membrane_weight_is_full_in_core_and_environmental_in_solvent() {
        let membrane = MembraneGeometry::new(Point3::origin(), Vector3::z(), 15.0, 10.0);
        let core = Point3::new(0.0, 0.0, 0.0);
        let far = Point3::new(0.0, 0.0, 60.0);
        assert!((membrane_weight(&membrane, 0.4, &core, &core) - 1.0).abs() < 1e-9);
        assert!((membrane_weight(&membrane, 0.4, &far, &far) - 0.4).abs() < 1e-5);
        let edge = Point3::new(0.0, 0.0, 15.0);
        assert!((membrane_weight(&membrane, 0.4, &edge, &edge) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn helix_length_scale_interpolates_between_bounds() {
        let scale = HelixLengthScale::default();
        assert_eq!(scale.scale(3), 0.5);
        assert_eq!(scale.scale(4), 0.5);
        assert_eq!(scale.scale(20), 2.0);
        let mid = scale.scale(10);
        assert!((mid - (0.5 + 6.0 / 13.0 * 1.5)).abs() < 1e-12);
    }
}
