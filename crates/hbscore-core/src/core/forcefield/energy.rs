use super::params::HBondDatabase;
use super::types::{HBEvalTuple, Hybridization};
use crate::core::utils::geometry::{cos_dihedral_with_gradient, midpoint, unit_dot_with_gradient};
use nalgebra::{Point3, Vector3};

/// Largest H···A distance at which a hydrogen bond is evaluated.
pub const MAX_R: f64 = 3.0;
pub const MAX_R2: f64 = MAX_R * MAX_R;

/// Coordinates of the five atoms that define a hydrogen bond.
///
/// For sp3 acceptors `base2` is ignored; for ring acceptors the acceptor is
/// oriented by the midpoint of `base` and `base2`.
#[derive(Debug, Clone, Copy)]
pub struct HBondGeometry {
    pub donor: Point3<f64>,
    pub hydrogen: Point3<f64>,
    pub acceptor: Point3<f64>,
    pub base: Point3<f64>,
    pub base2: Point3<f64>,
}

/// Gradient of the raw energy with respect to each of the five atoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HBondGradient {
    pub donor: Vector3<f64>,
    pub hydrogen: Vector3<f64>,
    pub acceptor: Vector3<f64>,
    pub base: Vector3<f64>,
    pub base2: Vector3<f64>,
}

impl Default for HBondGradient {
    fn default() -> Self {
        Self {
            donor: Vector3::zeros(),
            hydrogen: Vector3::zeros(),
            acceptor: Vector3::zeros(),
            base: Vector3::zeros(),
            base2: Vector3::zeros(),
        }
    }
}

impl HBondGradient {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            donor: self.donor * factor,
            hydrogen: self.hydrogen * factor,
            acceptor: self.acceptor * factor,
            base: self.base * factor,
            base2: self.base2 * factor,
        }
    }
}

/// Raw (unweighted) hydrogen-bond energy.
pub fn hb_energy(database: &HBondDatabase, tuple: &HBEvalTuple, geometry: &HBondGeometry) -> f64 {
    hb_energy_deriv(database, tuple, geometry, false).0
}

/// Raw hydrogen-bond energy and, when `evaluate_gradient` is set, its gradient.
///
/// `E = P_r(r) + F(r) * (P_ahd(x_d) + P_bah(x_h) + P_chi)` with
/// `x_d = û(H - D)·û(A - H)`, `x_h = û(A - B)·û(H - A)` and, for sp2
/// acceptors, `P_chi = amplitude * (1 - cos²χ)` over the dihedral B2-B-A-H.
/// Degenerate geometries (coincident atoms) produce no bond.
pub fn hb_energy_deriv(
    database: &HBondDatabase,
    tuple: &HBEvalTuple,
    geometry: &HBondGeometry,
    evaluate_gradient: bool,
) -> (f64, Option<HBondGradient>) {
    let params = database.params(tuple);
    let hybridization = tuple.acc_hybridization();

    let d = &geometry.donor;
    let h = &geometry.hydrogen;
    let a = &geometry.acceptor;
    let b = match hybridization {
        Hybridization::Ring => midpoint(&geometry.base, &geometry.base2),
        _ => geometry.base,
    };

    let ha = a - h;
    let r = ha.norm();
    if r > MAX_R || r < 1e-10 {
        return (0.0, None);
    }

    let Some(xd) = unit_dot_with_gradient(&(h - d), &ha) else {
        return (0.0, None);
    };
    let Some(xh) = unit_dot_with_gradient(&(a - b), &(h - a)) else {
        return (0.0, None);
    };

    let (e_r, de_r) = params.distance.value_deriv(r);
    let (fade, dfade) = params.fade.value_deriv(r);
    let (e_xd, de_xd) = params.cos_ahd.value_deriv(xd.cos);
    let (e_xh, de_xh) = params.cos_bah.value_deriv(xh.cos);

    let chi = if hybridization == Hybridization::Sp2 && params.chi_amplitude != 0.0 {
        cos_dihedral_with_gradient(&geometry.base2, &b, a, h)
    } else {
        None
    };
    let (e_chi, de_chi) = match &chi {
        Some(cd) => (
            params.chi_amplitude * (1.0 - cd.cos * cd.cos),
            -2.0 * params.chi_amplitude * cd.cos,
        ),
        None => (0.0, 0.0),
    };

    let angular = e_xd + e_xh + e_chi;
    let energy = e_r + fade * angular;

    if !evaluate_gradient {
        return (energy, None);
    }

    let mut grad = HBondGradient::default();

    // Distance terms act along H->A.
    let r_hat = ha / r;
    let de_dr = de_r + dfade * angular;
    grad.acceptor += r_hat * de_dr;
    grad.hydrogen -= r_hat * de_dr;

    // x_d: first vector H - D, second A - H.
    let wd = fade * de_xd;
    grad.donor -= xd.d_first * wd;
    grad.hydrogen += (xd.d_first - xd.d_second) * wd;
    grad.acceptor += xd.d_second * wd;

    // x_h: first vector A - B, second H - A.
    let wh = fade * de_xh;
    let mut grad_b = -xh.d_first * wh;
    grad.acceptor += (xh.d_first - xh.d_second) * wh;
    grad.hydrogen += xh.d_second * wh;

    if let Some(cd) = &chi {
        let wc = fade * de_chi;
        grad.base2 += cd.gradients[0] * wc;
        grad_b += cd.gradients[1] * wc;
        grad.acceptor += cd.gradients[2] * wc;
        grad.hydrogen += cd.gradients[3] * wc;
    }

    match hybridization {
        Hybridization::Ring => {
            grad.base += grad_b * 0.5;
            grad.base2 += grad_b * 0.5;
        }
        _ => grad.base += grad_b,
    }

    (energy, Some(grad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::types::{HBAccChemType, HBDonChemType};

    fn database() -> HBondDatabase {
        HBondDatabase::standard().unwrap()
    }

    fn bb_tuple(sep: isize) -> HBEvalTuple {
        HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Pba, true, sep, true)
    }

    /// Linear N-H···O=C with H···O = `r` and a planar acceptor.
    fn linear_geometry(r: f64) -> HBondGeometry {
        HBondGeometry {
            donor: Point3::new(-1.01, 0.0, 0.0),
            hydrogen: Point3::new(0.0, 0.0, 0.0),
            acceptor: Point3::new(r, 0.0, 0.0),
            base: Point3::new(r + 1.23, 0.0, 0.0),
            base2: Point3::new(r + 1.9, 1.2, 0.0),
        }
    }

    fn bent_geometry() -> HBondGeometry {
        HBondGeometry {
            donor: Point3::new(-0.95, 0.3, 0.1),
            hydrogen: Point3::new(0.0, 0.0, 0.0),
            acceptor: Point3::new(2.05, 0.25, -0.15),
            base: Point3::new(3.1, 0.9, 0.2),
            base2: Point3::new(3.4, 2.2, 0.9),
        }
    }

    #[test]
    fn canonical_linear_backbone_bond_is_at_the_well_minimum() {
        let e = hb_energy(&database(), &bb_tuple(4), &linear_geometry(1.9));
        assert!((e + 1.0).abs() < 1e-3, "energy was {e}");
    }

    #[test]
    fn energy_vanishes_at_and_beyond_cutoff() {
        let db = database();
        assert!(hb_energy(&db, &bb_tuple(4), &linear_geometry(3.0)).abs() < 1e-3);
        assert_eq!(hb_energy(&db, &bb_tuple(4), &linear_geometry(3.2)), 0.0);
    }

    #[test]
    fn bent_geometry_is_less_favorable_than_linear() {
        let db = database();
        let linear = hb_energy(&db, &bb_tuple(8), &linear_geometry(2.05));
        let bent = hb_energy(&db, &bb_tuple(8), &bent_geometry());
        assert!(bent > linear);
    }

    fn check_gradient(tuple: HBEvalTuple, geometry: HBondGeometry) {
        let db = database();
        let (_, grad) = hb_energy_deriv(&db, &tuple, &geometry, true);
        let grad = grad.unwrap();
        let analytic = [grad.donor, grad.hydrogen, grad.acceptor, grad.base, grad.base2];
        let step = 1e-6;
        for (slot, expected) in analytic.iter().enumerate() {
            for k in 0..3 {
                let shifted = |delta: f64| {
                    let mut g = geometry;
                    let p = match slot {
                        0 => &mut g.donor,
                        1 => &mut g.hydrogen,
                        2 => &mut g.acceptor,
                        3 => &mut g.base,
                        _ => &mut g.base2,
                    };
                    p[k] += delta;
                    hb_energy(&db, &tuple, &g)
                };
                let numeric = (shifted(step) - shifted(-step)) / (2.0 * step);
                let tolerance = 1e-4 * numeric.abs().max(1.0);
                assert!(
                    (expected[k] - numeric).abs() < tolerance,
                    "slot {slot} axis {k}: analytic {} vs numeric {numeric}",
                    expected[k]
                );
            }
        }
    }

    #[test]
    fn sp2_gradient_matches_finite_differences() {
        check_gradient(bb_tuple(8), bent_geometry());
    }

    #[test]
    fn sp3_gradient_matches_finite_differences() {
        let tuple =
            HBEvalTuple::classify(HBDonChemType::Amo, false, HBAccChemType::Ahx, false, 7, true);
        check_gradient(tuple, bent_geometry());
    }

    #[test]
    fn ring_gradient_matches_finite_differences() {
        let tuple =
            HBEvalTuple::classify(HBDonChemType::Ahx, false, HBAccChemType::Imd, false, 7, true);
        check_gradient(tuple, bent_geometry());
    }
}
