use super::energy::HBondGradient;
use nalgebra::{Point3, Vector3};
use std::ops::AddAssign;

/// Per-atom derivative in the form minimizers consume: `f2 = ∂E/∂x` and
/// `f1 = x × f2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivVectorPair {
    pub f1: Vector3<f64>,
    pub f2: Vector3<f64>,
}

impl Default for DerivVectorPair {
    fn default() -> Self {
        Self {
            f1: Vector3::zeros(),
            f2: Vector3::zeros(),
        }
    }
}

impl DerivVectorPair {
    pub fn from_gradient(position: &Point3<f64>, gradient: &Vector3<f64>) -> Self {
        Self {
            f1: position.coords.cross(gradient),
            f2: *gradient,
        }
    }
}

impl AddAssign for DerivVectorPair {
    fn add_assign(&mut self, rhs: Self) {
        self.f1 += rhs.f1;
        self.f2 += rhs.f2;
    }
}

/// Which side of a donor/acceptor pair an atom belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondSide {
    Donor,
    Acceptor,
}

/// Maps the five geometric slots of a hydrogen bond onto residue atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HBDerivAssigner {
    pub donor: usize,
    pub hydrogen: usize,
    pub acceptor: usize,
    pub base: usize,
    pub base2: usize,
}

impl HBDerivAssigner {
    /// Yields `(side, atom index, gradient)` for every slot of `gradient`
    /// scaled by `weight`.
    pub fn assign(
        &self,
        gradient: &HBondGradient,
        weight: f64,
    ) -> [(BondSide, usize, Vector3<f64>); 5] {
        [
            (BondSide::Donor, self.donor, gradient.donor * weight),
            (BondSide::Donor, self.hydrogen, gradient.hydrogen * weight),
            (BondSide::Acceptor, self.acceptor, gradient.acceptor * weight),
            (BondSide::Acceptor, self.base, gradient.base * weight),
            (BondSide::Acceptor, self.base2, gradient.base2 * weight),
        ]
    }
}
