use nalgebra::{Point3, Vector3};

const DEGENERATE_LENGTH: f64 = 1e-10;

/// Cosine of the angle between two vectors together with its gradients.
#[derive(Debug, Clone, Copy)]
pub struct UnitDot {
    pub cos: f64,
    /// Gradient of `cos` with respect to the first vector.
    pub d_first: Vector3<f64>,
    /// Gradient of `cos` with respect to the second vector.
    pub d_second: Vector3<f64>,
}

/// Computes `û(p)·û(q)` and its gradients with respect to `p` and `q`.
///
/// Returns `None` when either vector is (numerically) zero.
pub fn unit_dot_with_gradient(p: &Vector3<f64>, q: &Vector3<f64>) -> Option<UnitDot> {
    let p_len = p.norm();
    let q_len = q.norm();
    if p_len < DEGENERATE_LENGTH || q_len < DEGENERATE_LENGTH {
        return None;
    }
    let p_hat = p / p_len;
    let q_hat = q / q_len;
    let cos = p_hat.dot(&q_hat);
    Some(UnitDot {
        cos,
        d_first: (q_hat - p_hat * cos) / p_len,
        d_second: (p_hat - q_hat * cos) / q_len,
    })
}

/// Cosine of the dihedral p1-p2-p3-p4 together with its gradient on each point.
#[derive(Debug, Clone, Copy)]
pub struct CosDihedral {
    pub cos: f64,
    pub gradients: [Vector3<f64>; 4],
}

/// Computes the cosine of the dihedral angle p1-p2-p3-p4 and its gradients.
///
/// Returns `None` if three consecutive points are collinear.
pub fn cos_dihedral_with_gradient(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> Option<CosDihedral> {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let n1_len = n1.norm();
    let n2_len = n2.norm();
    if n1_len < DEGENERATE_LENGTH || n2_len < DEGENERATE_LENGTH {
        return None;
    }
    let u = n1 / n1_len;
    let v = n2 / n2_len;
    let cos = u.dot(&v);

    let g1 = (v - u * cos) / n1_len;
    let g2 = (u - v * cos) / n2_len;

    let grad_b1 = b2.cross(&g1);
    let grad_b2 = g1.cross(&b1) + b3.cross(&g2);
    let grad_b3 = g2.cross(&b2);

    Some(CosDihedral {
        cos,
        gradients: [-grad_b1, grad_b1 - grad_b2, grad_b2 - grad_b3, grad_b3],
    })
}

/// Dihedral angle p1-p2-p3-p4 in degrees, in (-180, 180].
pub fn dihedral_degrees(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> f64 {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m1 = n1.cross(&b2.normalize());
    let x = n1.dot(&n2);
    let y = m1.dot(&n2);
    (-y).atan2(x).to_degrees()
}

#[inline]
pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    nalgebra::center(a, b)
}
