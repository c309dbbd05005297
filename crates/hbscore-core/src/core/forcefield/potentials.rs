/// One-dimensional polynomial used for the distance and angular terms.
///
/// Coefficients are stored from the highest degree down. Outside `[xmin, xmax]`
/// the argument is clamped, so the value is flat and the derivative is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial1D {
    pub name: String,
    pub xmin: f64,
    pub xmax: f64,
    pub coefficients: Vec<f64>,
}

impl Polynomial1D {
    pub fn new(name: &str, xmin: f64, xmax: f64, coefficients: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            xmin,
            xmax,
            coefficients,
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    #[inline]
    pub fn value(&self, x: f64) -> f64 {
        self.value_deriv(x).0
    }

    /// Returns the value and first derivative at `x` (Horner's scheme).
    pub fn value_deriv(&self, x: f64) -> (f64, f64) {
        let clamped = x < self.xmin || x > self.xmax;
        let x = x.clamp(self.xmin, self.xmax);

        let mut value = 0.0;
        let mut deriv = 0.0;
        for &c in &self.coefficients {
            deriv = deriv * x + value;
            value = value * x + c;
        }

        if clamped { (value, 0.0) } else { (value, deriv) }
    }
}

/// Linear fade from 1 at `start` to 0 at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeInterval {
    pub start: f64,
    pub end: f64,
}

impl FadeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns the fade value and its derivative with respect to `x`.
    #[inline]
    pub fn value_deriv(&self, x: f64) -> (f64, f64) {
        if x <= self.start {
            (1.0, 0.0)
        } else if x >= self.end {
            (0.0, 0.0)
        } else {
            let width = self.end - self.start;
            ((self.end - x) / width, -1.0 / width)
        }
    }
}

/// Cubic Hermite step: 0 below `lo`, 1 above `hi`, `t²(3 - 2t)` between.
#[inline]
pub fn smoothstep(x: f64, lo: f64, hi: f64) -> f64 {
    if x <= lo {
        0.0
    } else if x >= hi {
        1.0
    } else {
        let t = (x - lo) / (hi - lo);
        t * t * (3.0 - 2.0 * t)
    }
}

const BURIAL_LOW_COUNT: f64 = 7.0;
const BURIAL_HIGH_COUNT: f64 = 24.0;
const BURIAL_MIN_WEIGHT: f64 = 0.1;

/// Burial weight of a residue from its neighbor count.
#[inline]
pub fn burial_weight(neighbors: usize) -> f64 {
    let nb = neighbors as f64;
    if nb < BURIAL_LOW_COUNT {
        BURIAL_MIN_WEIGHT
    } else if nb > BURIAL_HIGH_COUNT {
        1.0
    } else {
        (nb - 2.75) * (0.9 / 21.25)
    }
}
