use serde::Deserialize;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut};

/// Hydrogen-bond score terms an evaluation can contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    HbondSrBb,
    HbondLrBb,
    HbondBbSc,
    HbondSc,
    HbondIntra,
    /// Bonds involving hybrid water.
    HbondWat,
    /// Entropy penalty for a water molecule bound to a single partner.
    WatEntropy,
    /// Intra-residue sink used when intra bonds go into the total.
    Hbond,
}

impl ScoreType {
    pub const COUNT: usize = 8;

    pub const ALL: [ScoreType; Self::COUNT] = [
        Self::HbondSrBb,
        Self::HbondLrBb,
        Self::HbondBbSc,
        Self::HbondSc,
        Self::HbondIntra,
        Self::HbondWat,
        Self::WatEntropy,
        Self::Hbond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HbondSrBb => "hbond_sr_bb",
            Self::HbondLrBb => "hbond_lr_bb",
            Self::HbondBbSc => "hbond_bb_sc",
            Self::HbondSc => "hbond_sc",
            Self::HbondIntra => "hbond_intra",
            Self::HbondWat => "hbond_wat",
            Self::WatEntropy => "wat_entropy",
            Self::Hbond => "hbond",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-term energies (or weights) indexed by [`ScoreType`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyMap {
    values: [f64; ScoreType::COUNT],
}

impl EnergyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with every term set to `value`.
    pub fn filled(value: f64) -> Self {
        Self {
            values: [value; ScoreType::COUNT],
        }
    }

    pub fn with(mut self, score_type: ScoreType, value: f64) -> Self {
        self[score_type] = value;
        self
    }

    /// Weighted sum `Σ self[t] * weights[t]`.
    pub fn dot(&self, weights: &EnergyMap) -> f64 {
        self.values
            .iter()
            .zip(weights.values.iter())
            .map(|(e, w)| e * w)
            .sum()
    }

    /// Unweighted sum of all terms.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreType, f64)> + '_ {
        ScoreType::ALL.iter().map(|&t| (t, self[t]))
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Index<ScoreType> for EnergyMap {
    type Output = f64;

    fn index(&self, score_type: ScoreType) -> &f64 {
        &self.values[score_type as usize]
    }
}

impl IndexMut<ScoreType> for EnergyMap {
    fn index_mut(&mut self, score_type: ScoreType) -> &mut f64 {
        &mut self.values[score_type as usize]
    }
}

impl Add for EnergyMap {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for EnergyMap {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.values.iter_mut().zip(rhs.values.iter()) {
            *a += b;
        }
    }
}
