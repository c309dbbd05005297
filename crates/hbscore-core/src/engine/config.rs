use crate::core::forcefield::term::{EnergyMap, ScoreType};
use crate::core::forcefield::weights::HelixLengthScale;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration file '{path}': {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// A residue addressed by chain and residue number, as written in structure files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueSpecifier {
    pub chain_id: char,
    pub residue_number: isize,
}

impl fmt::Display for ResidueSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.residue_number)
    }
}

/// Parses `CHAIN:NUMBER`, e.g. `A:42`.
impl FromStr for ResidueSpecifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidParameter {
            name: "residue",
            reason: format!("'{s}' is not of the form CHAIN:NUMBER"),
        };
        let (chain, number) = s.split_once(':').ok_or_else(invalid)?;
        let mut chars = chain.trim().chars();
        let (Some(chain_id), None) = (chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let residue_number = number.trim().parse().map_err(|_| invalid())?;
        Ok(Self {
            chain_id,
            residue_number,
        })
    }
}

/// How (and whether) membrane depth reweights hydrogen bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembraneMode {
    #[default]
    None,
    /// Implicit membrane; falls back to the default slab when the structure has none.
    Implicit,
    /// Membrane framework; the structure must carry its membrane geometry.
    Framework,
}

impl MembraneMode {
    #[inline]
    pub fn is_active(&self) -> bool {
        !matches!(self, MembraneMode::None)
    }
}

/// Switches of the hydrogen-bond energy method.
///
/// Read-only during evaluation. Every field has a default, so a TOML table
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HBondOptions {
    pub exclude_dna_dna: bool,
    /// Enforce the backbone/sidechain exclusion rule.
    pub bb_donor_acceptor_check: bool,
    /// Evaluate backbone/backbone bonds pairwise instead of adding them once
    /// from the hydrogen-bond set at the end of scoring.
    pub decompose_bb_hb_into_pair_energies: bool,
    pub use_hb_env_dep: bool,
    pub use_hb_env_dep_dna: bool,
    pub smooth_hb_env_dep: bool,
    /// Bonds with a raw energy at or above this value are not formed.
    pub max_hb_energy: f64,
    pub include_intra_res_rna: bool,
    pub include_intra_res_protein: bool,
    pub put_intra_into_total: bool,
    pub membrane: MembraneMode,
    pub length_dependent_srbb: bool,
    pub length_dependent_srbb_lowscale: f64,
    pub length_dependent_srbb_highscale: f64,
    pub length_dependent_srbb_minlength: usize,
    pub length_dependent_srbb_maxlength: usize,
    /// Hybrid explicit-water scoring (`TP3` waters).
    pub water_hybrid_sf: bool,
    /// Distance from a hybrid water within which a residue counts as near water.
    pub water_proximity_cutoff: f64,
}

impl Default for HBondOptions {
    fn default() -> Self {
        let ssdep = HelixLengthScale::default();
        Self {
            exclude_dna_dna: true,
            bb_donor_acceptor_check: true,
            decompose_bb_hb_into_pair_energies: false,
            use_hb_env_dep: true,
            use_hb_env_dep_dna: true,
            smooth_hb_env_dep: true,
            max_hb_energy: 0.0,
            include_intra_res_rna: false,
            include_intra_res_protein: false,
            put_intra_into_total: false,
            membrane: MembraneMode::None,
            length_dependent_srbb: false,
            length_dependent_srbb_lowscale: ssdep.low_scale,
            length_dependent_srbb_highscale: ssdep.high_scale,
            length_dependent_srbb_minlength: ssdep.min_length,
            length_dependent_srbb_maxlength: ssdep.max_length,
            water_hybrid_sf: false,
            water_proximity_cutoff: 4.0,
        }
    }
}

impl HBondOptions {
    /// Helix-length scaling of short-range backbone bonds.
    pub fn ssdep_params(&self) -> HelixLengthScale {
        HelixLengthScale {
            low_scale: self.length_dependent_srbb_lowscale,
            high_scale: self.length_dependent_srbb_highscale,
            min_length: self.length_dependent_srbb_minlength,
            max_length: self.length_dependent_srbb_maxlength,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_hb_energy.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "max-hb-energy",
                reason: "must be a finite number".into(),
            });
        }
        if self.length_dependent_srbb_minlength >= self.length_dependent_srbb_maxlength {
            return Err(ConfigError::InvalidParameter {
                name: "length-dependent-srbb-minlength",
                reason: format!(
                    "must be below the maximum length ({})",
                    self.length_dependent_srbb_maxlength
                ),
            });
        }
        if !(self.water_proximity_cutoff > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "water-proximity-cutoff",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct HBondOptionsBuilder {
    options: HBondOptions,
}

impl HBondOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: HBondOptions) -> Self {
        Self { options }
    }

    pub fn exclude_dna_dna(mut self, value: bool) -> Self {
        self.options.exclude_dna_dna = value;
        self
    }
    pub fn bb_donor_acceptor_check(mut self, value: bool) -> Self {
        self.options.bb_donor_acceptor_check = value;
        self
    }
    pub fn decompose_bb_hb_into_pair_energies(mut self, value: bool) -> Self {
        self.options.decompose_bb_hb_into_pair_energies = value;
        self
    }
    pub fn use_hb_env_dep(mut self, value: bool) -> Self {
        self.options.use_hb_env_dep = value;
        self
    }
    pub fn use_hb_env_dep_dna(mut self, value: bool) -> Self {
        self.options.use_hb_env_dep_dna = value;
        self
    }
    pub fn smooth_hb_env_dep(mut self, value: bool) -> Self {
        self.options.smooth_hb_env_dep = value;
        self
    }
    pub fn max_hb_energy(mut self, value: f64) -> Self {
        self.options.max_hb_energy = value;
        self
    }
    pub fn include_intra_res_rna(mut self, value: bool) -> Self {
        self.options.include_intra_res_rna = value;
        self
    }
    pub fn include_intra_res_protein(mut self, value: bool) -> Self {
        self.options.include_intra_res_protein = value;
        self
    }
    pub fn put_intra_into_total(mut self, value: bool) -> Self {
        self.options.put_intra_into_total = value;
        self
    }
    pub fn membrane(mut self, mode: MembraneMode) -> Self {
        self.options.membrane = mode;
        self
    }
    pub fn length_dependent_srbb(mut self, value: bool) -> Self {
        self.options.length_dependent_srbb = value;
        self
    }
    pub fn length_dependent_srbb_scales(mut self, low: f64, high: f64) -> Self {
        self.options.length_dependent_srbb_lowscale = low;
        self.options.length_dependent_srbb_highscale = high;
        self
    }
    pub fn length_dependent_srbb_lengths(mut self, min: usize, max: usize) -> Self {
        self.options.length_dependent_srbb_minlength = min;
        self.options.length_dependent_srbb_maxlength = max;
        self
    }
    pub fn water_hybrid_sf(mut self, value: bool) -> Self {
        self.options.water_hybrid_sf = value;
        self
    }
    pub fn water_proximity_cutoff(mut self, value: f64) -> Self {
        self.options.water_proximity_cutoff = value;
        self
    }

    pub fn build(self) -> Result<HBondOptions, ConfigError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Method options and score weights, as read from a TOML file.
///
/// ```toml
/// [hbond]
/// decompose-bb-hb-into-pair-energies = true
///
/// [weights]
/// hbond_sc = 1.1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub hbond: HBondOptions,
    weights: HashMap<ScoreType, f64>,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: source.to_path_buf(),
            source: e,
        })?;
        config.hbond.validate()?;
        Ok(config)
    }

    /// Score weights; terms not listed in the file weigh 1.
    pub fn weights(&self) -> EnergyMap {
        let mut weights = EnergyMap::filled(1.0);
        for (&score_type, &weight) in &self.weights {
            weights[score_type] = weight;
        }
        weights
    }
}
