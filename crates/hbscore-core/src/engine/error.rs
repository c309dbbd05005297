use thiserror::Error;

use super::config::{ConfigError, ResidueSpecifier};
use crate::core::forcefield::params::ParamLoadError;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::ChemistryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parameter database error: {0}")]
    Parameters(#[from] ParamLoadError),

    #[error("Chemistry error: {0}")]
    Chemistry(#[from] ChemistryError),

    #[error("Residue not found in system: {spec}")]
    ResidueNotFound { spec: ResidueSpecifier },

    #[error("Membrane framework scoring requires a structure with membrane geometry")]
    MissingMembrane,

    #[error("Rotamer set at sequence position {seqpos} has no trie; prepare it for packing first")]
    MissingTrie { seqpos: usize },

    #[error("No minimization data for residue {residue_id:?}")]
    MissingMinimizationData { residue_id: ResidueId },

    #[error("Rotamer set for sequence position {seqpos} is empty")]
    EmptyRotamerSet { seqpos: usize },
}
