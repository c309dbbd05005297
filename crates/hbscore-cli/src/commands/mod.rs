pub mod rotamers;
pub mod score;

use crate::error::{CliError, Result};
use hbscore::core::io::{bgf::BgfFile, traits::MolecularFile};
use hbscore::core::models::system::MolecularSystem;
use hbscore::core::topology::registry::ChemistryRegistry;
use hbscore::engine::error::EngineError;
use std::path::Path;
use tracing::info;

/// Reads a BGF structure and assigns its hydrogen-bond chemistry.
pub fn load_structure(path: &Path, chemistry: &ChemistryRegistry) -> Result<MolecularSystem> {
    info!("Loading structure from {:?}", path);
    let (mut system, metadata) =
        BgfFile::read_from_path(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
    if metadata.dropped_bonds > 0 {
        info!(
            "Ignored {} CONECT bond(s) between residues.",
            metadata.dropped_bonds
        );
    }
    chemistry.apply(&mut system).map_err(EngineError::from)?;
    info!("Loaded {} residue(s).", system.total_residue());
    Ok(system)
}
