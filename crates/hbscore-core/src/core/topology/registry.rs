use crate::core::forcefield::types::{HBAccChemType, HBDonChemType};
use crate::core::models::atom::AtomRole;
use crate::core::models::chain::ChainType;
use crate::core::models::residue::{ChemistryError, Residue};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::identifiers::{is_backbone_atom, is_nucleic_backbone_atom};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

const STANDARD_CHEMISTRY: &str = include_str!("../../../data/chemistry.toml");

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DonorDefinition {
    pub atom: String,
    pub hydrogens: Vec<String>,
    pub chem: HBDonChemType,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AcceptorDefinition {
    pub atom: String,
    pub base: String,
    #[serde(default)]
    pub base2: Option<String>,
    pub chem: HBAccChemType,
}

/// Donors and acceptors of one residue type or of a shared backbone.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GroupChemistry {
    #[serde(default)]
    pub donors: Vec<DonorDefinition>,
    #[serde(default)]
    pub acceptors: Vec<AcceptorDefinition>,
}

/// Hydrogen-bond chemistry of residue types, keyed by residue name.
///
/// Protein residues receive the `protein_backbone` groups and nucleotides the
/// `nucleic_backbone` groups in addition to their own entry.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ChemistryRegistry {
    #[serde(default)]
    protein_backbone: GroupChemistry,
    #[serde(default)]
    nucleic_backbone: GroupChemistry,
    #[serde(default)]
    residues: HashMap<String, GroupChemistry>,
}

#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl ChemistryRegistry {
    pub fn load(path: &Path) -> Result<Self, RegistryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str, source: &str) -> Result<Self, RegistryLoadError> {
        toml::from_str(content).map_err(|e| RegistryLoadError::Toml {
            path: source.to_string(),
            source: e,
        })
    }

    /// The registry bundled with the crate: the 20 amino acids (with histidine
    /// tautomers), DNA and RNA nucleotides and common water models.
    pub fn standard() -> Result<Self, RegistryLoadError> {
        Self::from_toml_str(STANDARD_CHEMISTRY, "<standard chemistry>")
    }

    pub fn get(&self, residue_name: &str) -> Option<&GroupChemistry> {
        self.residues.get(residue_name.trim())
    }

    /// Assigns roles and hydrogen-bond chemistry to every residue of `system`.
    pub fn apply(&self, system: &mut MolecularSystem) -> Result<(), ChemistryError> {
        let ids: Vec<_> = system.residues_iter().map(|(id, _)| id).collect();
        let mut unknown = 0usize;
        for id in ids {
            if let Some(residue) = system.residue_mut(id) {
                if !self.apply_to_residue(residue)? {
                    unknown += 1;
                }
            }
        }
        debug!(
            residues = system.total_residue(),
            without_chemistry = unknown,
            "Applied hydrogen-bond chemistry."
        );
        Ok(())
    }

    /// Assigns roles and chemistry to one residue and refreshes its caches.
    ///
    /// Returns whether the residue name was found in the registry. Groups whose
    /// atoms are absent from the residue are skipped, as are acceptors without
    /// their base atom.
    pub fn apply_to_residue(&self, residue: &mut Residue) -> Result<bool, ChemistryError> {
        let chain_type = residue.chain_type;
        for atom in residue.atoms_mut() {
            atom.role = role_for(chain_type, &atom.name);
            atom.donor_type = None;
            atom.acceptor_type = None;
            atom.base = None;
            atom.base2 = None;
        }

        let backbone = match chain_type {
            ChainType::Protein => Some(&self.protein_backbone),
            ChainType::DNA | ChainType::RNA => Some(&self.nucleic_backbone),
            _ => None,
        };
        let own = self.get(&residue.name);

        for group in backbone.into_iter().chain(own) {
            assign_group(residue, group);
        }

        residue.refresh()?;
        Ok(own.is_some())
    }
}

fn role_for(chain_type: ChainType, atom_name: &str) -> AtomRole {
    match chain_type {
        ChainType::Protein if is_backbone_atom(atom_name) => AtomRole::Backbone,
        ChainType::DNA | ChainType::RNA if is_nucleic_backbone_atom(atom_name) => {
            AtomRole::Backbone
        }
        ChainType::Protein | ChainType::DNA | ChainType::RNA => AtomRole::Sidechain,
        ChainType::Water => AtomRole::Water,
        ChainType::Ligand => AtomRole::Ligand,
        ChainType::Other => AtomRole::Other,
    }
}

fn assign_group(residue: &mut Residue, group: &GroupChemistry) {
    for donor in &group.donors {
        let Some(heavy) = residue.atom_index(&donor.atom) else {
            continue;
        };
        let hydrogens: Vec<usize> = donor
            .hydrogens
            .iter()
            .filter_map(|name| residue.atom_index(name))
            .collect();
        if let Some(atom) = residue.atom_mut(heavy) {
            atom.donor_type = Some(donor.chem);
        }
        for h in hydrogens {
            if let Some(atom) = residue.atom_mut(h) {
                atom.base = Some(heavy);
            }
            let _ = residue.add_bond(heavy, h);
        }
    }

    for acceptor in &group.acceptors {
        let Some(index) = residue.atom_index(&acceptor.atom) else {
            continue;
        };
        let Some(base) = residue.atom_index(&acceptor.base) else {
            trace!(
                residue = %residue.name,
                atom = %acceptor.atom,
                "Skipping acceptor without its base atom."
            );
            continue;
        };
        let base2 = acceptor
            .base2
            .as_deref()
            .and_then(|name| residue.atom_index(name))
            .unwrap_or(base);
        if let Some(atom) = residue.atom_mut(index) {
            atom.acceptor_type = Some(acceptor.chem);
            atom.base = Some(base);
            atom.base2 = Some(base2);
        }
        let _ = residue.add_bond(index, base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;
    use std::fs;
    use tempfile::tempdir;

    fn serine_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let id = system.add_residue(chain, 1, "SER", None).unwrap();
        for (name, x) in [
            ("N", 0.0),
            ("H", -1.0),
            ("CA", 1.5),
            ("C", 2.5),
            ("O", 3.5),
            ("CB", 1.5),
            ("OG", 1.5),
            ("HG", 1.5),
        ] {
            let y = match name {
                "CB" => 1.5,
                "OG" => 2.9,
                "HG" => 3.8,
                _ => 0.0,
            };
            system
                .add_atom_to_residue(id, Atom::new(name, Point3::new(x, y, 0.0)))
                .unwrap();
        }
        system
    }

    #[test]
    fn standard_registry_assigns_backbone_and_sidechain_chemistry() {
        let registry = ChemistryRegistry::standard().unwrap();
        let mut system = serine_system();
        registry.apply(&mut system).unwrap();

        let residue = system.residue_at(0).unwrap();
        let n = residue.atom_index("N").unwrap();
        let h = residue.atom_index("H").unwrap();
        let o = residue.atom_index("O").unwrap();
        let og = residue.atom_index("OG").unwrap();
        let hg = residue.atom_index("HG").unwrap();

        assert_eq!(residue.atom(n).donor_type, Some(HBDonChemType::Pba));
        assert_eq!(residue.atom(o).acceptor_type, Some(HBAccChemType::Pba));
        assert_eq!(residue.atom_base(o), residue.atom_index("C").unwrap());
        assert_eq!(residue.atom_base2(o), residue.atom_index("CA").unwrap());
        assert_eq!(residue.atom(og).donor_type, Some(HBDonChemType::Ahx));
        assert_eq!(residue.atom(og).acceptor_type, Some(HBAccChemType::Ahx));
        assert!(residue.is_backbone_atom(n));
        assert!(!residue.is_backbone_atom(og));

        let mut polar = residue.polar_hydrogens().to_vec();
        polar.sort();
        let mut expected = vec![h, hg];
        expected.sort();
        assert_eq!(polar, expected);
        assert_eq!(residue.acceptors(), &[o, og]);
        assert_eq!(residue.path_distance(og, hg), Some(1));
    }

    #[test]
    fn acceptor_without_base_is_skipped() {
        let registry = ChemistryRegistry::standard().unwrap();
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('W', ChainType::Water);
        let id = system.add_residue(chain, 1, "HOH", None).unwrap();
        system
            .add_atom_to_residue(id, Atom::new("O", Point3::origin()))
            .unwrap();
        registry.apply(&mut system).unwrap();
        let water = system.residue_at(0).unwrap();
        assert!(water.acceptors().is_empty());
        assert!(water.atom(0).is_donor());
        assert_eq!(water.atom(0).role, AtomRole::Water);
    }

    #[test]
    fn unknown_protein_residue_is_a_chemistry_error() {
        let registry = ChemistryRegistry::standard().unwrap();
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let id = system.add_residue(chain, 1, "XYZ", None).unwrap();
        system
            .add_atom_to_residue(id, Atom::new("CA", Point3::origin()))
            .unwrap();
        assert!(matches!(
            registry.apply(&mut system),
            Err(ChemistryError::UnknownAminoAcid { .. })
        ));
    }

    #[test]
    fn load_reads_custom_registry_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chem.toml");
        fs::write(
            &path,
            r#"
            [residues.LIG]
            donors = [{ atom = "N1", hydrogens = ["H1"], chem = "GENERIC" }]
            acceptors = [{ atom = "O1", base = "C1", chem = "GENERIC" }]
            "#,
        )
        .unwrap();
        let registry = ChemistryRegistry::load(&path).unwrap();
        let lig = registry.get("LIG").unwrap();
        assert_eq!(lig.donors[0].chem, HBDonChemType::Generic);
        assert_eq!(lig.acceptors[0].base2, None);
        assert!(registry.get("SER").is_none());
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[residues.SER]\nunknown_field = 1").unwrap();
        assert!(matches!(
            ChemistryRegistry::load(&path),
            Err(RegistryLoadError::Toml { .. })
        ));
    }
}
