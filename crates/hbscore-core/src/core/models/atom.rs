use crate::core::forcefield::types::{HBAccChemType, HBDonChemType};
use crate::core::utils::identifiers::is_heavy_atom;
use nalgebra::Point3;
use std::str::FromStr;

/// Represents the role or classification of an atom within a molecular structure.
///
/// The hydrogen-bond bookkeeping distinguishes backbone from sidechain atoms when
/// deciding which bond categories a donor/acceptor pair falls into, so every atom
/// that can take part in a hydrogen bond must carry a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Backbone atom, part of the main chain of a polymer (e.g., N, H, C, O, or a nucleic phosphate).
    Backbone,
    /// Sidechain atom, part of the side groups attached to the backbone.
    Sidechain,
    /// Ligand atom, associated with small molecules or ligands bound to the structure.
    Ligand,
    /// Water molecule atom, for solvent molecules in the system.
    Water,
    /// Unknown or unclassified atom role.
    #[default]
    Other,
}

/// Represents an atom of a residue together with its hydrogen-bonding chemistry.
///
/// Atoms are owned by their residue and addressed by their index within it. The
/// covalent parent (`base`) and, for acceptors, the second base (`base2`) are
/// residue-local indices as well, so a residue can be cloned into a rotamer
/// without rewriting any references.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "OG").
    pub name: String,
    /// The role or classification of the atom in the molecular structure.
    pub role: AtomRole,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Whether the atom is a hydrogen (or deuterium).
    pub is_hydrogen: bool,
    /// Chemical type of the donor group, set on donor heavy atoms only.
    pub donor_type: Option<HBDonChemType>,
    /// Chemical type of the acceptor, set on acceptor atoms only.
    pub acceptor_type: Option<HBAccChemType>,
    /// Residue-local index of the covalent parent atom.
    pub base: Option<usize>,
    /// Residue-local index of the second base atom used to orient acceptors.
    pub base2: Option<usize>,
}

impl Atom {
    /// Creates a new `Atom` without any hydrogen-bonding chemistry.
    ///
    /// The hydrogen flag is derived from the atom name; role, chemistry and
    /// base atoms are assigned later by the chemistry registry.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            role: AtomRole::default(),
            position,
            is_hydrogen: !is_heavy_atom(name),
            donor_type: None,
            acceptor_type: None,
            base: None,
            base2: None,
        }
    }

    /// Sets the role and returns the atom, for concise construction.
    pub fn with_role(mut self, role: AtomRole) -> Self {
        self.role = role;
        self
    }

    #[inline]
    pub fn is_backbone(&self) -> bool {
        self.role == AtomRole::Backbone
    }

    #[inline]
    pub fn is_donor(&self) -> bool {
        self.donor_type.is_some()
    }

    #[inline]
    pub fn is_acceptor(&self) -> bool {
        self.acceptor_type.is_some()
    }
}

impl FromStr for AtomRole {
    type Err = ();

    /// Parses a string into an `AtomRole`.
    ///
    /// Parsing is case-insensitive and accepts the common spellings of
    /// "sidechain" ("side-chain", "side_chain").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backbone" => Ok(AtomRole::Backbone),
            "sidechain" | "side-chain" | "side_chain" => Ok(AtomRole::Sidechain),
            "ligand" => Ok(AtomRole::Ligand),
            "water" => Ok(AtomRole::Water),
            "other" | "unknown" => Ok(AtomRole::Other),
            _ => Err(()),
        }
    }
}
