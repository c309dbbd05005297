use super::atom::Atom;
use super::chain::ChainType;
use super::ids::{ChainId, ResidueId};
use super::system::MolecularSystem;
use nalgebra::Point3;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Residue {0} was started before any chain")]
    NoChain(isize),
    #[error("Atom serial {0} was added before any residue")]
    NoResidue(usize),
    #[error("Duplicate atom serial: {0}")]
    DuplicateSerial(usize),
    #[error("Bond references unknown atom serial {0}")]
    UnknownAtom(usize),
}

/// Incrementally assembles a [`MolecularSystem`] from file records.
///
/// Atoms are identified by their file serial numbers until the system is built;
/// bonds between atoms of the same residue are kept, bonds across residues are
/// counted and dropped since all hydrogen-bond geometry is residue-local.
#[derive(Debug, Default)]
pub struct MolecularSystemBuilder {
    system: MolecularSystem,

    // --- Builder-specific state for efficient construction ---
    atom_serial_map: HashMap<usize, (ResidueId, usize)>,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
    dropped_bonds: usize,
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_chain(&mut self, id: char, chain_type: ChainType) -> &mut Self {
        self.current_chain = Some(self.system.add_chain(id, chain_type));
        self.current_residue = None;
        self
    }

    pub fn start_residue(&mut self, number: isize, name: &str) -> Result<&mut Self, BuildError> {
        let chain_id = self.current_chain.ok_or(BuildError::NoChain(number))?;
        let residue_type = name.parse().ok();
        self.current_residue = self
            .system
            .add_residue(chain_id, number, name, residue_type);
        Ok(self)
    }

    pub fn add_atom(
        &mut self,
        serial: usize,
        name: &str,
        position: Point3<f64>,
    ) -> Result<&mut Self, BuildError> {
        let residue_id = self.current_residue.ok_or(BuildError::NoResidue(serial))?;
        if self.atom_serial_map.contains_key(&serial) {
            return Err(BuildError::DuplicateSerial(serial));
        }
        let index = self
            .system
            .add_atom_to_residue(residue_id, Atom::new(name, position))
            .ok_or(BuildError::NoResidue(serial))?;
        self.atom_serial_map.insert(serial, (residue_id, index));
        Ok(self)
    }

    pub fn add_bond(&mut self, serial1: usize, serial2: usize) -> Result<&mut Self, BuildError> {
        let &(res1, idx1) = self
            .atom_serial_map
            .get(&serial1)
            .ok_or(BuildError::UnknownAtom(serial1))?;
        let &(res2, idx2) = self
            .atom_serial_map
            .get(&serial2)
            .ok_or(BuildError::UnknownAtom(serial2))?;
        if res1 == res2 {
            self.system.add_bond(res1, idx1, idx2);
        } else {
            self.dropped_bonds += 1;
        }
        Ok(self)
    }

    /// Number of bonds that crossed residue boundaries and were not stored.
    pub fn dropped_bonds(&self) -> usize {
        self.dropped_bonds
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_groups_atoms_into_residues_and_chains() {
        let mut builder = MolecularSystemBuilder::new();
        builder.start_chain('A', ChainType::Protein);
        builder.start_residue(1, "SER").unwrap();
        builder.add_atom(1, "OG", Point3::origin()).unwrap();
        builder.add_atom(2, "HG", Point3::new(0.96, 0.0, 0.0)).unwrap();
        builder.start_residue(2, "GLY").unwrap();
        builder.add_atom(3, "CA", Point3::new(4.0, 0.0, 0.0)).unwrap();
        builder.add_bond(1, 2).unwrap();
        builder.add_bond(2, 3).unwrap();
        assert_eq!(builder.dropped_bonds(), 1);

        let system = builder.build();
        assert_eq!(system.total_residue(), 2);
        let ser = system.residue_at(0).unwrap();
        assert_eq!(ser.atoms().len(), 2);
        assert_eq!(ser.path_distance(0, 1), Some(1));
        assert_eq!(ser.residue_type, Some(crate::core::models::residue::ResidueType::Serine));
        assert_eq!(system.residue_at(1).unwrap().atoms().len(), 1);
    }

    #[test]
    fn builder_rejects_out_of_order_records() {
        let mut builder = MolecularSystemBuilder::new();
        assert_eq!(
            builder.start_residue(1, "SER").err(),
            Some(BuildError::NoChain(1))
        );
        builder.start_chain('A', ChainType::Protein);
        assert_eq!(
            builder.add_atom(7, "CA", Point3::origin()).err(),
            Some(BuildError::NoResidue(7))
        );
    }

    #[test]
    fn builder_rejects_duplicate_serials_and_unknown_bond_atoms() {
        let mut builder = MolecularSystemBuilder::new();
        builder.start_chain('A', ChainType::Protein);
        builder.start_residue(1, "SER").unwrap();
        builder.add_atom(1, "CA", Point3::origin()).unwrap();
        assert_eq!(
            builder.add_atom(1, "CB", Point3::origin()).err(),
            Some(BuildError::DuplicateSerial(1))
        );
        assert_eq!(
            builder.add_bond(1, 99).err(),
            Some(BuildError::UnknownAtom(99))
        );
    }
}
