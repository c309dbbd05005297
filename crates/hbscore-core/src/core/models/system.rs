use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{ChainId, ResidueId};
use super::membrane::MembraneGeometry;
use super::residue::{ChemistryError, Residue, ResidueType};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Represents a complete molecular system with chains and residues.
///
/// Residues own their atoms. Besides the stable slotmap IDs, every residue has a
/// sequence position (`seqpos`), the 0-based index in the order residues were
/// added; per-residue scoring arrays are indexed by it.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Residue IDs in sequence order.
    sequence: Vec<ResidueId>,
    /// Lookup map for finding residues by chain ID and residue number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Optional implicit membrane the structure is embedded in.
    membrane: Option<MembraneGeometry>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Retrieves a mutable reference to a residue by its ID.
    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    /// Returns an iterator over all residues in sequence order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(ResidueId, &Residue)` pairs.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.sequence.iter().map(|&id| (id, &self.residues[id]))
    }

    /// Returns the residue at a sequence position.
    pub fn residue_at(&self, seqpos: usize) -> Option<&Residue> {
        self.sequence.get(seqpos).map(|&id| &self.residues[id])
    }

    /// Returns the ID of the residue at a sequence position.
    pub fn residue_id_at(&self, seqpos: usize) -> Option<ResidueId> {
        self.sequence.get(seqpos).copied()
    }

    /// Number of residues in the system.
    pub fn total_residue(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Finds a chain ID by its single-character identifier.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue ID by its chain ID and residue number.
    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number))
            .copied()
    }

    /// Adds a new chain to the system or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        *self.chain_id_map.entry(id).or_insert_with(|| {
            let chain = Chain::new(id, chain_type);
            self.chains.insert(chain)
        })
    }

    /// Adds a new residue to the end of the sequence or returns the existing one.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` (if the chain doesn't exist).
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
        residue_type: Option<ResidueType>,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number);

        if let Some(&existing) = self.residue_id_map.get(&key) {
            return Some(existing);
        }

        let mut residue = Residue::new(
            residue_number,
            name,
            chain_id,
            chain.chain_type,
            residue_type,
        );
        residue.seqpos = self.sequence.len();
        let residue_id = self.residues.insert(residue);
        self.residue_id_map.insert(key, residue_id);
        self.sequence.push(residue_id);
        chain.residues.push(residue_id);

        Some(residue_id)
    }

    /// Adds an atom to a residue and returns its residue-local index.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<usize> {
        let residue = self.residues.get_mut(residue_id)?;
        Some(residue.add_atom(atom))
    }

    /// Adds a covalent bond between two atoms of the same residue.
    pub fn add_bond(&mut self, residue_id: ResidueId, a: usize, b: usize) -> Option<()> {
        self.residues.get_mut(residue_id)?.add_bond(a, b)
    }

    pub fn membrane(&self) -> Option<&MembraneGeometry> {
        self.membrane.as_ref()
    }

    pub fn set_membrane(&mut self, membrane: Option<MembraneGeometry>) {
        self.membrane = membrane;
    }

    /// Refreshes the derived data of every residue.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ChemistryError`] raised by a residue.
    pub fn refresh(&mut self) -> Result<(), ChemistryError> {
        for &id in &self.sequence {
            self.residues[id].refresh()?;
        }
        Ok(())
    }
}
