use crate::core::models::ids::ResidueId;
use crate::core::models::residue::Residue;
use crate::core::trie::hbond::HBondTrie;
use std::sync::Arc;

/// Alternative conformations of one residue position.
///
/// Every rotamer carries the sequence identity (number, chain, `seqpos`) of
/// the site it stands in for, so it can be scored against the rest of the
/// structure exactly like the original residue.
#[derive(Debug, Clone)]
pub struct RotamerSet {
    residue_id: ResidueId,
    seqpos: usize,
    rotamers: Vec<Residue>,
    trie: Option<Arc<HBondTrie>>,
}

impl RotamerSet {
    /// Builds a set for `site`, re-homing each conformation onto the site.
    pub fn from_residues(
        residue_id: ResidueId,
        site: &Residue,
        conformations: impl IntoIterator<Item = Residue>,
    ) -> Self {
        let rotamers = conformations
            .into_iter()
            .map(|mut rotamer| {
                rotamer.adopt_site_of(site);
                rotamer
            })
            .collect();
        Self {
            residue_id,
            seqpos: site.seqpos(),
            rotamers,
            trie: None,
        }
    }

    #[inline]
    pub fn residue_id(&self) -> ResidueId {
        self.residue_id
    }

    #[inline]
    pub fn seqpos(&self) -> usize {
        self.seqpos
    }

    #[inline]
    pub fn rotamers(&self) -> &[Residue] {
        &self.rotamers
    }

    #[inline]
    pub fn rotamer(&self, index: usize) -> Option<&Residue> {
        self.rotamers.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rotamers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rotamers.is_empty()
    }

    pub fn trie(&self) -> Option<&Arc<HBondTrie>> {
        self.trie.as_ref()
    }

    pub fn set_trie(&mut self, trie: Arc<HBondTrie>) {
        self.trie = Some(trie);
    }
}
