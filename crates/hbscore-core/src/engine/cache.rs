use crate::core::models::ids::ResidueId;
use crate::core::models::residue::Residue;
use crate::core::trie::hbond::HBondTrie;
use slotmap::SecondaryMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-residue data frozen when minimization starts.
///
/// Backbone groups claimed by a backbone/backbone bond at that point stay
/// unavailable for sidechain bonds for the whole trajectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HBondResidueMinData {
    pub natoms: usize,
    pub nneighbors: usize,
    pub bb_don_avail: bool,
    pub bb_acc_avail: bool,
}

impl HBondResidueMinData {
    pub fn new(residue: &Residue, nneighbors: usize, don_claimed: bool, acc_claimed: bool) -> Self {
        // Only protein backbone groups take part in the exclusion rule.
        let protein = residue.is_protein();
        Self {
            natoms: residue.atoms().len(),
            nneighbors,
            bb_don_avail: !(protein && don_claimed),
            bb_acc_avail: !(protein && acc_claimed),
        }
    }
}

/// The two residue records of a minimized pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HBondResPairMinData {
    pub res1: Arc<HBondResidueMinData>,
    pub res2: Arc<HBondResidueMinData>,
}

impl HBondResPairMinData {
    /// Records of the donor and acceptor side, given which residue donates.
    #[inline]
    pub fn oriented(&self, res1_donates: bool) -> (&HBondResidueMinData, &HBondResidueMinData) {
        if res1_donates {
            (&self.res1, &self.res2)
        } else {
            (&self.res2, &self.res1)
        }
    }
}

/// Owner of the minimization records of one trajectory.
#[derive(Debug, Default, Clone)]
pub struct MinimizationCache {
    residues: SecondaryMap<ResidueId, Arc<HBondResidueMinData>>,
    pairs: HashMap<(ResidueId, ResidueId), HBondResPairMinData>,
}

impl MinimizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the record of a residue.
    ///
    /// An existing record only has its atom count refreshed; the frozen
    /// availability flags and neighbor count are kept.
    pub fn insert_residue(
        &mut self,
        residue_id: ResidueId,
        data: HBondResidueMinData,
    ) -> Arc<HBondResidueMinData> {
        match self.residues.get_mut(residue_id) {
            Some(existing) => {
                Arc::make_mut(existing).natoms = data.natoms;
                Arc::clone(existing)
            }
            None => {
                let data = Arc::new(data);
                self.residues.insert(residue_id, Arc::clone(&data));
                data
            }
        }
    }

    pub fn residue(&self, residue_id: ResidueId) -> Option<&Arc<HBondResidueMinData>> {
        self.residues.get(residue_id)
    }

    /// Links the records of two residues, which must already be cached.
    pub fn insert_pair(&mut self, id1: ResidueId, id2: ResidueId) -> Option<&HBondResPairMinData> {
        let res1 = Arc::clone(self.residues.get(id1)?);
        let res2 = Arc::clone(self.residues.get(id2)?);
        self.pairs.insert((id1, id2), HBondResPairMinData { res1, res2 });
        self.pairs.get(&(id1, id2))
    }

    pub fn pair(&self, id1: ResidueId, id2: ResidueId) -> Option<&HBondResPairMinData> {
        self.pairs.get(&(id1, id2))
    }

    pub fn num_residues(&self) -> usize {
        self.residues.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }
}

/// One background trie per sequence position, built for packing.
#[derive(Debug, Default, Clone)]
pub struct TrieCollection {
    tries: Vec<Option<Arc<HBondTrie>>>,
}

impl TrieCollection {
    pub fn with_capacity(total_residue: usize) -> Self {
        Self {
            tries: vec![None; total_residue],
        }
    }

    pub fn get(&self, seqpos: usize) -> Option<&Arc<HBondTrie>> {
        self.tries.get(seqpos)?.as_ref()
    }

    pub fn set(&mut self, seqpos: usize, trie: Arc<HBondTrie>) {
        if seqpos >= self.tries.len() {
            self.tries.resize(seqpos + 1, None);
        }
        self.tries[seqpos] = Some(trie);
    }

    pub fn len(&self) -> usize {
        self.tries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_utils::backbone_pair;

    #[test]
    fn claimed_groups_are_unavailable_only_on_proteins() {
        let fixture = backbone_pair(0, true, false);
        let donor = fixture.system.residue(fixture.donor).unwrap();
        let data = HBondResidueMinData::new(donor, 3, true, false);
        assert_eq!(data.natoms, donor.atoms().len());
        assert_eq!(data.nneighbors, 3);
        assert!(!data.bb_don_avail);
        assert!(data.bb_acc_avail);
    }

    #[test]
    fn reinserting_a_residue_keeps_frozen_flags() {
        let fixture = backbone_pair(0, true, false);
        let donor = fixture.system.residue(fixture.donor).unwrap();
        let mut cache = MinimizationCache::new();
        cache.insert_residue(fixture.donor, HBondResidueMinData::new(donor, 2, true, true));
        let refreshed = cache.insert_residue(
            fixture.donor,
            HBondResidueMinData {
                natoms: 42,
                nneighbors: 9,
                bb_don_avail: true,
                bb_acc_avail: true,
            },
        );
        assert_eq!(refreshed.natoms, 42);
        assert_eq!(refreshed.nneighbors, 2);
        assert!(!refreshed.bb_don_avail);
        assert_eq!(cache.num_residues(), 1);
    }

    #[test]
    fn pair_records_share_residue_records() {
        let fixture = backbone_pair(0, true, false);
        let system = &fixture.system;
        let mut cache = MinimizationCache::new();
        assert!(cache.insert_pair(fixture.donor, fixture.acceptor).is_none());

        for id in [fixture.donor, fixture.acceptor] {
            let residue = system.residue(id).unwrap();
            cache.insert_residue(id, HBondResidueMinData::new(residue, 2, false, false));
        }
        let pair = cache.insert_pair(fixture.donor, fixture.acceptor).unwrap().clone();
        assert!(Arc::ptr_eq(&pair.res1, cache.residue(fixture.donor).unwrap()));
        let (don, acc) = pair.oriented(false);
        assert!(std::ptr::eq(don, pair.res2.as_ref()));
        assert!(std::ptr::eq(acc, pair.res1.as_ref()));
        assert_eq!(cache.num_pairs(), 1);
    }

    #[test]
    fn trie_collection_grows_on_demand() {
        let mut tries = TrieCollection::with_capacity(1);
        assert!(tries.get(0).is_none());
        assert!(tries.get(5).is_none());
        tries.set(3, Arc::new(HBondTrie::build(Vec::new())));
        assert_eq!(tries.len(), 4);
        assert!(tries.get(3).is_some());
    }
}
