use super::rotamer_trie::{RotamerTrie, TrieAtom};
use super::traversal::CountPairFunction;
use crate::core::forcefield::types::{HBAccChemType, HBDonChemType};
use nalgebra::Point3;
use std::cmp::Ordering;

/// Trie payload for hydrogen-bond evaluation.
///
/// Hydrogens carry the position of their donor heavy atom in `base`;
/// acceptors carry their two base atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct HBAtom {
    pub position: Point3<f64>,
    pub base: Point3<f64>,
    pub base2: Point3<f64>,
    pub is_hydrogen: bool,
    /// Donor chemistry; on hydrogens, that of the donor they are attached to.
    pub don_type: Option<HBDonChemType>,
    pub acc_type: Option<HBAccChemType>,
    /// For hydrogens, whether the donor heavy atom is a backbone atom.
    pub is_backbone: bool,
    pub is_protein: bool,
    pub is_dna: bool,
    pub near_water: bool,
    pub is_water: bool,
}

impl HBAtom {
    /// An atom that takes part in no hydrogen bond; fills otherwise empty
    /// descriptors.
    pub fn placeholder(position: Point3<f64>) -> Self {
        Self {
            position,
            base: position,
            base2: position,
            is_hydrogen: false,
            don_type: None,
            acc_type: None,
            is_backbone: false,
            is_protein: false,
            is_dna: false,
            near_water: false,
            is_water: false,
        }
    }

    #[inline]
    pub fn is_polar_hydrogen(&self) -> bool {
        self.is_hydrogen && self.don_type.is_some()
    }

    #[inline]
    pub fn is_acceptor(&self) -> bool {
        self.acc_type.is_some()
    }
}

impl TrieAtom for HBAtom {
    fn position(&self) -> &Point3<f64> {
        &self.position
    }

    fn trie_cmp(&self, other: &Self) -> Ordering {
        self.is_hydrogen
            .cmp(&other.is_hydrogen)
            .then(self.don_type.cmp(&other.don_type))
            .then(self.acc_type.cmp(&other.acc_type))
            .then(self.position.x.total_cmp(&other.position.x))
            .then(self.position.y.total_cmp(&other.position.y))
            .then(self.position.z.total_cmp(&other.position.z))
    }
}

/// Count-pair data of a trie atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HBCountPairData {
    pub is_sc: bool,
    /// The atom's backbone group is already claimed by a backbone/backbone
    /// bond, so it may not also bond to sidechains.
    pub avoid_sc_hbonds: bool,
}

/// Count-pair rule enforcing the backbone/sidechain exclusion.
#[derive(Debug, Clone, Copy, Default)]
pub struct HBCountPair;

impl CountPairFunction<HBCountPairData> for HBCountPair {
    #[inline]
    fn count(&self, first: &HBCountPairData, second: &HBCountPairData) -> bool {
        !((first.avoid_sc_hbonds && second.is_sc) || (second.avoid_sc_hbonds && first.is_sc))
    }
}

pub type HBondTrie = RotamerTrie<HBAtom, HBCountPairData>;

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(is_sc: bool, avoid: bool) -> HBCountPairData {
        HBCountPairData {
            is_sc,
            avoid_sc_hbonds: avoid,
        }
    }

    #[test]
    fn claimed_backbone_does_not_pair_with_sidechains() {
        let rule = HBCountPair;
        assert!(!rule.count(&cp(false, true), &cp(true, false)));
        assert!(!rule.count(&cp(true, false), &cp(false, true)));
    }

    #[test]
    fn unclaimed_or_backbone_partners_are_counted() {
        let rule = HBCountPair;
        assert!(rule.count(&cp(false, true), &cp(false, false)));
        assert!(rule.count(&cp(false, false), &cp(true, false)));
        assert!(rule.count(&cp(true, false), &cp(true, false)));
    }

    #[test]
    fn heavy_atoms_sort_before_hydrogens_at_same_position() {
        let heavy = HBAtom::placeholder(Point3::origin());
        let mut hydrogen = heavy.clone();
        hydrogen.is_hydrogen = true;
        assert_eq!(heavy.trie_cmp(&hydrogen), Ordering::Less);
        assert_eq!(heavy.trie_cmp(&heavy.clone()), Ordering::Equal);
    }
}
