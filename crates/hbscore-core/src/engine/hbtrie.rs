use super::config::HBondOptions;
use super::evaluator::{ATOMIC_INTERACTION_CUTOFF, BondTerms, HBondEvaluator, PairEnvironment};
use super::hbond_set::HBondSet;
use crate::core::forcefield::energy::HBondGeometry;
use crate::core::forcefield::term::EnergyMap;
use crate::core::forcefield::types::{HBAccChemType, HBDonChemType, HBEvalTuple};
use crate::core::models::residue::Residue;
use crate::core::trie::hbond::{HBAtom, HBCountPairData, HBondTrie};
use crate::core::trie::rotamer_trie::RotamerDescriptor;
use crate::core::trie::traversal::TrieEvaluator;
use nalgebra::Point3;

pub(crate) type HBDescriptor = RotamerDescriptor<HBAtom, HBCountPairData>;

/// Descriptor of one conformation.
///
/// Only atoms that can take part in a bond are kept: every acceptor and donor
/// heavy atom in residue order, each followed by its polar hydrogens. A
/// residue with none of these gets a single inert placeholder so that every
/// rotamer has a path in the trie.
pub(crate) fn rotamer_descriptor(
    residue: &Residue,
    rotamer: usize,
    hbond_set: &HBondSet,
    options: &HBondOptions,
) -> HBDescriptor {
    let mut descriptor = RotamerDescriptor::new(rotamer);
    let seqpos = residue.seqpos();
    let check = options.bb_donor_acceptor_check && residue.is_protein();
    let flags = AtomFlags {
        is_protein: residue.is_protein(),
        is_dna: residue.is_dna(),
        near_water: hbond_set.residue_near_water(seqpos),
        is_water: residue.is_hybrid_water(),
    };

    for (index, atom) in residue.atoms().iter().enumerate() {
        if atom.is_hydrogen {
            continue;
        }
        let hydrogens: Vec<usize> = residue
            .polar_hydrogens()
            .iter()
            .copied()
            .filter(|&h| residue.atom_base(h) == index)
            .collect();
        let acc_type = atom.acceptor_type.filter(|_| atom.base.is_some());
        if acc_type.is_none() && hydrogens.is_empty() {
            continue;
        }

        let is_bb = residue.is_backbone_atom(index);
        let (base, base2) = match acc_type {
            Some(_) => (
                *residue.position(residue.atom_base(index)),
                *residue.position(residue.atom_base2(index)),
            ),
            None => (atom.position, atom.position),
        };
        let claimed = if acc_type.is_some() {
            hbond_set.acc_bbg_in_bb_bb_hbond(seqpos)
        } else {
            hbond_set.don_bbg_in_bb_bb_hbond(seqpos)
        };
        descriptor.push(
            flags.atom(atom.position, base, base2, false, atom.donor_type, acc_type, is_bb),
            HBCountPairData {
                is_sc: !is_bb,
                avoid_sc_hbonds: check && is_bb && claimed,
            },
        );

        for h in hydrogens {
            descriptor.push(
                flags.atom(
                    *residue.position(h),
                    atom.position,
                    atom.position,
                    true,
                    atom.donor_type,
                    None,
                    is_bb,
                ),
                HBCountPairData {
                    is_sc: !is_bb,
                    avoid_sc_hbonds: check && is_bb && hbond_set.don_bbg_in_bb_bb_hbond(seqpos),
                },
            );
        }
    }

    if descriptor.is_empty() {
        let anchor = residue
            .atoms()
            .first()
            .map_or_else(Point3::origin, |atom| atom.position);
        descriptor.push(HBAtom::placeholder(anchor), HBCountPairData::default());
    }
    descriptor
}

/// Builds a trie over `conformations`, numbered in iteration order.
pub(crate) fn build_trie<'r>(
    conformations: impl IntoIterator<Item = &'r Residue>,
    hbond_set: &HBondSet,
    options: &HBondOptions,
) -> HBondTrie {
    let descriptors = conformations
        .into_iter()
        .enumerate()
        .map(|(rotamer, residue)| rotamer_descriptor(residue, rotamer, hbond_set, options))
        .collect();
    HBondTrie::build(descriptors)
}

#[derive(Debug, Clone, Copy)]
struct AtomFlags {
    is_protein: bool,
    is_dna: bool,
    near_water: bool,
    is_water: bool,
}

impl AtomFlags {
    #[allow(clippy::too_many_arguments)]
    fn atom(
        &self,
        position: Point3<f64>,
        base: Point3<f64>,
        base2: Point3<f64>,
        is_hydrogen: bool,
        don_type: Option<HBDonChemType>,
        acc_type: Option<HBAccChemType>,
        is_backbone: bool,
    ) -> HBAtom {
        HBAtom {
            position,
            base,
            base2,
            is_hydrogen,
            don_type,
            acc_type,
            is_backbone,
            is_protein: self.is_protein,
            is_dna: self.is_dna,
            near_water: self.near_water,
            is_water: self.is_water,
        }
    }
}

/// Leaf evaluation of a trie traversal between two sequence positions.
///
/// Scores the same way as the residue-level scan: identical gates, weights
/// and buckets, with the weighted sum over buckets as the pair energy.
pub(crate) struct HBondTrieContext<'a> {
    evaluator: HBondEvaluator<'a>,
    weights: EnergyMap,
    res1_nb: usize,
    res2_nb: usize,
    /// `seqpos2 - seqpos1`.
    seq_sep: isize,
    same_chain: bool,
    ssdep: f64,
}

impl<'a> HBondTrieContext<'a> {
    /// Context for the positions of `site1` (first trie) and `site2`.
    pub fn new(
        evaluator: HBondEvaluator<'a>,
        hbond_set: &HBondSet,
        weights: EnergyMap,
        site1: &Residue,
        site2: &Residue,
    ) -> Self {
        let (s1, s2) = (site1.seqpos(), site2.seqpos());
        Self {
            evaluator,
            weights,
            res1_nb: hbond_set.nbrs(s1),
            res2_nb: hbond_set.nbrs(s2),
            seq_sep: s2 as isize - s1 as isize,
            same_chain: site1.chain_id == site2.chain_id,
            ssdep: hbond_set.ssdep_factor(s1, s2),
        }
    }

    fn donor_acceptor_energy(
        &self,
        hydrogen: &HBAtom,
        acceptor: &HBAtom,
        separation: isize,
        don_nb: usize,
        acc_nb: usize,
    ) -> f64 {
        let (Some(don_type), Some(acc_type)) = (hydrogen.don_type, acceptor.acc_type) else {
            return 0.0;
        };
        let tuple = HBEvalTuple::classify(
            don_type,
            hydrogen.is_backbone,
            acc_type,
            acceptor.is_backbone,
            separation,
            self.same_chain,
        );
        let geometry = HBondGeometry {
            donor: hydrogen.base,
            hydrogen: hydrogen.position,
            acceptor: acceptor.position,
            base: acceptor.base,
            base2: acceptor.base2,
        };
        let Some((raw, _)) = self.evaluator.bond_energy(&tuple, &geometry, false) else {
            return 0.0;
        };

        let terms = BondTerms {
            tuple,
            raw,
            hydrogen: hydrogen.position,
            acceptor: acceptor.position,
            involves_dna: hydrogen.is_dna || acceptor.is_dna,
            don_is_water: hydrogen.is_water,
            acc_is_water: acceptor.is_water,
            intra: false,
        };
        let env = PairEnvironment {
            don_neighbors: don_nb,
            acc_neighbors: acc_nb,
            ssdep: self.ssdep,
            near_water: hydrogen.near_water || acceptor.near_water,
        };
        let mut emap = EnergyMap::new();
        self.evaluator.score_bond(&terms, &env, &mut emap);
        emap.dot(&self.weights)
    }
}

impl TrieEvaluator<HBAtom> for HBondTrieContext<'_> {
    fn cutoff(&self) -> f64 {
        ATOMIC_INTERACTION_CUTOFF
    }

    fn pair_energy(&self, first: &HBAtom, second: &HBAtom) -> f64 {
        if first.is_acceptor() && second.is_polar_hydrogen() {
            self.donor_acceptor_energy(second, first, -self.seq_sep, self.res2_nb, self.res1_nb)
        } else if first.is_polar_hydrogen() && second.is_acceptor() {
            self.donor_acceptor_energy(first, second, self.seq_sep, self.res1_nb, self.res2_nb)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::chain::ChainType;
    use crate::core::models::system::MolecularSystem;
    use crate::engine::test_utils::{add_residue, backbone_pair, database, finish};

    fn options() -> HBondOptions {
        HBondOptions::default()
    }

    #[test]
    fn descriptor_lists_heavy_atoms_before_their_hydrogens() {
        let fixture = backbone_pair(0, true, true);
        let serine = fixture.system.residue(fixture.serine.unwrap()).unwrap();
        let descriptor = rotamer_descriptor(serine, 0, &HBondSet::default(), &options());

        // SER fixture: OG (acceptor and donor) then HG. CB is skipped.
        assert_eq!(descriptor.len(), 2);
        let (og, _) = &descriptor.atoms[0];
        let (hg, cp) = &descriptor.atoms[1];
        assert!(og.is_acceptor());
        assert!(!og.is_hydrogen);
        assert!(hg.is_polar_hydrogen());
        assert_eq!(hg.base, og.position);
        assert!(cp.is_sc);
        assert!(!cp.avoid_sc_hbonds);
    }

    #[test]
    fn claimed_backbone_groups_avoid_sidechain_partners() {
        let fixture = backbone_pair(0, true, false);
        let db = database();
        let set = HBondSet::setup(&fixture.system, &options(), &db, None);
        let donor = fixture.system.residue(fixture.donor).unwrap();
        let acceptor = fixture.system.residue(fixture.acceptor).unwrap();

        let don_desc = rotamer_descriptor(donor, 0, &set, &options());
        let h = don_desc
            .atoms
            .iter()
            .find(|(atom, _)| atom.is_polar_hydrogen())
            .unwrap();
        assert!(h.1.avoid_sc_hbonds);
        let o = don_desc
            .atoms
            .iter()
            .find(|(atom, _)| atom.is_acceptor())
            .unwrap();
        assert!(!o.1.avoid_sc_hbonds);

        let acc_desc = rotamer_descriptor(acceptor, 0, &set, &options());
        let o = acc_desc
            .atoms
            .iter()
            .find(|(atom, _)| atom.is_acceptor())
            .unwrap();
        assert!(o.1.avoid_sc_hbonds);
        assert!(!o.1.is_sc);

        let unchecked = HBondOptions {
            bb_donor_acceptor_check: false,
            ..options()
        };
        let acc_desc = rotamer_descriptor(acceptor, 0, &set, &unchecked);
        assert!(acc_desc.atoms.iter().all(|(_, cp)| !cp.avoid_sc_hbonds));
    }

    #[test]
    fn residue_without_polar_atoms_gets_placeholder() {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('L', ChainType::Ligand);
        add_residue(
            &mut system,
            chain,
            1,
            "BNZ",
            &[("C1", [1.0, 2.0, 3.0]), ("C2", [2.4, 2.0, 3.0])],
        );
        let system = finish(system);
        let residue = system.residue_at(0).unwrap();
        let descriptor = rotamer_descriptor(residue, 0, &HBondSet::default(), &options());

        assert_eq!(descriptor.len(), 1);
        let (atom, cp) = &descriptor.atoms[0];
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert!(!atom.is_acceptor() && !atom.is_polar_hydrogen());
        assert_eq!(*cp, HBCountPairData::default());

        let trie = build_trie([residue, residue], &HBondSet::default(), &options());
        assert_eq!(trie.num_rotamers(), 2);
        assert_eq!(trie.nodes().len(), 1);
    }

    #[test]
    fn context_orients_donor_and_acceptor_by_atom_role() {
        let fixture = backbone_pair(0, true, false);
        let db = database();
        let opts = HBondOptions {
            use_hb_env_dep: false,
            decompose_bb_hb_into_pair_energies: true,
            ..options()
        };
        let set = HBondSet::default();
        let evaluator = HBondEvaluator::new(&opts, &db, None);
        let donor = fixture.system.residue(fixture.donor).unwrap();
        let acceptor = fixture.system.residue(fixture.acceptor).unwrap();

        let h = rotamer_descriptor(donor, 0, &set, &opts)
            .atoms
            .into_iter()
            .find(|(atom, _)| atom.is_polar_hydrogen())
            .unwrap()
            .0;
        let o = rotamer_descriptor(acceptor, 0, &set, &opts)
            .atoms
            .into_iter()
            .find(|(atom, _)| atom.is_acceptor())
            .unwrap()
            .0;

        let forward = HBondTrieContext::new(evaluator, &set, EnergyMap::filled(1.0), donor, acceptor);
        let backward = HBondTrieContext::new(evaluator, &set, EnergyMap::filled(1.0), acceptor, donor);
        let e1 = forward.pair_energy(&h, &o);
        let e2 = backward.pair_energy(&o, &h);
        assert!((e1 + 1.0).abs() < 1e-3);
        assert!((e1 - e2).abs() < 1e-12);
        assert_eq!(forward.pair_energy(&h, &h), 0.0);
    }
}
