use super::config::HBondOptions;
use super::evaluator::{Exclusions, HBondEvaluator, PairEnvironment, within_interaction_range};
use crate::core::forcefield::params::HBondDatabase;
use crate::core::forcefield::term::{EnergyMap, ScoreType};
use crate::core::forcefield::types::{HBEvalTuple, HBEvalWeightType};
use crate::core::forcefield::weights::HelixLengthScale;
use crate::core::models::membrane::MembraneGeometry;
use crate::core::models::residue::SecondaryStructure;
use crate::core::models::system::MolecularSystem;
use itertools::Itertools;
use kiddo::{KdTree, SquaredEuclidean};
use tracing::{debug, info};

/// Radius of the neighbor count used by the environment weight.
pub const NEIGHBOR_RADIUS: f64 = 10.0;

/// Residues `i` and `i + 4` of an alpha-helical turn.
const HELIX_TURN: usize = 4;

/// One backbone/backbone hydrogen bond recorded during setup.
#[derive(Debug, Clone, PartialEq)]
pub struct HBond {
    pub don_seqpos: usize,
    pub don_hatm: usize,
    pub acc_seqpos: usize,
    pub acc_atm: usize,
    /// Raw energy.
    pub energy: f64,
    /// Environment (and helix-length or membrane) weight.
    pub weight: f64,
    pub eval_tuple: HBEvalTuple,
}

impl HBond {
    #[inline]
    pub fn weighted_energy(&self) -> f64 {
        self.energy * self.weight
    }
}

/// Structure-wide hydrogen-bond bookkeeping of one scoring round.
///
/// Built once before any pair energy is evaluated. The backbone pass marks
/// every backbone donor and acceptor group that already takes part in a
/// backbone/backbone bond; pair evaluation consults these flags to keep such
/// groups from also bonding to sidechains.
#[derive(Debug, Clone, Default)]
pub struct HBondSet {
    nbrs: Vec<usize>,
    don_bbg_in_bb_bb_hbond: Vec<bool>,
    acc_bbg_in_bb_bb_hbond: Vec<bool>,
    near_water: Vec<bool>,
    helix_segment: Vec<Option<usize>>,
    helix_lengths: Vec<usize>,
    ssdep: Option<HelixLengthScale>,
    hbonds: Vec<HBond>,
}

impl HBondSet {
    pub fn setup(
        system: &MolecularSystem,
        options: &HBondOptions,
        database: &HBondDatabase,
        membrane: Option<&MembraneGeometry>,
    ) -> Self {
        let n = system.total_residue();
        let mut set = Self {
            nbrs: neighbor_counts(system),
            don_bbg_in_bb_bb_hbond: vec![false; n],
            acc_bbg_in_bb_bb_hbond: vec![false; n],
            near_water: if options.water_hybrid_sf {
                near_water_flags(system, options.water_proximity_cutoff)
            } else {
                vec![false; n]
            },
            helix_segment: vec![None; n],
            helix_lengths: Vec::new(),
            ssdep: options.length_dependent_srbb.then(|| options.ssdep_params()),
            hbonds: Vec::new(),
        };

        let evaluator = HBondEvaluator::new(options, database, membrane);
        set.fill_backbone_hbonds(system, &evaluator);
        if set.ssdep.is_some() {
            set.assign_helices(system);
            if membrane.is_none() {
                set.apply_helix_scaling();
            }
        }

        info!(
            residues = n,
            backbone_hbonds = set.hbonds.len(),
            helices = set.helix_lengths.len(),
            "Hydrogen-bond set ready."
        );
        set
    }

    fn fill_backbone_hbonds(&mut self, system: &MolecularSystem, evaluator: &HBondEvaluator) {
        let options = evaluator.options;
        for (i, j) in (0..system.total_residue()).tuple_combinations() {
            let (Some(rsd1), Some(rsd2)) = (system.residue_at(i), system.residue_at(j)) else {
                continue;
            };
            if options.exclude_dna_dna && rsd1.is_dna() && rsd2.is_dna() {
                continue;
            }
            if !within_interaction_range(rsd1, rsd2) {
                continue;
            }
            let near_water = self.pair_near_water(i, j);
            for (don, acc) in [(rsd1, rsd2), (rsd2, rsd1)] {
                let env = PairEnvironment {
                    don_neighbors: self.nbrs(don.seqpos()),
                    acc_neighbors: self.nbrs(acc.seqpos()),
                    ssdep: 1.0,
                    near_water,
                };
                let mut found = Vec::new();
                evaluator.scan(don, acc, Exclusions::BACKBONE_ONLY, false, |bond| {
                    found.push(HBond {
                        don_seqpos: don.seqpos(),
                        don_hatm: bond.assigner.hydrogen,
                        acc_seqpos: acc.seqpos(),
                        acc_atm: bond.assigner.acceptor,
                        energy: bond.terms.raw,
                        weight: evaluator.energy_weight(&bond.terms, &env),
                        eval_tuple: bond.terms.tuple,
                    });
                });
                for hbond in found {
                    self.don_bbg_in_bb_bb_hbond[hbond.don_seqpos] = true;
                    self.acc_bbg_in_bb_bb_hbond[hbond.acc_seqpos] = true;
                    self.hbonds.push(hbond);
                }
            }
        }
        debug!(
            hbonds = self.hbonds.len(),
            claimed_donors = self.don_bbg_in_bb_bb_hbond.iter().filter(|&&b| b).count(),
            claimed_acceptors = self.acc_bbg_in_bb_bb_hbond.iter().filter(|&&b| b).count(),
            "Backbone hydrogen-bond pass finished."
        );
    }

    /// Groups helical residues into segments.
    ///
    /// Uses the secondary-structure labels when the structure carries any;
    /// otherwise residues `i..=i + 3` count as helical when the backbone pass
    /// found the `i - 1 -> i + 3` and `i -> i + 4` turns on one chain.
    fn assign_helices(&mut self, system: &MolecularSystem) {
        let n = system.total_residue();
        let labelled = system
            .residues_iter()
            .any(|(_, r)| r.secondary_structure != SecondaryStructure::Loop);

        let helical: Vec<bool> = if labelled {
            system
                .residues_iter()
                .map(|(_, r)| r.secondary_structure == SecondaryStructure::Helix)
                .collect()
        } else {
            let mut turn = vec![false; n];
            for hbond in &self.hbonds {
                let (acc, don) = (hbond.acc_seqpos, hbond.don_seqpos);
                if don == acc + HELIX_TURN && same_chain(system, acc, don) {
                    turn[acc] = true;
                }
            }
            let mut helical = vec![false; n];
            for i in 1..n {
                if turn[i - 1] && turn[i] {
                    for flag in helical.iter_mut().skip(i).take(HELIX_TURN) {
                        *flag = true;
                    }
                }
            }
            helical
        };

        let mut lengths: Vec<usize> = Vec::new();
        for seqpos in 0..n {
            if !helical[seqpos] {
                continue;
            }
            let continues = seqpos > 0
                && helical[seqpos - 1]
                && same_chain(system, seqpos - 1, seqpos);
            if !continues {
                lengths.push(0);
            }
            let segment = lengths.len() - 1;
            lengths[segment] += 1;
            self.helix_segment[seqpos] = Some(segment);
        }
        debug!(helices = lengths.len(), labelled, "Assigned helix segments.");
        self.helix_lengths = lengths;
    }

    fn apply_helix_scaling(&mut self) {
        let factors: Vec<f64> = self
            .hbonds
            .iter()
            .map(|hb| match hb.eval_tuple.weight_type {
                HBEvalWeightType::SrBb => self.ssdep_factor(hb.don_seqpos, hb.acc_seqpos),
                _ => 1.0,
            })
            .collect();
        for (hbond, factor) in self.hbonds.iter_mut().zip(factors) {
            hbond.weight *= factor;
        }
    }

    /// Residues within [`NEIGHBOR_RADIUS`] of `seqpos`, counting itself.
    #[inline]
    pub fn nbrs(&self, seqpos: usize) -> usize {
        self.nbrs.get(seqpos).copied().unwrap_or(1)
    }

    #[inline]
    pub fn don_bbg_in_bb_bb_hbond(&self, seqpos: usize) -> bool {
        self.don_bbg_in_bb_bb_hbond.get(seqpos).copied().unwrap_or(false)
    }

    #[inline]
    pub fn acc_bbg_in_bb_bb_hbond(&self, seqpos: usize) -> bool {
        self.acc_bbg_in_bb_bb_hbond.get(seqpos).copied().unwrap_or(false)
    }

    #[inline]
    pub fn residue_near_water(&self, seqpos: usize) -> bool {
        self.near_water.get(seqpos).copied().unwrap_or(false)
    }

    #[inline]
    pub fn pair_near_water(&self, seqpos1: usize, seqpos2: usize) -> bool {
        self.residue_near_water(seqpos1) || self.residue_near_water(seqpos2)
    }

    /// Length of the helix containing `seqpos`, if any.
    pub fn helix_length(&self, seqpos: usize) -> Option<usize> {
        let segment = (*self.helix_segment.get(seqpos)?)?;
        self.helix_lengths.get(segment).copied()
    }

    /// Helix-length factor of a residue pair: the scale of their helix when
    /// both sit in the same one, 1 otherwise.
    pub fn ssdep_factor(&self, seqpos1: usize, seqpos2: usize) -> f64 {
        let Some(scale) = &self.ssdep else {
            return 1.0;
        };
        match (
            self.helix_segment.get(seqpos1).copied().flatten(),
            self.helix_segment.get(seqpos2).copied().flatten(),
        ) {
            (Some(a), Some(b)) if a == b => scale.scale(self.helix_lengths[a]),
            _ => 1.0,
        }
    }

    #[inline]
    pub fn hbonds(&self) -> &[HBond] {
        &self.hbonds
    }

    #[inline]
    pub fn nhbonds(&self) -> usize {
        self.hbonds.len()
    }

    /// Adds the weighted energies of the recorded bonds to the backbone buckets.
    pub fn accumulate_backbone_energies(&self, totals: &mut EnergyMap) {
        for hbond in &self.hbonds {
            let score_type = match hbond.eval_tuple.weight_type {
                HBEvalWeightType::SrBb => ScoreType::HbondSrBb,
                HBEvalWeightType::LrBb => ScoreType::HbondLrBb,
                _ => continue,
            };
            totals[score_type] += hbond.weighted_energy();
        }
    }

    /// Takes over the backbone group flags of `other`, keeping this set's
    /// neighbor counts and bonds.
    pub fn copy_bb_donor_acceptor_arrays(&mut self, other: &HBondSet) {
        self.don_bbg_in_bb_bb_hbond = other.don_bbg_in_bb_bb_hbond.clone();
        self.acc_bbg_in_bb_bb_hbond = other.acc_bbg_in_bb_bb_hbond.clone();
    }
}

fn same_chain(system: &MolecularSystem, seqpos1: usize, seqpos2: usize) -> bool {
    match (system.residue_at(seqpos1), system.residue_at(seqpos2)) {
        (Some(a), Some(b)) => a.chain_id == b.chain_id,
        _ => false,
    }
}

fn neighbor_counts(system: &MolecularSystem) -> Vec<usize> {
    let positions: Vec<[f64; 3]> = system
        .residues_iter()
        .map(|(_, r)| r.nbr_position().coords.into())
        .collect();
    if positions.is_empty() {
        return Vec::new();
    }
    let kdtree: KdTree<f64, 3> = (&positions).into();
    let radius_sq = NEIGHBOR_RADIUS * NEIGHBOR_RADIUS;
    positions
        .iter()
        .map(|p| kdtree.within_unsorted::<SquaredEuclidean>(p, radius_sq).len())
        .collect()
}

/// Flags residues with an atom within `cutoff` of an atom of another hybrid
/// water.
fn near_water_flags(system: &MolecularSystem, cutoff: f64) -> Vec<bool> {
    let n = system.total_residue();
    let mut owners: Vec<usize> = Vec::new();
    let mut kdtree: KdTree<f64, 3> = KdTree::new();
    for (_, residue) in system.residues_iter().filter(|(_, r)| r.is_hybrid_water()) {
        for atom in residue.atoms() {
            kdtree.add(&atom.position.coords.into(), owners.len() as u64);
            owners.push(residue.seqpos());
        }
    }
    if owners.is_empty() {
        return vec![false; n];
    }

    let radius_sq = cutoff * cutoff;
    system
        .residues_iter()
        .map(|(_, residue)| {
            residue.atoms().iter().any(|atom| {
                kdtree
                    .within_unsorted::<SquaredEuclidean>(&atom.position.coords.into(), radius_sq)
                    .iter()
                    .any(|hit| owners[hit.item as usize] != residue.seqpos())
            })
        })
        .collect()
}
