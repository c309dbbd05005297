use super::config::HBondOptions;
use crate::core::forcefield::deriv::{BondSide, DerivVectorPair, HBDerivAssigner};
use crate::core::forcefield::energy::{HBondGeometry, HBondGradient, MAX_R, MAX_R2, hb_energy_deriv};
use crate::core::forcefield::params::HBondDatabase;
use crate::core::forcefield::potentials::smoothstep;
use crate::core::forcefield::term::{EnergyMap, ScoreType};
use crate::core::forcefield::types::{HBEvalTuple, HBEvalWeightType};
use crate::core::forcefield::weights::{environment_weight, membrane_weight};
use crate::core::models::membrane::MembraneGeometry;
use crate::core::models::residue::Residue;
use nalgebra::Point3;
use tracing::trace;

/// Largest heavy-atom distance at which two atoms can still interact: the
/// H···A cutoff plus the longest X-H bond (the cysteine S-H).
pub const ATOMIC_INTERACTION_CUTOFF: f64 = MAX_R + 1.35;

/// Fewest covalent bonds between donor heavy atom and acceptor for an
/// intra-residue bond to count.
const MIN_INTRA_BOND_SEPARATION: usize = 3;

const WATER_ENTROPY_STEP: (f64, f64) = (-0.55, -0.45);

/// Whether the bounding spheres of two residues come within interaction range.
pub(crate) fn within_interaction_range(rsd1: &Residue, rsd2: &Residue) -> bool {
    let reach = rsd1.nbr_radius() + rsd2.nbr_radius() + ATOMIC_INTERACTION_CUTOFF;
    nalgebra::distance_squared(rsd1.nbr_position(), rsd2.nbr_position()) <= reach * reach
}

/// Backbone/sidechain partitions skipped by a donor→acceptor scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Exclusions {
    /// Backbone donor, backbone acceptor.
    pub bb: bool,
    /// Sidechain donor, backbone acceptor.
    pub bb_acc_sc_don: bool,
    /// Backbone donor, sidechain acceptor.
    pub sc_acc_bb_don: bool,
    /// Sidechain donor, sidechain acceptor.
    pub sc: bool,
}

impl Exclusions {
    pub const BACKBONE_ONLY: Self = Self {
        bb: false,
        bb_acc_sc_don: true,
        sc_acc_bb_don: true,
        sc: true,
    };

    #[inline]
    pub fn skips(&self, don_is_bb: bool, acc_is_bb: bool) -> bool {
        match (don_is_bb, acc_is_bb) {
            (true, true) => self.bb,
            (false, true) => self.bb_acc_sc_don,
            (true, false) => self.sc_acc_bb_don,
            (false, false) => self.sc,
        }
    }
}

/// Context of one donor-residue/acceptor-residue scan.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairEnvironment {
    pub don_neighbors: usize,
    pub acc_neighbors: usize,
    /// Helix-length factor of the residue pair (1 when not applicable).
    pub ssdep: f64,
    pub near_water: bool,
}

/// What the weighting and bucketing of one bond depend on, independent of
/// whether it came from residues or from trie atoms.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BondTerms {
    pub tuple: HBEvalTuple,
    pub raw: f64,
    pub hydrogen: Point3<f64>,
    pub acceptor: Point3<f64>,
    pub involves_dna: bool,
    pub don_is_water: bool,
    pub acc_is_water: bool,
    pub intra: bool,
}

/// A bond found by [`HBondEvaluator::scan`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct FoundBond {
    pub terms: BondTerms,
    pub assigner: HBDerivAssigner,
    pub gradient: Option<HBondGradient>,
}

/// Stateless donor→acceptor evaluation shared by every scoring path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HBondEvaluator<'a> {
    pub options: &'a HBondOptions,
    pub database: &'a HBondDatabase,
    pub membrane: Option<&'a MembraneGeometry>,
}

impl<'a> HBondEvaluator<'a> {
    pub fn new(
        options: &'a HBondOptions,
        database: &'a HBondDatabase,
        membrane: Option<&'a MembraneGeometry>,
    ) -> Self {
        Self {
            options,
            database,
            membrane,
        }
    }

    /// Whether intra-residue bonds are evaluated for `residue`.
    pub fn calculates_intra(&self, residue: &Residue) -> bool {
        if residue.is_protein() {
            self.options.include_intra_res_protein
        } else if residue.is_rna() {
            self.options.include_intra_res_rna
        } else {
            false
        }
    }

    /// Raw energy of one geometry, or `None` when no bond forms.
    pub fn bond_energy(
        &self,
        tuple: &HBEvalTuple,
        geometry: &HBondGeometry,
        evaluate_gradient: bool,
    ) -> Option<(f64, Option<HBondGradient>)> {
        if nalgebra::distance_squared(&geometry.hydrogen, &geometry.acceptor) > MAX_R2 {
            return None;
        }
        let (raw, gradient) = hb_energy_deriv(self.database, tuple, geometry, evaluate_gradient);
        (raw < self.options.max_hb_energy).then_some((raw, gradient))
    }

    /// Visits every bond from a polar hydrogen of `don` to an acceptor of `acc`.
    pub fn scan(
        &self,
        don: &Residue,
        acc: &Residue,
        exclusions: Exclusions,
        evaluate_gradient: bool,
        mut visit: impl FnMut(&FoundBond),
    ) {
        let intra = don.seqpos() == acc.seqpos();
        if intra && !self.calculates_intra(don) {
            return;
        }
        let separation = acc.seqpos() as isize - don.seqpos() as isize;
        let same_chain = don.chain_id == acc.chain_id;
        let involves_dna = don.is_dna() || acc.is_dna();
        let (don_is_water, acc_is_water) = (don.is_hybrid_water(), acc.is_hybrid_water());

        for &hatm in don.polar_hydrogens() {
            let datm = don.atom_base(hatm);
            let Some(don_type) = don.atom(datm).donor_type else {
                continue;
            };
            let datm_is_bb = don.is_backbone_atom(datm);
            let hydrogen = *don.position(hatm);

            for &aatm in acc.acceptors() {
                let acceptor = acc.atom(aatm);
                let (Some(acc_type), Some(base)) = (acceptor.acceptor_type, acceptor.base) else {
                    continue;
                };
                let aatm_is_bb = acc.is_backbone_atom(aatm);
                if exclusions.skips(datm_is_bb, aatm_is_bb) {
                    continue;
                }
                if intra
                    && don
                        .path_distance(datm, aatm)
                        .is_some_and(|n| n < MIN_INTRA_BOND_SEPARATION)
                {
                    continue;
                }
                if nalgebra::distance_squared(&hydrogen, &acceptor.position) > MAX_R2 {
                    continue;
                }

                let base2 = acc.atom_base2(aatm);
                let tuple = HBEvalTuple::classify(
                    don_type,
                    datm_is_bb,
                    acc_type,
                    aatm_is_bb,
                    separation,
                    same_chain,
                );
                let geometry = HBondGeometry {
                    donor: *don.position(datm),
                    hydrogen,
                    acceptor: acceptor.position,
                    base: *acc.position(base),
                    base2: *acc.position(base2),
                };
                let Some((raw, gradient)) = self.bond_energy(&tuple, &geometry, evaluate_gradient)
                else {
                    continue;
                };

                trace!(
                    donor = don.seqpos(),
                    hydrogen = hatm,
                    acceptor = acc.seqpos(),
                    acceptor_atom = aatm,
                    kind = %tuple.weight_type,
                    raw,
                    "Found hydrogen bond."
                );
                visit(&FoundBond {
                    terms: BondTerms {
                        tuple,
                        raw,
                        hydrogen,
                        acceptor: acceptor.position,
                        involves_dna,
                        don_is_water,
                        acc_is_water,
                        intra,
                    },
                    assigner: HBDerivAssigner {
                        donor: datm,
                        hydrogen: hatm,
                        acceptor: aatm,
                        base,
                        base2,
                    },
                    gradient,
                });
            }
        }
    }

    /// Burial weight of the pair, or 1 when environment dependence is off.
    pub fn environment_weight(&self, terms: &BondTerms, env: &PairEnvironment) -> f64 {
        let enabled = if terms.involves_dna {
            self.options.use_hb_env_dep_dna
        } else {
            self.options.use_hb_env_dep
        };
        if enabled {
            environment_weight(
                self.options.smooth_hb_env_dep,
                env.don_neighbors,
                env.acc_neighbors,
            )
        } else {
            1.0
        }
    }

    /// Everything the raw energy is multiplied by before it lands in a bucket.
    pub fn energy_weight(&self, terms: &BondTerms, env: &PairEnvironment) -> f64 {
        let mut weight = self.environment_weight(terms, env);
        if self.options.water_hybrid_sf && env.near_water {
            weight = 1.0;
        }
        match self.membrane {
            Some(membrane) => membrane_weight(membrane, weight, &terms.hydrogen, &terms.acceptor),
            None if terms.tuple.weight_type == HBEvalWeightType::SrBb => weight * env.ssdep,
            None => weight,
        }
    }

    /// Bucket of a bond that does not involve a hybrid water.
    pub fn score_type(&self, tuple: &HBEvalTuple, intra: bool, put_intra_into_total: bool) -> ScoreType {
        if intra {
            return if put_intra_into_total {
                ScoreType::Hbond
            } else {
                ScoreType::HbondIntra
            };
        }
        match tuple.weight_type {
            HBEvalWeightType::SrBb => ScoreType::HbondSrBb,
            HBEvalWeightType::LrBb => ScoreType::HbondLrBb,
            HBEvalWeightType::BbSc => ScoreType::HbondBbSc,
            HBEvalWeightType::Sc => ScoreType::HbondSc,
        }
    }

    /// Adds one bond to `emap`.
    pub fn score_bond(&self, terms: &BondTerms, env: &PairEnvironment, emap: &mut EnergyMap) {
        let energy = terms.raw * self.energy_weight(terms, env);
        if self.options.water_hybrid_sf {
            if terms.don_is_water != terms.acc_is_water {
                let (lo, hi) = WATER_ENTROPY_STEP;
                emap[ScoreType::WatEntropy] += 1.0 - smoothstep(terms.raw, lo, hi);
            }
            if terms.don_is_water || terms.acc_is_water {
                emap[ScoreType::HbondWat] += energy;
                return;
            }
        }
        let score_type = self.score_type(
            &terms.tuple,
            terms.intra,
            self.options.put_intra_into_total,
        );
        emap[score_type] += energy;
    }

    /// Accumulates the energies of all bonds from `don` to `acc`.
    pub fn identify_hbonds_1way(
        &self,
        don: &Residue,
        acc: &Residue,
        exclusions: Exclusions,
        env: &PairEnvironment,
        emap: &mut EnergyMap,
    ) {
        self.scan(don, acc, exclusions, false, |bond| {
            self.score_bond(&bond.terms, env, emap);
        });
    }

    /// Weight applied to the raw gradient of a bond.
    ///
    /// Unlike [`Self::energy_weight`], the helix-length factor applies to
    /// every bond type, the water override drops it, and the membrane weight
    /// replaces the environment weight outright.
    pub fn derivative_weight(
        &self,
        terms: &BondTerms,
        env: &PairEnvironment,
        weights: &EnergyMap,
    ) -> f64 {
        let put_intra = self.options.put_intra_into_total;
        let type_weight = weights[self.score_type(&terms.tuple, terms.intra, put_intra)];
        let env_weight = self.environment_weight(terms, env);

        let mut weight = env_weight * type_weight * env.ssdep;
        if self.options.water_hybrid_sf && env.near_water {
            weight = weights[self.score_type(&terms.tuple, terms.intra, false)];
        }
        if let Some(membrane) = self.membrane {
            weight = membrane_weight(membrane, env_weight, &terms.hydrogen, &terms.acceptor)
                * type_weight;
        }
        weight
    }

    /// Accumulates weighted atom derivatives of all bonds from `don` to `acc`.
    ///
    /// `sink` receives each contribution with the side and residue-local
    /// index of the atom it belongs to.
    pub fn hbond_derivs_1way(
        &self,
        don: &Residue,
        acc: &Residue,
        exclusions: Exclusions,
        env: &PairEnvironment,
        weights: &EnergyMap,
        mut sink: impl FnMut(BondSide, usize, DerivVectorPair),
    ) {
        self.scan(don, acc, exclusions, true, |bond| {
            let Some(gradient) = &bond.gradient else {
                return;
            };
            let weight = self.derivative_weight(&bond.terms, env, weights);
            for (side, index, grad) in bond.assigner.assign(gradient, weight) {
                let position = match side {
                    BondSide::Donor => don.position(index),
                    BondSide::Acceptor => acc.position(index),
                };
                sink(side, index, DerivVectorPair::from_gradient(position, &grad));
            }
        });
    }
}
