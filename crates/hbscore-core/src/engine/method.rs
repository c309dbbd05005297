use super::cache::{HBondResPairMinData, HBondResidueMinData, MinimizationCache, TrieCollection};
use super::config::HBondOptions;
use super::context::ScoringContext;
use super::error::EngineError;
use super::evaluator::{
    ATOMIC_INTERACTION_CUTOFF, Exclusions, HBondEvaluator, PairEnvironment,
    within_interaction_range,
};
use super::hbond_set::HBondSet;
use super::hbtrie::{HBondTrieContext, build_trie};
use crate::core::forcefield::deriv::{BondSide, DerivVectorPair};
use crate::core::forcefield::params::HBondDatabase;
use crate::core::forcefield::term::{EnergyMap, ScoreType};
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::Residue;
use crate::core::models::system::MolecularSystem;
use crate::core::rotamers::set::RotamerSet;
use crate::core::trie::hbond::{HBCountPair, HBondTrie};
use crate::core::trie::traversal::{trie_vs_path, trie_vs_trie};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// The contract a scoring framework drives an energy method through.
///
/// Setup produces a per-round context that every later call reads; the
/// method itself never changes after construction.
pub trait EnergyMethod {
    type Context;

    fn setup_for_scoring(&self, system: &MolecularSystem) -> Result<Self::Context, EngineError>;

    /// Adds the energy between two different residues to `emap`.
    fn residue_pair_energy(
        &self,
        context: &Self::Context,
        rsd1: &Residue,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    );

    fn defines_score_for_residue_pair(
        &self,
        rsd1: &Residue,
        rsd2: &Residue,
        residues_moving_wrt_each_other: bool,
    ) -> bool;

    fn defines_intrares_energy(&self, weights: &EnergyMap) -> bool;

    fn eval_intrares_energy(&self, context: &Self::Context, rsd: &Residue, emap: &mut EnergyMap);

    /// Accumulates per-atom derivatives of the pair energy into the two slices.
    #[allow(clippy::too_many_arguments)]
    fn eval_residue_pair_derivatives(
        &self,
        context: &Self::Context,
        rsd1: &Residue,
        rsd2: &Residue,
        pair_data: &HBondResPairMinData,
        weights: &EnergyMap,
        r1_atom_derivs: &mut [DerivVectorPair],
        r2_atom_derivs: &mut [DerivVectorPair],
    );

    fn eval_intrares_derivatives(
        &self,
        context: &Self::Context,
        rsd: &Residue,
        weights: &EnergyMap,
        atom_derivs: &mut [DerivVectorPair],
    );

    fn finalize_total_energy(&self, context: &Self::Context, totals: &mut EnergyMap);

    fn atomic_interaction_cutoff(&self) -> f64;

    fn version(&self) -> u32;
}

/// The hydrogen-bond energy method.
#[derive(Debug, Clone)]
pub struct HBondEnergy {
    options: HBondOptions,
    database: Arc<HBondDatabase>,
}

impl HBondEnergy {
    pub fn new(options: HBondOptions, database: Arc<HBondDatabase>) -> Self {
        Self { options, database }
    }

    #[inline]
    pub fn options(&self) -> &HBondOptions {
        &self.options
    }

    #[inline]
    pub fn database(&self) -> &Arc<HBondDatabase> {
        &self.database
    }

    fn evaluator<'a>(&'a self, context: &'a ScoringContext) -> HBondEvaluator<'a> {
        HBondEvaluator::new(&self.options, &self.database, context.membrane())
    }

    fn excluded_pair(&self, rsd1: &Residue, rsd2: &Residue) -> bool {
        self.options.exclude_dna_dna && rsd1.is_dna() && rsd2.is_dna()
    }

    fn environment(
        &self,
        set: &HBondSet,
        don: &Residue,
        acc: &Residue,
        don_neighbors: usize,
        acc_neighbors: usize,
    ) -> PairEnvironment {
        PairEnvironment {
            don_neighbors,
            acc_neighbors,
            ssdep: set.ssdep_factor(don.seqpos(), acc.seqpos()),
            near_water: set.pair_near_water(don.seqpos(), acc.seqpos()),
        }
    }

    fn live_environment(&self, set: &HBondSet, don: &Residue, acc: &Residue) -> PairEnvironment {
        self.environment(set, don, acc, set.nbrs(don.seqpos()), set.nbrs(acc.seqpos()))
    }

    /// Exclusions of a donor→acceptor scan read from the current backbone pass.
    fn live_exclusions(&self, set: &HBondSet, don: &Residue, acc: &Residue) -> Exclusions {
        let check = self.options.bb_donor_acceptor_check;
        Exclusions {
            bb: !self.options.decompose_bb_hb_into_pair_energies,
            bb_acc_sc_don: acc.is_protein() && check && set.acc_bbg_in_bb_bb_hbond(acc.seqpos()),
            sc_acc_bb_don: don.is_protein() && check && set.don_bbg_in_bb_bb_hbond(don.seqpos()),
            sc: false,
        }
    }

    /// Exclusions read from the availability frozen when minimization began.
    fn frozen_exclusions(
        don_data: &HBondResidueMinData,
        acc_data: &HBondResidueMinData,
    ) -> Exclusions {
        Exclusions {
            bb: false,
            bb_acc_sc_don: !acc_data.bb_acc_avail,
            sc_acc_bb_don: !don_data.bb_don_avail,
            sc: false,
        }
    }

    /// Runs the backbone pass again for a minimization trajectory.
    ///
    /// When `existing` is given, its backbone group flags are carried over so
    /// that no backbone/backbone bond forms or breaks during minimization.
    pub fn setup_for_minimizing(
        &self,
        system: &MolecularSystem,
        existing: Option<&ScoringContext>,
    ) -> Result<ScoringContext, EngineError> {
        let mut context = self.setup_for_scoring(system)?;
        if let Some(existing) = existing {
            context
                .hbond_set_mut()
                .copy_bb_donor_acceptor_arrays(existing.hbond_set());
        }
        context.set_minimizing(true);
        debug!(
            carried_over = existing.is_some(),
            "Hydrogen-bond context prepared for minimization."
        );
        Ok(context)
    }

    /// Freezes the neighbor count and backbone availability of one residue.
    pub fn setup_for_minimizing_for_residue(
        &self,
        context: &ScoringContext,
        residue_id: ResidueId,
        residue: &Residue,
        cache: &mut MinimizationCache,
    ) -> Arc<HBondResidueMinData> {
        let set = context.hbond_set();
        let seqpos = residue.seqpos();
        let check = self.options.bb_donor_acceptor_check;
        let data = HBondResidueMinData::new(
            residue,
            set.nbrs(seqpos),
            check && set.don_bbg_in_bb_bb_hbond(seqpos),
            check && set.acc_bbg_in_bb_bb_hbond(seqpos),
        );
        cache.insert_residue(residue_id, data)
    }

    /// Links the cached records of two residues into a pair record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingMinimizationData`] for the first residue
    /// without a record.
    pub fn setup_for_minimizing_for_residue_pair(
        &self,
        cache: &mut MinimizationCache,
        id1: ResidueId,
        id2: ResidueId,
    ) -> Result<HBondResPairMinData, EngineError> {
        for residue_id in [id1, id2] {
            if cache.residue(residue_id).is_none() {
                return Err(EngineError::MissingMinimizationData { residue_id });
            }
        }
        cache
            .insert_pair(id1, id2)
            .cloned()
            .ok_or(EngineError::MissingMinimizationData { residue_id: id1 })
    }

    /// Pair energy using the availability frozen in `pair_data`.
    pub fn residue_pair_energy_ext(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        pair_data: &HBondResPairMinData,
        emap: &mut EnergyMap,
    ) {
        if self.excluded_pair(rsd1, rsd2) || !within_interaction_range(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        for (don, acc, res1_donates) in [(rsd1, rsd2, true), (rsd2, rsd1, false)] {
            let (don_data, acc_data) = pair_data.oriented(res1_donates);
            let env =
                self.environment(set, don, acc, don_data.nneighbors, acc_data.nneighbors);
            evaluator.identify_hbonds_1way(
                don,
                acc,
                Self::frozen_exclusions(don_data, acc_data),
                &env,
                emap,
            );
        }
    }

    /// Backbone/backbone bonds between the two residues, both directions.
    ///
    /// Only contributes when backbone bonds are decomposed into pair
    /// energies; otherwise they are added once in
    /// [`EnergyMethod::finalize_total_energy`].
    pub fn backbone_backbone_energy(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    ) {
        if !self.options.decompose_bb_hb_into_pair_energies || self.excluded_pair(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        for (don, acc) in [(rsd1, rsd2), (rsd2, rsd1)] {
            let env = self.live_environment(set, don, acc);
            evaluator.identify_hbonds_1way(don, acc, Exclusions::BACKBONE_ONLY, &env, emap);
        }
    }

    /// Bonds between the backbone of `rsd1` and the sidechain of `rsd2`.
    ///
    /// A direction is dropped entirely when the backbone group of `rsd1` it
    /// needs is already claimed by a backbone/backbone bond.
    pub fn backbone_sidechain_energy(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    ) {
        if self.excluded_pair(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        let check = self.options.bb_donor_acceptor_check && rsd1.is_protein();
        let seqpos = rsd1.seqpos();

        if !(check && set.don_bbg_in_bb_bb_hbond(seqpos)) {
            let exclusions = Exclusions {
                bb: true,
                bb_acc_sc_don: true,
                sc_acc_bb_don: false,
                sc: true,
            };
            let env = self.live_environment(set, rsd1, rsd2);
            evaluator.identify_hbonds_1way(rsd1, rsd2, exclusions, &env, emap);
        }
        if !(check && set.acc_bbg_in_bb_bb_hbond(seqpos)) {
            let exclusions = Exclusions {
                bb: true,
                bb_acc_sc_don: false,
                sc_acc_bb_don: true,
                sc: true,
            };
            let env = self.live_environment(set, rsd2, rsd1);
            evaluator.identify_hbonds_1way(rsd2, rsd1, exclusions, &env, emap);
        }
    }

    pub fn sidechain_sidechain_energy(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    ) {
        if self.excluded_pair(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        let exclusions = Exclusions {
            bb: true,
            bb_acc_sc_don: true,
            sc_acc_bb_don: true,
            sc: false,
        };
        for (don, acc) in [(rsd1, rsd2), (rsd2, rsd1)] {
            let env = self.live_environment(set, don, acc);
            evaluator.identify_hbonds_1way(don, acc, exclusions, &env, emap);
        }
    }

    /// Energy of the bonds between two atoms.
    ///
    /// For different residues, one atom must be a polar hydrogen and the
    /// other an acceptor. Within one residue, any bond whose acceptor is one
    /// atom and whose hydrogen or donor heavy atom is the other counts.
    pub fn atomistic_pair_energy(
        &self,
        context: &ScoringContext,
        atm1: usize,
        rsd1: &Residue,
        atm2: usize,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    ) {
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);

        if rsd1.seqpos() == rsd2.seqpos() {
            if !evaluator.calculates_intra(rsd1) {
                return;
            }
            let env = self.live_environment(set, rsd1, rsd1);
            let touches = |bond_atom: usize, donor: usize, hydrogen: usize| {
                bond_atom == donor || bond_atom == hydrogen
            };
            evaluator.scan(rsd1, rsd1, Exclusions::default(), false, |bond| {
                let a = &bond.assigner;
                if (touches(atm1, a.donor, a.hydrogen) && a.acceptor == atm2)
                    || (touches(atm2, a.donor, a.hydrogen) && a.acceptor == atm1)
                {
                    evaluator.score_bond(&bond.terms, &env, emap);
                }
            });
            return;
        }

        if self.excluded_pair(rsd1, rsd2) {
            return;
        }
        let is_polar_h = |rsd: &Residue, atm: usize| rsd.polar_hydrogens().contains(&atm);
        let is_acceptor = |rsd: &Residue, atm: usize| rsd.acceptors().contains(&atm);
        let (don, hatm, acc, aatm) = if is_polar_h(rsd1, atm1) && is_acceptor(rsd2, atm2) {
            (rsd1, atm1, rsd2, atm2)
        } else if is_polar_h(rsd2, atm2) && is_acceptor(rsd1, atm1) {
            (rsd2, atm2, rsd1, atm1)
        } else {
            return;
        };

        let env = self.live_environment(set, don, acc);
        let exclusions = self.live_exclusions(set, don, acc);
        evaluator.scan(don, acc, exclusions, false, |bond| {
            if bond.assigner.hydrogen == hatm && bond.assigner.acceptor == aatm {
                evaluator.score_bond(&bond.terms, &env, emap);
            }
        });
    }

    /// Squared hydrogen/heavy-atom distance beyond which nothing interacts.
    pub fn hydrogen_interaction_cutoff2(&self) -> f64 {
        ATOMIC_INTERACTION_CUTOFF * ATOMIC_INTERACTION_CUTOFF
    }

    /// Scoring setup plus one background trie per residue.
    pub fn setup_for_packing(&self, system: &MolecularSystem) -> Result<ScoringContext, EngineError> {
        let mut context = self.setup_for_scoring(system)?;
        let mut tries = TrieCollection::with_capacity(system.total_residue());
        for (_, residue) in system.residues_iter() {
            let trie = self.create_residue_trie(&context, residue);
            tries.set(residue.seqpos(), Arc::new(trie));
        }
        debug!(tries = tries.len(), "Built background hydrogen-bond tries.");
        context.set_tries(tries);
        Ok(context)
    }

    /// Builds and stores the trie of a rotamer set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyRotamerSet`] for a set without rotamers.
    pub fn prepare_rotamers_for_packing(
        &self,
        context: &ScoringContext,
        rotamers: &mut RotamerSet,
    ) -> Result<(), EngineError> {
        if rotamers.is_empty() {
            return Err(EngineError::EmptyRotamerSet {
                seqpos: rotamers.seqpos(),
            });
        }
        let trie = self.create_rotamer_trie(context, rotamers);
        trace!(
            seqpos = rotamers.seqpos(),
            rotamers = rotamers.len(),
            nodes = trie.nodes().len(),
            "Built rotamer trie."
        );
        rotamers.set_trie(Arc::new(trie));
        Ok(())
    }

    /// Replaces the background trie of `residue` after a substitution.
    pub fn update_residue_for_packing(&self, context: &mut ScoringContext, residue: &Residue) {
        let trie = Arc::new(self.create_residue_trie(context, residue));
        if let Some(tries) = context.tries_mut() {
            tries.set(residue.seqpos(), trie);
        }
    }

    pub fn create_rotamer_trie(&self, context: &ScoringContext, rotamers: &RotamerSet) -> HBondTrie {
        build_trie(rotamers.rotamers(), context.hbond_set(), &self.options)
    }

    pub fn create_residue_trie(&self, context: &ScoringContext, residue: &Residue) -> HBondTrie {
        build_trie([residue], context.hbond_set(), &self.options)
    }

    /// Adds the weighted energy of every rotamer pair of the two sets to
    /// `table[r1][r2]`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingTrie`] when a set was not prepared for
    /// packing, or [`EngineError::EmptyRotamerSet`] for an empty set.
    pub fn evaluate_rotamer_pair_energies(
        &self,
        context: &ScoringContext,
        set1: &RotamerSet,
        set2: &RotamerSet,
        weights: &EnergyMap,
        table: &mut [Vec<f64>],
    ) -> Result<(), EngineError> {
        let (site1, trie1) = prepared(set1)?;
        let (site2, trie2) = prepared(set2)?;
        if self.excluded_pair(site1, site2) {
            return Ok(());
        }
        let trie_context = HBondTrieContext::new(
            self.evaluator(context),
            context.hbond_set(),
            *weights,
            site1,
            site2,
        );
        let energies = trie_vs_trie(trie1, trie2, &HBCountPair, &trie_context);
        for (row, computed) in table.iter_mut().zip(energies) {
            for (cell, energy) in row.iter_mut().zip(computed) {
                *cell += energy;
            }
        }
        Ok(())
    }

    /// Adds the weighted energy of every rotamer of `set` against the
    /// background residue to `energies`.
    ///
    /// Nothing is added when the background residue has no trie.
    pub fn evaluate_rotamer_background_energies(
        &self,
        context: &ScoringContext,
        set: &RotamerSet,
        background: &Residue,
        weights: &EnergyMap,
        energies: &mut [f64],
    ) -> Result<(), EngineError> {
        let (site, trie) = prepared(set)?;
        if self.excluded_pair(site, background) {
            return Ok(());
        }
        let Some(background_trie) = context.tries().and_then(|t| t.get(background.seqpos()))
        else {
            trace!(
                seqpos = background.seqpos(),
                "No background trie; skipping rotamer energies."
            );
            return Ok(());
        };
        let trie_context = HBondTrieContext::new(
            self.evaluator(context),
            context.hbond_set(),
            *weights,
            site,
            background,
        );
        let computed = trie_vs_path(trie, background_trie, &HBCountPair, &trie_context);
        for (slot, energy) in energies.iter_mut().zip(computed) {
            *slot += energy;
        }
        Ok(())
    }
}

fn prepared(set: &RotamerSet) -> Result<(&Residue, &HBondTrie), EngineError> {
    let seqpos = set.seqpos();
    let site = set
        .rotamer(0)
        .ok_or(EngineError::EmptyRotamerSet { seqpos })?;
    let trie = set.trie().ok_or(EngineError::MissingTrie { seqpos })?;
    Ok((site, trie.as_ref()))
}

impl EnergyMethod for HBondEnergy {
    type Context = ScoringContext;

    fn setup_for_scoring(&self, system: &MolecularSystem) -> Result<ScoringContext, EngineError> {
        let context = ScoringContext::new(system, &self.options, &self.database)?;
        info!(
            residues = system.total_residue(),
            membrane = context.membrane().is_some(),
            "Hydrogen-bond scoring set up."
        );
        Ok(context)
    }

    fn residue_pair_energy(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        emap: &mut EnergyMap,
    ) {
        debug_assert_ne!(rsd1.seqpos(), rsd2.seqpos(), "pair energy of a residue with itself");
        if rsd1.seqpos() == rsd2.seqpos() || self.excluded_pair(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        for (don, acc) in [(rsd1, rsd2), (rsd2, rsd1)] {
            let env = self.live_environment(set, don, acc);
            let exclusions = self.live_exclusions(set, don, acc);
            evaluator.identify_hbonds_1way(don, acc, exclusions, &env, emap);
        }
    }

    fn defines_score_for_residue_pair(
        &self,
        _rsd1: &Residue,
        _rsd2: &Residue,
        residues_moving_wrt_each_other: bool,
    ) -> bool {
        residues_moving_wrt_each_other
    }

    fn defines_intrares_energy(&self, weights: &EnergyMap) -> bool {
        weights[ScoreType::HbondIntra] > 0.0 || weights[ScoreType::Hbond] > 0.0
    }

    fn eval_intrares_energy(&self, context: &ScoringContext, rsd: &Residue, emap: &mut EnergyMap) {
        let evaluator = self.evaluator(context);
        if !evaluator.calculates_intra(rsd) {
            return;
        }
        let env = self.live_environment(context.hbond_set(), rsd, rsd);
        evaluator.identify_hbonds_1way(rsd, rsd, Exclusions::default(), &env, emap);
    }

    fn eval_residue_pair_derivatives(
        &self,
        context: &ScoringContext,
        rsd1: &Residue,
        rsd2: &Residue,
        pair_data: &HBondResPairMinData,
        weights: &EnergyMap,
        r1_atom_derivs: &mut [DerivVectorPair],
        r2_atom_derivs: &mut [DerivVectorPair],
    ) {
        debug_assert!(r1_atom_derivs.len() >= rsd1.atoms().len());
        debug_assert!(r2_atom_derivs.len() >= rsd2.atoms().len());
        if self.excluded_pair(rsd1, rsd2) || !within_interaction_range(rsd1, rsd2) {
            return;
        }
        let set = context.hbond_set();
        let evaluator = self.evaluator(context);
        for (don, acc, res1_donates) in [(rsd1, rsd2, true), (rsd2, rsd1, false)] {
            let (don_data, acc_data) = pair_data.oriented(res1_donates);
            let env = self.environment(set, don, acc, don_data.nneighbors, acc_data.nneighbors);
            let exclusions = Self::frozen_exclusions(don_data, acc_data);
            evaluator.hbond_derivs_1way(don, acc, exclusions, &env, weights, |side, index, deriv| {
                let on_rsd1 = (side == BondSide::Donor) == res1_donates;
                let target = if on_rsd1 {
                    &mut *r1_atom_derivs
                } else {
                    &mut *r2_atom_derivs
                };
                if let Some(slot) = target.get_mut(index) {
                    *slot += deriv;
                }
            });
        }
    }

    fn eval_intrares_derivatives(
        &self,
        context: &ScoringContext,
        rsd: &Residue,
        weights: &EnergyMap,
        atom_derivs: &mut [DerivVectorPair],
    ) {
        let evaluator = self.evaluator(context);
        if !evaluator.calculates_intra(rsd) {
            return;
        }
        let near_water =
            self.options.water_hybrid_sf && context.hbond_set().residue_near_water(rsd.seqpos());
        let env = PairEnvironment {
            don_neighbors: 1,
            acc_neighbors: 1,
            ssdep: 1.0,
            near_water,
        };
        evaluator.hbond_derivs_1way(rsd, rsd, Exclusions::default(), &env, weights, |_, index, deriv| {
            if let Some(slot) = atom_derivs.get_mut(index) {
                *slot += deriv;
            }
        });
    }

    fn finalize_total_energy(&self, context: &ScoringContext, totals: &mut EnergyMap) {
        if context.is_minimizing() || self.options.decompose_bb_hb_into_pair_energies {
            return;
        }
        context.hbond_set().accumulate_backbone_energies(totals);
    }

    fn atomic_interaction_cutoff(&self) -> f64 {
        ATOMIC_INTERACTION_CUTOFF
    }

    fn version(&self) -> u32 {
        3
    }
}
