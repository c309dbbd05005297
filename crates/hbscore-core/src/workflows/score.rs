use crate::core::forcefield::deriv::DerivVectorPair;
use crate::core::forcefield::term::EnergyMap;
use crate::core::models::system::MolecularSystem;
use crate::engine::cache::MinimizationCache;
use crate::engine::context::ScoringContext;
use crate::engine::error::EngineError;
use crate::engine::evaluator::within_interaction_range;
use crate::engine::method::{EnergyMethod, HBondEnergy};
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What a scoring run computes besides the totals.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub weights: EnergyMap,
    /// Keep the energy of every residue pair with a non-zero contribution.
    pub keep_pairs: bool,
    /// Also accumulate per-atom derivatives.
    pub derivatives: bool,
}

impl Default for ScoreRequest {
    fn default() -> Self {
        Self {
            weights: EnergyMap::filled(1.0),
            keep_pairs: false,
            derivatives: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairEnergy {
    pub seqpos1: usize,
    pub seqpos2: usize,
    pub energies: EnergyMap,
    pub weighted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomDerivative {
    pub seqpos: usize,
    pub atom_name: String,
    pub deriv: DerivVectorPair,
}

#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// Unweighted energies per score term, backbone/backbone bonds included.
    pub totals: EnergyMap,
    pub weighted_total: f64,
    pub backbone_hbonds: usize,
    pub pairs: Vec<PairEnergy>,
    /// Non-zero atom derivatives, in sequence order.
    pub derivatives: Option<Vec<AtomDerivative>>,
}

/// Scores every residue pair in interaction range plus the intra-residue
/// bonds, then adds the backbone/backbone bonds of the set.
#[instrument(skip_all, name = "score_workflow")]
pub fn run(
    system: &MolecularSystem,
    method: &HBondEnergy,
    request: &ScoreRequest,
    reporter: &ProgressReporter,
) -> Result<ScoreReport, EngineError> {
    let context = reporter.phase("Setup", || method.setup_for_scoring(system))?;
    let pairs = interacting_pairs(system);
    debug!(pairs = pairs.len(), "Collected interacting residue pairs.");

    reporter.report(Progress::PhaseStart { name: "Pair Energies" });
    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let pair_energies: Vec<PairEnergy> = iterator
        .filter_map(|&(i, j)| {
            let result = score_pair(system, method, &context, i, j, &request.weights);
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let mut totals = pair_energies
        .iter()
        .fold(EnergyMap::new(), |acc, pair| acc + pair.energies);

    if method.defines_intrares_energy(&request.weights) {
        for (_, residue) in system.residues_iter() {
            method.eval_intrares_energy(&context, residue, &mut totals);
        }
    }
    method.finalize_total_energy(&context, &mut totals);

    let derivatives = if request.derivatives {
        Some(reporter.phase("Derivatives", || {
            atom_derivatives(system, method, &context, &pairs, &request.weights)
        })?)
    } else {
        None
    };

    let weighted_total = totals.dot(&request.weights);
    info!(
        weighted_total,
        scored_pairs = pair_energies.len(),
        backbone_hbonds = context.hbond_set().nhbonds(),
        "Scoring finished."
    );

    Ok(ScoreReport {
        totals,
        weighted_total,
        backbone_hbonds: context.hbond_set().nhbonds(),
        pairs: if request.keep_pairs {
            pair_energies
        } else {
            Vec::new()
        },
        derivatives,
    })
}

fn interacting_pairs(system: &MolecularSystem) -> Vec<(usize, usize)> {
    (0..system.total_residue())
        .tuple_combinations()
        .filter(|&(i, j)| match (system.residue_at(i), system.residue_at(j)) {
            (Some(a), Some(b)) => within_interaction_range(a, b),
            _ => false,
        })
        .collect()
}

fn score_pair(
    system: &MolecularSystem,
    method: &HBondEnergy,
    context: &ScoringContext,
    i: usize,
    j: usize,
    weights: &EnergyMap,
) -> Option<PairEnergy> {
    let (rsd1, rsd2) = (system.residue_at(i)?, system.residue_at(j)?);
    let mut energies = EnergyMap::new();
    method.residue_pair_energy(context, rsd1, rsd2, &mut energies);
    (!energies.is_zero()).then(|| PairEnergy {
        seqpos1: i,
        seqpos2: j,
        weighted: energies.dot(weights),
        energies,
    })
}

/// Per-atom derivatives with the backbone groups of `context` frozen, the way
/// a minimizer would see them at its starting point.
fn atom_derivatives(
    system: &MolecularSystem,
    method: &HBondEnergy,
    context: &ScoringContext,
    pairs: &[(usize, usize)],
    weights: &EnergyMap,
) -> Result<Vec<AtomDerivative>, EngineError> {
    let minimizing = method.setup_for_minimizing(system, Some(context))?;
    let mut cache = MinimizationCache::new();
    for (id, residue) in system.residues_iter() {
        method.setup_for_minimizing_for_residue(&minimizing, id, residue, &mut cache);
    }

    let mut derivs: Vec<Vec<DerivVectorPair>> = system
        .residues_iter()
        .map(|(_, r)| vec![DerivVectorPair::default(); r.atoms().len()])
        .collect();

    for &(i, j) in pairs {
        let (Some(id1), Some(id2)) = (system.residue_id_at(i), system.residue_id_at(j)) else {
            continue;
        };
        let (Some(rsd1), Some(rsd2)) = (system.residue(id1), system.residue(id2)) else {
            continue;
        };
        let pair_data = method.setup_for_minimizing_for_residue_pair(&mut cache, id1, id2)?;
        let (head, tail) = derivs.split_at_mut(j);
        method.eval_residue_pair_derivatives(
            &minimizing,
            rsd1,
            rsd2,
            &pair_data,
            weights,
            &mut head[i],
            &mut tail[0],
        );
    }

    if method.defines_intrares_energy(weights) {
        for (_, residue) in system.residues_iter() {
            method.eval_intrares_derivatives(
                &minimizing,
                residue,
                weights,
                &mut derivs[residue.seqpos()],
            );
        }
    }

    let report = system
        .residues_iter()
        .zip(derivs)
        .flat_map(|((_, residue), atoms)| {
            atoms
                .into_iter()
                .enumerate()
                .filter(|(_, d)| d.f2.norm_squared() > 0.0)
                .map(|(index, deriv)| AtomDerivative {
                    seqpos: residue.seqpos(),
                    atom_name: residue.atom(index).name.clone(),
                    deriv,
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::term::ScoreType;
    use crate::engine::config::HBondOptionsBuilder;
    use crate::engine::test_utils::{backbone_pair, database};
    use std::sync::Mutex;

    fn flat_method() -> HBondEnergy {
        let options = HBondOptionsBuilder::new()
            .use_hb_env_dep(false)
            .bb_donor_acceptor_check(false)
            .build()
            .unwrap();
        HBondEnergy::new(options, database())
    }

    #[test]
    fn totals_include_backbone_and_sidechain_bonds() {
        let fixture = backbone_pair(0, true, true);
        let request = ScoreRequest {
            keep_pairs: true,
            ..ScoreRequest::default()
        };
        let report = run(&fixture.system, &flat_method(), &request, &ProgressReporter::new()).unwrap();

        assert_eq!(report.backbone_hbonds, 1);
        assert!((report.totals[ScoreType::HbondSrBb] + 1.0).abs() < 1e-3);
        assert!(report.totals[ScoreType::HbondBbSc] < 0.0);
        assert!((report.weighted_total - report.totals.total()).abs() < 1e-12);
        // Backbone bonds are not decomposed, so the pairs hold only the
        // sidechain contributions.
        assert!(
            report
                .pairs
                .iter()
                .all(|p| p.energies[ScoreType::HbondSrBb] == 0.0)
        );
        assert!(report.pairs.iter().any(|p| p.seqpos1 == 1 && p.seqpos2 == 2));
        assert!(report.derivatives.is_none());
    }

    #[test]
    fn decomposed_pairs_add_up_to_the_same_totals() {
        let fixture = backbone_pair(0, true, true);
        let plain = run(&fixture.system, &flat_method(), &ScoreRequest::default(), &ProgressReporter::new()).unwrap();

        let options = HBondOptionsBuilder::from_options(flat_method().options().clone())
            .decompose_bb_hb_into_pair_energies(true)
            .build()
            .unwrap();
        let decomposed = HBondEnergy::new(options, database());
        let report = run(&fixture.system, &decomposed, &ScoreRequest::default(), &ProgressReporter::new()).unwrap();

        for score_type in ScoreType::ALL {
            assert!((plain.totals[score_type] - report.totals[score_type]).abs() < 1e-12);
        }
    }

    #[test]
    fn derivative_report_lists_bonded_atoms() {
        let fixture = backbone_pair(0, true, true);
        let request = ScoreRequest {
            derivatives: true,
            ..ScoreRequest::default()
        };
        let report = run(&fixture.system, &flat_method(), &request, &ProgressReporter::new()).unwrap();
        let derivatives = report.derivatives.unwrap();
        assert!(derivatives.iter().any(|d| d.seqpos == 2 && d.atom_name == "HG"));
        assert!(derivatives.iter().all(|d| d.deriv.f2.norm() > 0.0));
    }

    #[test]
    fn progress_counts_every_pair() {
        let fixture = backbone_pair(1, true, false);
        let steps = Mutex::new((0u64, 0u64));
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            let mut steps = steps.lock().unwrap();
            match event {
                Progress::TaskStart { total_steps } => steps.0 = total_steps,
                Progress::TaskIncrement => steps.1 += 1,
                _ => {}
            }
        }));
        run(&fixture.system, &flat_method(), &ScoreRequest::default(), &reporter).unwrap();
        let (total, done) = *steps.lock().unwrap();
        // Only donor and acceptor are in range; the filler is far away.
        assert_eq!(total, 1);
        assert_eq!(done, 1);
    }
}
