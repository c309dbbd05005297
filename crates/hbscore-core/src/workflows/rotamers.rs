use crate::core::forcefield::term::EnergyMap;
use crate::core::models::residue::Residue;
use crate::core::models::system::MolecularSystem;
use crate::core::rotamers::set::RotamerSet;
use crate::engine::config::ResidueSpecifier;
use crate::engine::error::EngineError;
use crate::engine::evaluator::within_interaction_range;
use crate::engine::method::HBondEnergy;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Hydrogen-bond energy of each candidate conformation against the fixed
/// remainder of the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct RotamerEnergies {
    pub seqpos: usize,
    /// Weighted energy per conformation, in input order.
    pub energies: Vec<f64>,
    /// Index of the lowest-energy conformation.
    pub best: Option<usize>,
}

/// Scores `conformations` at the `target` site against every other residue
/// using the packing tries.
///
/// # Errors
///
/// Returns [`EngineError::ResidueNotFound`] if `target` is not in `system`,
/// or [`EngineError::EmptyRotamerSet`] if no conformations were given.
#[instrument(skip_all, name = "rotamer_workflow", fields(target = %target))]
pub fn background_energies(
    system: &MolecularSystem,
    method: &HBondEnergy,
    target: &ResidueSpecifier,
    conformations: Vec<Residue>,
    weights: &EnergyMap,
    reporter: &ProgressReporter,
) -> Result<RotamerEnergies, EngineError> {
    let residue_id = system
        .find_chain_by_id(target.chain_id)
        .and_then(|chain| system.find_residue_by_id(chain, target.residue_number))
        .ok_or_else(|| EngineError::ResidueNotFound {
            spec: target.clone(),
        })?;
    let site = system
        .residue(residue_id)
        .ok_or_else(|| EngineError::ResidueNotFound {
            spec: target.clone(),
        })?;

    let context = reporter.phase("Setup", || method.setup_for_packing(system))?;
    let mut rotamers = RotamerSet::from_residues(residue_id, site, conformations);
    method.prepare_rotamers_for_packing(&context, &mut rotamers)?;

    let partners: Vec<&Residue> = system
        .residues_iter()
        .map(|(_, residue)| residue)
        .filter(|residue| residue.seqpos() != rotamers.seqpos())
        .filter(|residue| {
            rotamers
                .rotamers()
                .iter()
                .any(|rotamer| within_interaction_range(rotamer, residue))
        })
        .collect();

    reporter.report(Progress::PhaseStart { name: "Background Energies" });
    reporter.report(Progress::TaskStart {
        total_steps: partners.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = partners.iter();

    #[cfg(feature = "parallel")]
    let iterator = partners.par_iter();

    let per_partner: Vec<Vec<f64>> = iterator
        .map(|background| {
            let mut energies = vec![0.0; rotamers.len()];
            let result = method.evaluate_rotamer_background_energies(
                &context,
                &rotamers,
                background,
                weights,
                &mut energies,
            );
            reporter.report(Progress::TaskIncrement);
            result.map(|_| energies)
        })
        .collect::<Result<_, _>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let mut energies = vec![0.0; rotamers.len()];
    for partner in &per_partner {
        for (total, energy) in energies.iter_mut().zip(partner) {
            *total += energy;
        }
    }

    let best = energies
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(index, _)| index);
    if partners.is_empty() {
        warn!("No residue is within hydrogen-bond reach of the target site.");
    }
    info!(
        rotamers = rotamers.len(),
        partners = partners.len(),
        best = ?best,
        "Rotamer background energies computed."
    );

    Ok(RotamerEnergies {
        seqpos: rotamers.seqpos(),
        energies,
        best,
    })
}
