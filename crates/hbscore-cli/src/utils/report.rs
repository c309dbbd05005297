use crate::error::{CliError, Result};
use hbscore::core::forcefield::term::{EnergyMap, ScoreType};
use hbscore::core::models::system::MolecularSystem;
use hbscore::workflows::score::{AtomDerivative, PairEnergy};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// `A:42 SER`, or `#seqpos` for a position outside the system.
pub fn residue_label(system: &MolecularSystem, seqpos: usize) -> String {
    let Some(residue) = system.residue_at(seqpos) else {
        return format!("#{seqpos}");
    };
    let chain = system
        .chain(residue.chain_id)
        .map(|c| c.id)
        .unwrap_or('?');
    format!("{}:{} {}", chain, residue.number, residue.name)
}

/// One line per score term with a non-zero energy or weight.
pub fn format_totals(totals: &EnergyMap, weights: &EnergyMap, weighted_total: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {:>12} {:>8} {:>12}", "term", "energy", "weight", "weighted");
    for score_type in ScoreType::ALL {
        let (energy, weight) = (totals[score_type], weights[score_type]);
        if energy == 0.0 {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<14} {:>12.4} {:>8.3} {:>12.4}",
            score_type.name(),
            energy,
            weight,
            energy * weight
        );
    }
    let _ = write!(out, "{:<14} {:>12} {:>8} {:>12.4}", "total", "", "", weighted_total);
    out
}

pub fn write_pairs_csv(path: &Path, system: &MolecularSystem, pairs: &[PairEnergy]) -> Result<()> {
    let wrap = |source| CliError::Report {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    let header = ["residue1", "residue2"]
        .into_iter()
        .chain(ScoreType::ALL.iter().map(|t| t.name()))
        .chain(["weighted"]);
    writer.write_record(header).map_err(wrap)?;
    for pair in pairs {
        let mut record = vec![
            residue_label(system, pair.seqpos1),
            residue_label(system, pair.seqpos2),
        ];
        record.extend(ScoreType::ALL.iter().map(|&t| format!("{:.6}", pair.energies[t])));
        record.push(format!("{:.6}", pair.weighted));
        writer.write_record(&record).map_err(wrap)?;
    }
    writer.flush().map_err(|e| wrap(e.into()))?;
    Ok(())
}

#[derive(Serialize)]
struct DerivativeRow<'a> {
    residue: String,
    atom: &'a str,
    f1_x: f64,
    f1_y: f64,
    f1_z: f64,
    f2_x: f64,
    f2_y: f64,
    f2_z: f64,
}

pub fn write_derivatives_csv(
    path: &Path,
    system: &MolecularSystem,
    derivatives: &[AtomDerivative],
) -> Result<()> {
    let wrap = |source| CliError::Report {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    for d in derivatives {
        let (f1, f2) = (d.deriv.f1, d.deriv.f2);
        writer
            .serialize(DerivativeRow {
                residue: residue_label(system, d.seqpos),
                atom: &d.atom_name,
                f1_x: f1.x,
                f1_y: f1.y,
                f1_z: f1.z,
                f2_x: f2.x,
                f2_y: f2.y,
                f2_z: f2.z,
            })
            .map_err(wrap)?;
    }
    writer.flush().map_err(|e| wrap(e.into()))?;
    Ok(())
}
