use crate::cli::RotamerArgs;
use crate::commands::load_structure;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use hbscore::engine::progress::ProgressReporter;
use hbscore::workflows::rotamers;
use tracing::{info, warn};

pub fn run(args: RotamerArgs, show_progress: bool) -> Result<()> {
    let resolved = args.method.resolve()?;
    let system = load_structure(&args.input, &resolved.chemistry)?;
    let library = load_structure(&args.conformations, &resolved.chemistry)?;

    let conformations: Vec<_> = library
        .residues_iter()
        .map(|(_, residue)| residue.clone())
        .collect();
    if conformations.is_empty() {
        return Err(CliError::Argument(format!(
            "No conformations found in {}",
            args.conformations.display()
        )));
    }
    info!(
        "Ranking {} conformation(s) at {}",
        conformations.len(),
        args.residue
    );

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let result = rotamers::background_energies(
        &system,
        &resolved.method,
        &args.residue,
        conformations,
        &resolved.weights,
        &reporter,
    )?;
    progress_handler.clear();

    println!("Conformations at {}:", args.residue);
    for (index, energy) in result.energies.iter().enumerate() {
        let marker = if Some(index) == result.best { "*" } else { " " };
        println!("{} {:>4} {:>12.4}", marker, index + 1, energy);
    }
    match result.best {
        Some(best) => println!(
            "Best conformation: #{} ({:.4})",
            best + 1,
            result.energies[best]
        ),
        None => warn!("No conformation energies were computed."),
    }

    Ok(())
}
