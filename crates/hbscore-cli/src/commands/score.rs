use crate::cli::ScoreArgs;
use crate::commands::load_structure;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::utils::report::{format_totals, residue_label, write_derivatives_csv, write_pairs_csv};
use hbscore::engine::progress::ProgressReporter;
use hbscore::workflows::score::{self, ScoreRequest};
use tracing::info;

pub fn run(args: ScoreArgs, show_progress: bool) -> Result<()> {
    let resolved = args.method.resolve()?;
    let system = load_structure(&args.input, &resolved.chemistry)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let request = ScoreRequest {
        weights: resolved.weights,
        keep_pairs: args.output.is_some() || args.top.is_some(),
        derivatives: args.derivatives.is_some(),
    };
    info!("Invoking the scoring workflow...");
    let report = score::run(&system, &resolved.method, &request, &reporter)?;
    progress_handler.clear();

    println!(
        "Scored {} residue(s); {} backbone/backbone hydrogen bond(s).",
        system.total_residue(),
        report.backbone_hbonds
    );
    println!("{}", format_totals(&report.totals, &request.weights, report.weighted_total));

    if let Some(top) = args.top {
        let mut pairs: Vec<_> = report.pairs.iter().collect();
        pairs.sort_by(|a, b| a.weighted.total_cmp(&b.weighted));
        println!("\nStrongest residue pairs:");
        for pair in pairs.into_iter().take(top) {
            println!(
                "  {:<14} {:<14} {:>10.4}",
                residue_label(&system, pair.seqpos1),
                residue_label(&system, pair.seqpos2),
                pair.weighted
            );
        }
    }

    if let Some(path) = &args.output {
        write_pairs_csv(path, &system, &report.pairs)?;
        info!("Wrote {} pair energies to {:?}", report.pairs.len(), path);
        println!("Pair energies written to: {}", path.display());
    }

    if let (Some(path), Some(derivatives)) = (&args.derivatives, &report.derivatives) {
        write_derivatives_csv(path, &system, derivatives)?;
        info!("Wrote {} atom derivatives to {:?}", derivatives.len(), path);
        println!("Atom derivatives written to: {}", path.display());
    }

    Ok(())
}
