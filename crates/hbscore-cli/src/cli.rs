use clap::{Args, Parser, Subcommand};
use hbscore::engine::config::ResidueSpecifier;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "hbscore CLI - Score hydrogen bonds in macromolecular structures and rank side-chain conformations by their hydrogen-bond energy.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the hydrogen-bond energy of a structure, per score term and per residue pair.
    Score(ScoreArgs),
    /// Rank alternative conformations of one residue by their hydrogen-bond energy.
    Rotamers(RotamerArgs),
}

/// Method settings shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct MethodArgs {
    /// Path to a configuration file in TOML format ([hbond] options and [weights]).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Residue chemistry table in TOML format, replacing the bundled one.
    #[arg(long, value_name = "PATH")]
    pub chemistry: Option<PathBuf>,

    /// Polynomial table (CSV), replacing the bundled one. Requires --evaluations.
    #[arg(long, value_name = "PATH", requires = "evaluations")]
    pub polynomials: Option<PathBuf>,

    /// Evaluation-type table (CSV), replacing the bundled one. Requires --polynomials.
    #[arg(long, value_name = "PATH", requires = "polynomials")]
    pub evaluations: Option<PathBuf>,

    /// Score backbone/backbone bonds pairwise, overriding the config file.
    #[arg(long)]
    pub decompose: bool,

    /// Let claimed backbone groups also bond to sidechains, overriding the config file.
    #[arg(long)]
    pub no_bb_check: bool,

    /// Disable the burial-dependent weighting of sidechain bonds, overriding the config file.
    #[arg(long)]
    pub no_env_dep: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S hbond.max-hb-energy=-0.1 -S weights.hbond_sc=1.1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path to the input molecular structure file (e.g., protein.bgf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the per-pair energies as CSV to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the residue pairs with the lowest energies.
    #[arg(long, value_name = "INT")]
    pub top: Option<usize>,

    /// Also compute per-atom derivatives and write them as CSV to this path.
    #[arg(long, value_name = "PATH")]
    pub derivatives: Option<PathBuf>,

    #[command(flatten)]
    pub method: MethodArgs,
}

/// Arguments for the `rotamers` subcommand.
#[derive(Args, Debug)]
pub struct RotamerArgs {
    /// Path to the input molecular structure file (e.g., protein.bgf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// The residue to rank conformations for, as CHAIN:NUMBER (e.g., A:42).
    #[arg(short, long, required = true, value_name = "CHAIN:NUMBER")]
    pub residue: ResidueSpecifier,

    /// Structure file whose residues are the candidate conformations, in order.
    #[arg(long, required = true, value_name = "PATH")]
    pub conformations: PathBuf,

    #[command(flatten)]
    pub method: MethodArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_arguments_are_parsed() {
        let cli = Cli::parse_from([
            "hbscore", "-vv", "score", "-i", "in.bgf", "--decompose", "-S", "hbond.max-hb-energy=-0.2",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Score(args) = cli.command else {
            panic!("expected the score subcommand");
        };
        assert_eq!(args.input, PathBuf::from("in.bgf"));
        assert!(args.method.decompose);
        assert!(!args.method.no_bb_check);
        assert_eq!(args.method.set_values, vec!["hbond.max-hb-energy=-0.2"]);
    }

    #[test]
    fn rotamer_target_is_parsed_as_a_residue_specifier() {
        let cli = Cli::parse_from([
            "hbscore", "rotamers", "-i", "in.bgf", "-r", "B:17", "--conformations", "rot.bgf",
        ]);
        let Commands::Rotamers(args) = cli.command else {
            panic!("expected the rotamers subcommand");
        };
        assert_eq!(args.residue.chain_id, 'B');
        assert_eq!(args.residue.residue_number, 17);
    }

    #[test]
    fn parameter_tables_must_be_given_together() {
        let result = Cli::try_parse_from([
            "hbscore", "score", "-i", "in.bgf", "--polynomials", "p.csv",
        ]);
        assert!(result.is_err());
    }
}
