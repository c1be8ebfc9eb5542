//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "odecheck",
    version,
    about = "Numerical checks for ODE solver output",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two solver outputs and report worst-case errors
    Compare(CompareArgs),
    /// L2 error norms against a reference with a log-log convergence chart
    Convergence(ConvergenceArgs),
    /// Evaluate a pretrained dense surrogate on an input profile
    Surrogate(SurrogateArgs),
}

/// Column separator of the delimited solver outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    Tab,
    Comma,
    Space,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
            Delimiter::Space => b' ',
        }
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline solver output
    pub baseline: PathBuf,

    /// Candidate solver output to check against the baseline
    pub candidate: PathBuf,

    /// Column delimiter used by both files
    #[arg(long, value_enum, default_value_t = Delimiter::Tab)]
    pub delimiter: Delimiter,

    /// Where to write the trajectory chart
    #[arg(long, default_value = "trajectory.png")]
    pub plot: PathBuf,

    /// Overlay the baseline trajectory as a dashed curve
    #[arg(long)]
    pub overlay_baseline: bool,

    /// Also write a chart of per-component differences to this path
    #[arg(long, value_name = "PATH")]
    pub plot_diffs: Option<PathBuf>,

    /// Open the chart once it is written
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug)]
pub struct ConvergenceArgs {
    /// Mixed-precision solver output
    #[arg(long)]
    pub mixed: PathBuf,

    /// Full-precision solver output
    #[arg(long)]
    pub full: PathBuf,

    /// High-precision reference output
    #[arg(long)]
    pub reference: PathBuf,

    /// Step counts, one per output row; each dt is the reciprocal count
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [1u64, 10, 100, 1_000, 10_000, 100_000, 1_000_000]
    )]
    pub steps: Vec<u64>,

    /// Column delimiter used by all three files
    #[arg(long, value_enum, default_value_t = Delimiter::Comma)]
    pub delimiter: Delimiter,

    /// Where to write the convergence chart
    #[arg(long, default_value = "convergence.png")]
    pub plot: PathBuf,

    /// Draw the f32/f64 unit-roundoff floors as dashed lines
    #[arg(long)]
    pub eps_lines: bool,

    /// Open the chart once it is written
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug)]
pub struct SurrogateArgs {
    /// Model file, a JSON weight dump
    #[arg(long)]
    pub model: PathBuf,

    /// Input profile with one value per line; defaults to a sine period
    /// matched to the model input width
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Write a chart of input and response
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Open the chart once it is written
    #[arg(long, requires = "plot")]
    pub show: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_defaults() {
        let cli = Cli::try_parse_from(["odecheck", "compare", "a.txt", "b.txt"]).expect("parse");
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.baseline, PathBuf::from("a.txt"));
                assert_eq!(args.candidate, PathBuf::from("b.txt"));
                assert_eq!(args.delimiter, Delimiter::Tab);
                assert_eq!(args.plot, PathBuf::from("trajectory.png"));
                assert!(!args.overlay_baseline);
                assert!(args.plot_diffs.is_none());
                assert!(!args.show);
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn compare_accepts_a_difference_chart_path() {
        let cli = Cli::try_parse_from([
            "odecheck",
            "compare",
            "a.txt",
            "b.txt",
            "--plot-diffs",
            "diffs.png",
        ])
        .expect("parse");
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.plot_diffs, Some(PathBuf::from("diffs.png")));
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn convergence_defaults_cover_seven_decades() {
        let cli = Cli::try_parse_from([
            "odecheck",
            "convergence",
            "--mixed",
            "m.txt",
            "--full",
            "f.txt",
            "--reference",
            "r.txt",
        ])
        .expect("parse");
        match cli.command {
            Commands::Convergence(args) => {
                assert_eq!(args.steps.len(), 7);
                assert_eq!(args.steps[0], 1);
                assert_eq!(args.steps[6], 1_000_000);
                assert_eq!(args.delimiter, Delimiter::Comma);
                assert!(!args.eps_lines);
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn convergence_accepts_comma_separated_steps() {
        let cli = Cli::try_parse_from([
            "odecheck",
            "convergence",
            "--mixed",
            "m.txt",
            "--full",
            "f.txt",
            "--reference",
            "r.txt",
            "--steps",
            "10,20,40",
        ])
        .expect("parse");
        match cli.command {
            Commands::Convergence(args) => assert_eq!(args.steps, vec![10, 20, 40]),
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn delimiter_bytes() {
        assert_eq!(Delimiter::Tab.as_byte(), b'\t');
        assert_eq!(Delimiter::Comma.as_byte(), b',');
        assert_eq!(Delimiter::Space.as_byte(), b' ');
    }

    #[test]
    fn surrogate_show_requires_plot() {
        let missing =
            Cli::try_parse_from(["odecheck", "surrogate", "--model", "m.json", "--show"]);
        assert!(missing.is_err());

        let ok = Cli::try_parse_from([
            "odecheck",
            "surrogate",
            "--model",
            "m.json",
            "--plot",
            "out.png",
            "--show",
        ]);
        assert!(ok.is_ok());
    }
}
