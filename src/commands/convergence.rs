//! The `convergence` subcommand: L2 error norms of mixed- and
//! full-precision solutions against a reference, with a log-log chart.

use anyhow::{ensure, Context, Result};
use tracing::info;

use crate::charts::ChartRenderer;
use crate::cli::ConvergenceArgs;
use crate::data::TableLoader;
use crate::stats::ErrorCalculator;

pub fn run(args: &ConvergenceArgs) -> Result<()> {
    ensure!(!args.steps.is_empty(), "at least one step count is required");
    ensure!(
        args.steps.iter().all(|s| *s > 0),
        "step counts must be positive"
    );

    let loader = TableLoader::new(args.delimiter.as_byte());
    let mixed = loader
        .load_matrix(&args.mixed)
        .with_context(|| format!("loading mixed-precision output {}", args.mixed.display()))?;
    let full = loader
        .load_matrix(&args.full)
        .with_context(|| format!("loading full-precision output {}", args.full.display()))?;
    let reference = loader
        .load_matrix(&args.reference)
        .with_context(|| format!("loading reference output {}", args.reference.display()))?;

    let expected = args.steps.len();
    for (name, table) in [("mixed", &mixed), ("full", &full), ("reference", &reference)] {
        ensure!(
            table.nrows() == expected,
            "{name} table has {} rows but {expected} step counts were given",
            table.nrows()
        );
    }
    info!(rows = expected, cols = reference.ncols(), "solution tables loaded");

    // one row per run, finest step last
    let dt: Vec<f64> = args.steps.iter().map(|s| 1.0 / *s as f64).collect();

    let mixed_errors =
        ErrorCalculator::row_l2_norms(&ErrorCalculator::elementwise_diff(&reference, &mixed)?);
    let full_errors =
        ErrorCalculator::row_l2_norms(&ErrorCalculator::elementwise_diff(&reference, &full)?);

    println!("=== L2 Errors vs. Reference ===");
    println!("{:>14} {:>18} {:>18}", "dt", "mixed", "full");
    for i in 0..expected {
        println!(
            "{:>14.6e} {:>18.9e} {:>18.9e}",
            dt[i], mixed_errors[i], full_errors[i]
        );
    }

    print_order("mixed", ErrorCalculator::convergence_order(&dt, &mixed_errors));
    print_order("full", ErrorCalculator::convergence_order(&dt, &full_errors));

    ChartRenderer::convergence_chart(
        &args.plot,
        &dt,
        &mixed_errors,
        &full_errors,
        args.eps_lines,
    )?;
    println!("Convergence chart written to {}", args.plot.display());

    if args.show {
        open::that(&args.plot)
            .with_context(|| format!("opening {}", args.plot.display()))?;
    }

    Ok(())
}

fn print_order(label: &str, order: Option<f64>) {
    match order {
        Some(order) => println!("Observed order ({label}): {order:.3}"),
        None => println!("Observed order ({label}): undefined"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Delimiter;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn write_table(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write table");
        file
    }

    fn args_with(
        mixed: PathBuf,
        full: PathBuf,
        reference: PathBuf,
        steps: Vec<u64>,
    ) -> ConvergenceArgs {
        ConvergenceArgs {
            mixed,
            full,
            reference,
            steps,
            delimiter: Delimiter::Comma,
            plot: PathBuf::from("unused.png"),
            eps_lines: false,
            show: false,
        }
    }

    #[test]
    fn row_count_must_match_step_count() {
        let mixed = write_table("1.0,2.0\n3.0,4.0\n");
        let full = write_table("1.0,2.0\n3.0,4.0\n");
        let reference = write_table("1.0,2.0\n3.0,4.0\n");
        let args = args_with(
            mixed.path().to_path_buf(),
            full.path().to_path_buf(),
            reference.path().to_path_buf(),
            vec![1, 10, 100],
        );

        let err = run(&args).expect_err("two rows cannot satisfy three step counts");
        assert!(err.to_string().contains("2 rows but 3 step counts"));
    }

    #[test]
    fn empty_step_list_is_rejected() {
        let args = args_with(
            PathBuf::from("unused.txt"),
            PathBuf::from("unused.txt"),
            PathBuf::from("unused.txt"),
            Vec::new(),
        );

        let err = run(&args).expect_err("no step counts");
        assert!(err.to_string().contains("at least one step count"));
    }

    #[test]
    fn zero_step_count_is_rejected() {
        let args = args_with(
            PathBuf::from("unused.txt"),
            PathBuf::from("unused.txt"),
            PathBuf::from("unused.txt"),
            vec![10, 0, 1000],
        );

        let err = run(&args).expect_err("a zero step count has no dt");
        assert!(err.to_string().contains("must be positive"));
    }
}
