//! The `compare` subcommand: worst-case difference between two solver
//! outputs plus a trajectory chart of the candidate.

use anyhow::{Context, Result};
use tracing::info;

use crate::charts::ChartRenderer;
use crate::cli::CompareArgs;
use crate::data::TableLoader;
use crate::stats::ErrorCalculator;

pub fn run(args: &CompareArgs) -> Result<()> {
    let loader = TableLoader::new(args.delimiter.as_byte());

    let baseline = loader
        .load_matrix(&args.baseline)
        .with_context(|| format!("loading baseline {}", args.baseline.display()))?;
    let candidate = loader
        .load_matrix(&args.candidate)
        .with_context(|| format!("loading candidate {}", args.candidate.display()))?;
    info!(
        rows = baseline.nrows(),
        cols = baseline.ncols(),
        "solution tables loaded"
    );

    let diff = ErrorCalculator::elementwise_diff(&baseline, &candidate)?;
    let euclidean = ErrorCalculator::row_l2_norms(&diff);
    let componentwise = ErrorCalculator::row_max_norms(&diff);
    let summary = ErrorCalculator::summarize(&euclidean);

    println!("=== Solution Comparison ===");
    println!("Rows compared:           {}", summary.count);
    println!("Max Euclidean error:     {:.9e}", summary.max);
    println!(
        "Max componentwise error: {:.9e}",
        ErrorCalculator::max_abs(&componentwise)
    );
    println!("Mean Euclidean error:    {:.9e}", summary.mean);
    println!("Std Euclidean error:     {:.9e}", summary.std);
    println!("Median Euclidean error:  {:.9e}", summary.median);
    println!("P95 Euclidean error:     {:.9e}", summary.p95);

    ChartRenderer::trajectory_chart(
        &args.plot,
        &candidate,
        args.overlay_baseline.then_some(&baseline),
    )?;
    println!("Trajectory chart written to {}", args.plot.display());

    if let Some(path) = &args.plot_diffs {
        ChartRenderer::difference_chart(path, &diff)?;
        println!("Difference chart written to {}", path.display());
    }

    if args.show {
        open::that(&args.plot)
            .with_context(|| format!("opening {}", args.plot.display()))?;
    }

    Ok(())
}
