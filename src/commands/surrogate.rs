//! The `surrogate` subcommand: run a pretrained dense surrogate over an
//! input profile and print the response one value per line.

use anyhow::{Context, Result};
use ndarray::Array1;
use tracing::info;

use crate::charts::ChartRenderer;
use crate::cli::SurrogateArgs;
use crate::data::TableLoader;
use crate::model::{sine_profile, SurrogateModel};

pub fn run(args: &SurrogateArgs) -> Result<()> {
    let model = SurrogateModel::from_path(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    info!(
        name = model.name().unwrap_or("unnamed"),
        inputs = model.input_size(),
        outputs = model.output_size(),
        "model compiled"
    );

    let input = match &args.input {
        Some(path) => {
            let values = TableLoader::new(b',')
                .load_vector(path)
                .with_context(|| format!("loading input profile {}", path.display()))?;
            Array1::from_vec(values)
        }
        None => sine_profile(model.input_size()),
    };

    let output = model.predict(&input)?;

    for v in output.iter() {
        println!("{v:.9e}");
    }

    if let Some(plot) = &args.plot {
        ChartRenderer::profile_chart(plot, &input, &output)?;
        info!(path = %plot.display(), "profile chart written");
        if args.show {
            open::that(plot).with_context(|| format!("opening {}", plot.display()))?;
        }
    }

    Ok(())
}
