//! odecheck - numerical checks for ODE solver output
//!
//! Compares solver runs, tracks convergence against a reference, and
//! evaluates pretrained surrogate models.

mod charts;
mod cli;
mod commands;
mod data;
mod logging;
mod model;
mod stats;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => commands::compare::run(&args),
        Commands::Convergence(args) => commands::convergence::run(&args),
        Commands::Surrogate(args) => commands::surrogate::run(&args),
    }
}
