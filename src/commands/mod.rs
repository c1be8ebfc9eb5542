//! Commands module - one entry point per subcommand

pub mod compare;
pub mod convergence;
pub mod surrogate;
