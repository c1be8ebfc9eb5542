//! Data module - numeric table loading

mod loader;

pub use loader::{LoaderError, TableLoader};
