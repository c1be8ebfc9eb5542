//! Charts module - chart rendering

mod renderer;

pub use renderer::{ChartError, ChartRenderer};
