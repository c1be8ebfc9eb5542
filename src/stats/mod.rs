//! Stats module - error norms and summaries

mod calculator;

pub use calculator::{
    ErrorCalculator, ErrorSummary, StatsError, UNIT_ROUNDOFF_F32, UNIT_ROUNDOFF_F64,
};
