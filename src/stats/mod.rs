//! Stats module - descriptive statistics, group statistics and rank correlation

mod calculator;
mod correlation;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use calculator::{
    DescriptiveStats, GroupStatsTable, StatsCalculator, StatsFrame, VariableStats, STAT_FIELDS,
};
pub use correlation::{
    strong_pairs_dataframe, CorrelationAnalyzer, CorrelationMatrix, CorrelationMethod, StrongPair,
    DEFAULT_STRONG_THRESHOLD,
};

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: &'static str },
    #[error("Correlation needs at least 2 columns, got {0}")]
    TooFewColumns(usize),
}

impl StatsError {
    pub(crate) fn invalid(column: &str, reason: &'static str) -> Self {
        StatsError::InvalidColumn {
            column: column.to_string(),
            reason,
        }
    }
}
