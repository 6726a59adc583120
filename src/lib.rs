//! Seagrass Panel - Mediterranean seagrass presence/absence dashboard
//!
//! Loads the merged observation table, filters environmental variables by
//! category and temporal granularity, and summarizes them with descriptive
//! statistics, presence/absence breakdowns and Spearman correlations.

pub mod analysis;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
pub mod report;
pub mod results;
pub mod stats;
