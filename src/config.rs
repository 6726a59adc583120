//! Configuration Module
//! Command-line flags, environment and defaults resolved into one `PanelConfig`.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::stats::DEFAULT_STRONG_THRESHOLD;

/// Environment variable naming the observation CSV.
pub const DATA_ENV: &str = "SEAGRASS_DATA";
pub const DEFAULT_DATA_PATH: &str = "data/pres_abs_merge_def.csv";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Correlation threshold must be in [0, 1), got {0}")]
    InvalidThreshold(f64),
}

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "seagrass-panel",
    version,
    about = "Mediterranean Seagrass Intelligence Panel"
)]
pub struct Cli {
    /// Observation CSV (defaults to $SEAGRASS_DATA, then data/pres_abs_merge_def.csv)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// |r| above which variable pairs are reported as strongly correlated
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Model results JSON replacing the bundled fixture
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Print a plain-text overview instead of opening the window
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub data_path: PathBuf,
    pub strong_threshold: f64,
    pub results_path: Option<PathBuf>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            strong_threshold: DEFAULT_STRONG_THRESHOLD,
            results_path: None,
        }
    }
}

impl PanelConfig {
    /// Flags win over the environment, which wins over defaults.
    pub fn resolve(cli: &Cli, env_data: Option<String>) -> Result<Self, ConfigError> {
        let data_path = cli
            .data
            .clone()
            .or_else(|| env_data.filter(|s| !s.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let strong_threshold = cli.threshold.unwrap_or(DEFAULT_STRONG_THRESHOLD);
        if !(0.0..1.0).contains(&strong_threshold) {
            return Err(ConfigError::InvalidThreshold(strong_threshold));
        }

        Ok(Self {
            data_path,
            strong_threshold,
            results_path: cli.results.clone(),
        })
    }

    pub fn from_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, std::env::var(DATA_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PanelConfig::resolve(&Cli::default(), None).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn flag_beats_environment() {
        let cli = Cli::try_parse_from([
            "seagrass-panel",
            "--data",
            "flag.csv",
            "--threshold",
            "0.8",
        ])
        .unwrap();
        let config = PanelConfig::resolve(&cli, Some("env.csv".into())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("flag.csv"));
        assert!((config.strong_threshold - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn environment_beats_default() {
        let config = PanelConfig::resolve(&Cli::default(), Some("env.csv".into())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("env.csv"));
        let config = PanelConfig::resolve(&Cli::default(), Some(String::new())).unwrap();
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let cli = Cli {
            threshold: Some(1.0),
            ..Cli::default()
        };
        assert_eq!(
            PanelConfig::resolve(&cli, None),
            Err(ConfigError::InvalidThreshold(1.0))
        );
    }

    #[test]
    fn results_flag_is_optional() {
        let config = PanelConfig::resolve(&Cli::default(), None).unwrap();
        assert_eq!(config.results_path, None);

        let cli = Cli::try_parse_from(["seagrass-panel", "--results", "scores.json"]).unwrap();
        let config = PanelConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.results_path, Some(PathBuf::from("scores.json")));
    }
}
