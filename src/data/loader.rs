//! CSV Data Loader Module
//! Reads the observation CSV once per process using Polars and hands the
//! resulting table out through a memoized accessor.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use thiserror::Error;

use super::table::ObservationTable;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse CSV {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Load the observation CSV (UTF-8, comma separated, header row).
pub fn load_table(path: &Path) -> Result<ObservationTable, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::NotFound(path.to_path_buf()));
    }

    let started = Instant::now();
    let parse_error = |source| LoaderError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .finish()
        .and_then(|lazy| lazy.collect())
        .map_err(parse_error)?;

    if df.width() == 0 {
        return Err(parse_error(PolarsError::NoData("CSV has no columns".into())));
    }

    log::info!(
        "Loaded {} rows, {} columns from {} in {:.1?}",
        df.height(),
        df.width(),
        path.display(),
        started.elapsed()
    );

    Ok(ObservationTable::new(df, path))
}

/// Single initialization point for the process-wide observation table.
///
/// The first successful [`DatasetStore::get_or_load`] parses the file; later
/// calls share the same `Arc`. Failed loads are not cached.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    table: OnceLock<Arc<ObservationTable>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<Arc<ObservationTable>, LoaderError> {
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }

        let loaded = Arc::new(load_table(&self.path)?);
        match self.consistency_warning(&loaded) {
            Some(warning) => log::warn!("{warning}"),
            None => log::debug!("Presence and family labels are consistent"),
        }
        Ok(Arc::clone(self.table.get_or_init(|| loaded)))
    }

    fn consistency_warning(&self, table: &ObservationTable) -> Option<String> {
        match table.consistency_report() {
            Ok(report) if !report.is_consistent() => Some(format!(
                "{}: {} absence rows carry a family, {} presence rows have none",
                self.path.display(),
                report.absent_with_family,
                report.present_without_family
            )),
            Ok(_) => None,
            Err(e) => Some(format!("Presence/family check skipped: {e}")),
        }
    }
}
