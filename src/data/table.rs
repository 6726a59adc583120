//! Observation Table Module
//! Immutable in-memory view of the seagrass observations plus the
//! presence, family and geographic-zone summaries built on top of it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::columns::{ColumnCatalog, Month, TemporalPeriod, VariableCategory, VariableSet};

pub const PRESENCE_COL: &str = "Presence";
pub const FAMILY_COL: &str = "BIO_FAMILY";
pub const ZONE_COL: &str = "GEOGRAPHIC_ZONE";

/// Observations per geographic zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCount {
    pub zone: i64,
    pub count: usize,
    pub percentage: f64,
}

/// Observations per seagrass family, presence rows only.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyCount {
    pub family: String,
    pub count: usize,
    pub percentage: f64,
}

/// Rows where the presence flag and the family label disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub absent_with_family: usize,
    pub present_without_family: usize,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.absent_with_family == 0 && self.present_without_family == 0
    }
}

/// One row per field observation; never mutated after load.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    df: DataFrame,
    catalog: ColumnCatalog,
    source: PathBuf,
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ObservationTable {
    pub fn new(df: DataFrame, source: impl Into<PathBuf>) -> Self {
        let catalog = ColumnCatalog::new(
            df.get_columns()
                .iter()
                .filter(|col| is_numeric_dtype(col.dtype()))
                .map(|col| col.name().to_string()),
        );
        Self {
            df,
            catalog,
            source: source.into(),
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Integer and float columns in file order; booleans are not numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.catalog.tags().iter().map(|tag| tag.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.df
            .column(name)
            .map(|col| is_numeric_dtype(col.dtype()))
            .unwrap_or(false)
    }

    pub fn select_columns(
        &self,
        category: VariableCategory,
        period: TemporalPeriod,
        months: &[Month],
    ) -> Vec<String> {
        self.catalog.select_columns(category, period, months)
    }

    pub fn variable_set(&self, set: VariableSet) -> Vec<String> {
        self.catalog.variable_set(set)
    }

    /// Column values as floats; nulls and NaNs both come back as `None`.
    pub fn float_values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let values = self.df.column(name)?.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Column values rendered as labels, e.g. "true", "3", "Posidoniaceae".
    pub fn label_values(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let values = self.df.column(name)?.cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Presence flag per row, accepting boolean, textual and 0/1 encodings.
    pub fn presence_values(&self) -> PolarsResult<Vec<Option<bool>>> {
        let column = self.df.column(PRESENCE_COL)?;
        match column.dtype() {
            DataType::Boolean => Ok(column.bool()?.into_iter().collect()),
            dtype if is_numeric_dtype(dtype) => Ok(self
                .float_values(PRESENCE_COL)?
                .into_iter()
                .map(|v| v.map(|x| x != 0.0))
                .collect()),
            _ => Ok(self
                .label_values(PRESENCE_COL)?
                .into_iter()
                .map(|v| match v?.to_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(true),
                    "false" | "0" | "no" => Some(false),
                    _ => None,
                })
                .collect()),
        }
    }

    pub fn presence_count(&self) -> PolarsResult<usize> {
        Ok(self
            .presence_values()?
            .into_iter()
            .filter(|v| *v == Some(true))
            .count())
    }

    /// Observation counts per zone, sorted by zone code.
    pub fn zone_summary(&self) -> PolarsResult<Vec<ZoneCount>> {
        let zones = self.df.column(ZONE_COL)?.cast(&DataType::Int64)?;
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for zone in zones.i64()?.into_iter().flatten() {
            *counts.entry(zone).or_default() += 1;
        }

        let total = self.row_count().max(1) as f64;
        Ok(counts
            .into_iter()
            .map(|(zone, count)| ZoneCount {
                zone,
                count,
                percentage: round2(count as f64 / total * 100.0),
            })
            .collect())
    }

    /// Family counts among presence rows, most frequent first.
    pub fn family_distribution(&self) -> PolarsResult<Vec<FamilyCount>> {
        let presence = self.presence_values()?;
        let families = self.label_values(FAMILY_COL)?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (present, family) in presence.iter().zip(families) {
            if let (Some(true), Some(family)) = (present, family) {
                *counts.entry(family).or_default() += 1;
            }
        }

        let total = counts.values().sum::<usize>().max(1) as f64;
        let mut distribution: Vec<FamilyCount> = counts
            .into_iter()
            .map(|(family, count)| FamilyCount {
                family,
                count,
                percentage: round2(count as f64 / total * 100.0),
            })
            .collect();
        distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.family.cmp(&b.family)));
        Ok(distribution)
    }

    pub fn consistency_report(&self) -> PolarsResult<ConsistencyReport> {
        let presence = self.presence_values()?;
        let families = self.label_values(FAMILY_COL)?;

        let mut report = ConsistencyReport::default();
        for (present, family) in presence.iter().zip(&families) {
            match (present, family.is_some()) {
                (Some(false), true) => report.absent_with_family += 1,
                (Some(true), false) => report.present_without_family += 1,
                _ => {}
            }
        }
        Ok(report)
    }
}
