//! Statistics Calculator Module
//! Descriptive statistics per variable and per group, pandas `describe` style.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use super::StatsError;
use crate::data::ObservationTable;

/// Row labels of a statistics frame, in output order.
pub const STAT_FIELDS: [&str; 10] = [
    "count", "mean", "std", "min", "25%", "50%", "75%", "max", "range", "cv",
];

/// Summary statistics for one set of values (missing values excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub range: f64,
    /// Coefficient of variation in percent; NaN when the mean is zero.
    pub cv: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
            range: f64::NAN,
            cv: f64::NAN,
        }
    }
}

impl DescriptiveStats {
    /// Values in [`STAT_FIELDS`] order.
    pub fn values(&self) -> [f64; 10] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
            self.range,
            self.cv,
        ]
    }
}

/// `describe` output: one row per variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStats {
    pub variable: String,
    pub stats: DescriptiveStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsFrame {
    pub rows: Vec<VariableStats>,
}

impl StatsFrame {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, variable: &str) -> Option<&DescriptiveStats> {
        self.rows
            .iter()
            .find(|row| row.variable == variable)
            .map(|row| &row.stats)
    }

    /// Variables as rows, statistics as columns.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![Column::new(
            "variable".into(),
            self.rows
                .iter()
                .map(|row| row.variable.clone())
                .collect::<Vec<_>>(),
        )];
        columns.push(Column::new(
            STAT_FIELDS[0].into(),
            self.rows
                .iter()
                .map(|row| row.stats.count as u64)
                .collect::<Vec<_>>(),
        ));
        for (idx, field) in STAT_FIELDS.iter().enumerate().skip(1) {
            let values: Vec<f64> = self.rows.iter().map(|row| row.stats.values()[idx]).collect();
            columns.push(Column::new((*field).into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Per-group statistics of one value column, transposed so each group is a column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatsTable {
    pub group_column: String,
    pub value_column: String,
    /// Sorted by group label.
    pub groups: Vec<(String, DescriptiveStats)>,
}

impl GroupStatsTable {
    pub fn get(&self, group: &str) -> Option<&DescriptiveStats> {
        self.groups
            .iter()
            .find(|(label, _)| label == group)
            .map(|(_, stats)| stats)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![Column::new(
            "statistic".into(),
            STAT_FIELDS.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )];
        for (label, stats) in &self.groups {
            columns.push(Column::new(label.as_str().into(), stats.values().to_vec()));
        }
        DataFrame::new(columns)
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of present values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        if values.is_empty() {
            return DescriptiveStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().mean();
        // Sample standard deviation (n - 1); NaN for a single value.
        let std = values.iter().std_dev();
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        DescriptiveStats {
            count: values.len(),
            mean,
            std,
            min,
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max,
            range: max - min,
            cv: Self::coefficient_of_variation(std, mean),
        }
    }

    fn coefficient_of_variation(std: f64, mean: f64) -> f64 {
        if mean == 0.0 || mean.is_nan() {
            f64::NAN
        } else {
            std / mean * 100.0
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Values of a numeric column, row aligned; missing entries are `None`.
    pub(crate) fn numeric_column(
        table: &ObservationTable,
        column: &str,
    ) -> Result<Vec<Option<f64>>, StatsError> {
        if !table.has_column(column) {
            return Err(StatsError::invalid(column, "no such column"));
        }
        if !table.is_numeric(column) {
            return Err(StatsError::invalid(column, "not numeric"));
        }
        Ok(table.float_values(column)?)
    }

    /// Descriptive statistics for each column, in the order given.
    pub fn describe(
        table: &ObservationTable,
        columns: &[String],
    ) -> Result<StatsFrame, StatsError> {
        let data = columns
            .iter()
            .map(|column| Self::numeric_column(table, column).map(|values| (column, values)))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = data
            .par_iter()
            .map(|(column, values)| {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                VariableStats {
                    variable: (*column).clone(),
                    stats: Self::compute_descriptive_stats(&present),
                }
            })
            .collect();

        Ok(StatsFrame { rows })
    }

    /// Statistics of `value_column` for each distinct value of `group_column`.
    ///
    /// Groups whose values are all missing are kept with NaN statistics;
    /// rows with a missing group label are skipped.
    pub fn group_stats(
        table: &ObservationTable,
        group_column: &str,
        value_column: &str,
    ) -> Result<GroupStatsTable, StatsError> {
        if !table.has_column(group_column) {
            return Err(StatsError::invalid(group_column, "no such column"));
        }
        let labels = table.label_values(group_column)?;
        let values = Self::numeric_column(table, value_column)?;

        let mut partitions: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (label, value) in labels.into_iter().zip(values) {
            let Some(label) = label else {
                continue;
            };
            let bucket = partitions.entry(label).or_default();
            if let Some(v) = value {
                bucket.push(v);
            }
        }

        let groups = partitions
            .into_par_iter()
            .map(|(label, values)| (label, Self::compute_descriptive_stats(&values)))
            .collect::<Vec<_>>();

        Ok(GroupStatsTable {
            group_column: group_column.to_string(),
            value_column: value_column.to_string(),
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_table, ObservationTable, PRESENCE_COL};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_to_five() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert!(approx(stats.mean, 3.0));
        assert!(approx(stats.min, 1.0));
        assert!(approx(stats.max, 5.0));
        assert!(approx(stats.range, 4.0));
        assert!(approx(stats.median, 3.0));
        assert!(approx(stats.q25, 2.0));
        assert!(approx(stats.q75, 4.0));
        assert!(approx(stats.std, 2.5f64.sqrt()));
        assert!(approx(stats.cv, 2.5f64.sqrt() / 3.0 * 100.0));
    }

    #[test]
    fn zero_mean_gives_nan_cv() {
        let stats = StatsCalculator::compute_descriptive_stats(&[-1.0, 0.0, 1.0]);
        assert!(approx(stats.mean, 0.0));
        assert!(stats.cv.is_nan());
    }

    #[test]
    fn quartiles_interpolate() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert!(approx(stats.q25, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.q75, 3.25));
    }

    #[test]
    fn single_value_has_nan_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert!(approx(stats.median, 7.0));
        assert!(stats.std.is_nan());
    }

    #[test]
    fn describe_skips_missing_values() {
        let table = sample_table();
        let frame = StatsCalculator::describe(
            &table,
            &["VOTEMPER_2015_year".to_string(), "Distance_to_Coast".to_string()],
        )
        .unwrap();

        assert_eq!(frame.rows[0].variable, "VOTEMPER_2015_year");
        let temp = frame.get("VOTEMPER_2015_year").unwrap();
        assert_eq!(temp.count, 5);
        assert!(approx(temp.mean, 20.2));
        assert!(approx(frame.get("Distance_to_Coast").unwrap().range, 5.0));
    }

    #[test]
    fn describe_all_missing_column() {
        let df = DataFrame::new(vec![Column::new(
            "empty".into(),
            vec![None::<f64>, None, Some(f64::NAN)],
        )])
        .unwrap();
        let table = ObservationTable::new(df, "memory.csv");
        let frame = StatsCalculator::describe(&table, &["empty".to_string()]).unwrap();
        let stats = frame.get("empty").unwrap();
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan() && stats.max.is_nan() && stats.cv.is_nan());
    }

    #[test]
    fn describe_rejects_bad_columns() {
        let table = sample_table();
        let err = StatsCalculator::describe(&table, &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidColumn { .. }));
        let err = StatsCalculator::describe(&table, &[PRESENCE_COL.to_string()]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidColumn { .. }));
    }

    #[test]
    fn describe_empty_selection() {
        let frame = StatsCalculator::describe(&sample_table(), &[]).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn group_stats_by_presence() {
        let table = sample_table();
        let groups =
            StatsCalculator::group_stats(&table, PRESENCE_COL, "Distance_to_Coast").unwrap();
        let labels: Vec<&str> = groups.groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["false", "true"]);
        assert!(approx(groups.get("true").unwrap().mean, (1.0 + 3.0 + 4.0) / 3.0));
        assert!(approx(groups.get("false").unwrap().max, 6.0));

        let df = groups.to_dataframe().unwrap();
        assert_eq!(df.height(), STAT_FIELDS.len());
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn all_missing_group_is_kept() {
        let df = DataFrame::new(vec![
            Column::new("zone".into(), vec![1i64, 1, 2]),
            Column::new("value".into(), vec![Some(1.0), Some(2.0), None]),
        ])
        .unwrap();
        let table = ObservationTable::new(df, "memory.csv");
        let groups = StatsCalculator::group_stats(&table, "zone", "value").unwrap();
        assert_eq!(groups.groups.len(), 2);
        let zone2 = groups.get("2").unwrap();
        assert_eq!(zone2.count, 0);
        assert!(zone2.mean.is_nan());
    }

    #[test]
    fn stats_frame_to_dataframe() {
        let table = sample_table();
        let frame = StatsCalculator::describe(&table, &table.numeric_columns()).unwrap();
        let df = frame.to_dataframe().unwrap();
        assert_eq!(df.height(), table.numeric_columns().len());
        assert_eq!(df.width(), STAT_FIELDS.len() + 1);
    }
}
