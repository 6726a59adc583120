//! Correlation Module
//! Pairwise rank correlation matrices and strong-pair extraction.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};
use std::cmp::Ordering;

use super::{StatsCalculator, StatsError};
use crate::data::ObservationTable;

/// |r| above which a pair is reported as strongly correlated.
pub const DEFAULT_STRONG_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    Pearson,
    #[default]
    Spearman,
}

/// Square, symmetric matrix indexed by the same columns on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<f64>,
}

/// One unordered pair of strongly correlated variables.
#[derive(Debug, Clone, PartialEq)]
pub struct StrongPair {
    pub col_a: String,
    pub col_b: String,
    pub r: f64,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size() + j]
    }

    pub fn by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.get(i, j))
    }

    /// Pairs with |r| strictly above `threshold`, each unordered pair once,
    /// strongest first; ties ordered by column names.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<StrongPair> {
        let n = self.size();
        let mut pairs: Vec<StrongPair> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter_map(|(i, j)| {
                let r = self.get(i, j);
                (r.abs() > threshold).then(|| StrongPair {
                    col_a: self.columns[i].clone(),
                    col_b: self.columns[j].clone(),
                    r,
                })
            })
            .collect();

        pairs.sort_by(|a, b| {
            b.r.abs()
                .partial_cmp(&a.r.abs())
                .unwrap_or(Ordering::Equal)
                .then_with(|| (&a.col_a, &a.col_b).cmp(&(&b.col_a, &b.col_b)))
        });
        pairs
    }

    /// Matrix as a frame with a leading `variable` column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![Column::new("variable".into(), self.columns.clone())];
        for (j, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = (0..self.size()).map(|i| self.get(i, j)).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Strong pairs as a frame (`Variable 1`, `Variable 2`, `Correlation`).
pub fn strong_pairs_dataframe(pairs: &[StrongPair]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "Variable 1".into(),
            pairs.iter().map(|p| p.col_a.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Variable 2".into(),
            pairs.iter().map(|p| p.col_b.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Correlation".into(),
            pairs.iter().map(|p| p.r).collect::<Vec<_>>(),
        ),
    ])
}

pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Correlation matrix over `columns` using pairwise-complete observations.
    pub fn correlate(
        table: &ObservationTable,
        columns: &[String],
        method: CorrelationMethod,
    ) -> Result<CorrelationMatrix, StatsError> {
        if columns.len() < 2 {
            return Err(StatsError::TooFewColumns(columns.len()));
        }

        let data = columns
            .iter()
            .map(|column| StatsCalculator::numeric_column(table, column))
            .collect::<Result<Vec<_>, _>>()?;

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let coefficients: Vec<f64> = pairs
            .par_iter()
            .map(|&(i, j)| Self::pairwise(&data[i], &data[j], method))
            .collect();

        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }
        for (&(i, j), r) in pairs.iter().zip(coefficients) {
            values[i * n + j] = r;
            values[j * n + i] = r;
        }

        log::debug!("Computed {n}x{n} {method:?} correlation matrix");

        Ok(CorrelationMatrix {
            columns: columns.to_vec(),
            values,
        })
    }

    fn pairwise(x: &[Option<f64>], y: &[Option<f64>], method: CorrelationMethod) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip();

        if xs.len() < 2 {
            return f64::NAN;
        }

        match method {
            CorrelationMethod::Pearson => Self::pearson(&xs, &ys),
            CorrelationMethod::Spearman => Self::pearson(&Self::ranks(xs), &Self::ranks(ys)),
        }
    }

    /// Average ranks, ties sharing the mean of their positions.
    fn ranks(values: Vec<f64>) -> Vec<f64> {
        Data::new(values).ranks(RankTieBreaker::Average)
    }

    fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let covariance = xs.iter().covariance(ys.iter());
        let r = covariance / (xs.iter().std_dev() * ys.iter().std_dev());
        if r.is_nan() {
            f64::NAN
        } else {
            r.clamp(-1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_table;

    fn table_of(columns: Vec<(&str, Vec<Option<f64>>)>) -> ObservationTable {
        let df = DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Column::new(name.into(), values))
                .collect(),
        )
        .unwrap();
        ObservationTable::new(df, "memory.csv")
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let table = sample_table();
        let cols = table.numeric_columns();
        let m = CorrelationAnalyzer::correlate(&table, &cols, CorrelationMethod::Spearman).unwrap();

        assert_eq!(m.size(), cols.len());
        for i in 0..m.size() {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..m.size() {
                let (a, b) = (m.get(i, j), m.get(j, i));
                assert!(a == b || (a.is_nan() && b.is_nan()));
                assert!(a.is_nan() || (-1.0..=1.0).contains(&a));
            }
        }
    }

    #[test]
    fn spearman_is_invariant_to_monotonic_transforms() {
        let x: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();
        let cubed: Vec<Option<f64>> = x.iter().map(|v| v.map(|x| x.powi(3))).collect();
        let reversed: Vec<Option<f64>> = x.iter().map(|v| v.map(|x| -x.exp())).collect();
        let table = table_of(vec![("x", x), ("cubed", cubed), ("reversed", reversed)]);

        let m = CorrelationAnalyzer::correlate(
            &table,
            &names(&["x", "cubed", "reversed"]),
            CorrelationMethod::Spearman,
        )
        .unwrap();
        assert!((m.by_name("x", "cubed").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.by_name("x", "reversed").unwrap() + 1.0).abs() < 1e-12);

        let pearson = CorrelationAnalyzer::correlate(
            &table,
            &names(&["x", "cubed"]),
            CorrelationMethod::Pearson,
        )
        .unwrap();
        assert!(pearson.get(0, 1) < 1.0 - 1e-6);
    }

    #[test]
    fn ties_use_average_ranks() {
        let table = table_of(vec![
            ("a", vec![Some(1.0), Some(2.0), Some(2.0), Some(3.0)]),
            ("b", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        ]);
        let m = CorrelationAnalyzer::correlate(
            &table,
            &names(&["a", "b"]),
            CorrelationMethod::Spearman,
        )
        .unwrap();
        // ranks a = [1, 2.5, 2.5, 4]
        let expected = 4.5 / (5.0f64.sqrt() * 4.5f64.sqrt());
        assert!((m.get(0, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn uses_pairwise_complete_rows_and_nan_for_constants() {
        let table = table_of(vec![
            ("a", vec![Some(1.0), None, Some(3.0), Some(4.0)]),
            ("b", vec![Some(2.0), Some(9.0), Some(6.0), Some(8.0)]),
            ("flat", vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0)]),
        ]);
        let m = CorrelationAnalyzer::correlate(
            &table,
            &names(&["a", "b", "flat"]),
            CorrelationMethod::Spearman,
        )
        .unwrap();
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        assert!(m.get(0, 2).is_nan());
        assert_eq!(m.get(2, 2), 1.0);
    }

    #[test]
    fn needs_two_columns() {
        let table = sample_table();
        let err = CorrelationAnalyzer::correlate(
            &table,
            &names(&["Distance_to_Coast"]),
            CorrelationMethod::Spearman,
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::TooFewColumns(1)));
    }

    #[test]
    fn strong_pairs_filter_sort_and_dedupe() {
        let m = CorrelationMatrix {
            columns: names(&["a", "b", "c", "d"]),
            values: vec![
                1.0, 0.9, -0.95, 0.7, //
                0.9, 1.0, 0.2, -0.9, //
                -0.95, 0.2, 1.0, f64::NAN, //
                0.7, -0.9, f64::NAN, 1.0,
            ],
        };
        let pairs = m.strong_pairs(DEFAULT_STRONG_THRESHOLD);
        let got: Vec<(&str, &str, f64)> = pairs
            .iter()
            .map(|p| (p.col_a.as_str(), p.col_b.as_str(), p.r))
            .collect();
        assert_eq!(
            got,
            vec![("a", "c", -0.95), ("a", "b", 0.9), ("b", "d", -0.9)]
        );
        assert!(pairs.iter().all(|p| p.r.abs() > DEFAULT_STRONG_THRESHOLD));
    }

    #[test]
    fn exports_as_frames() {
        let table = sample_table();
        let cols = names(&["Distance_to_Coast", "Med_bathym"]);
        let m = CorrelationAnalyzer::correlate(&table, &cols, CorrelationMethod::Spearman).unwrap();
        assert!((m.get(0, 1) + 1.0).abs() < 1e-12);

        let df = m.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 3));
        let pairs = strong_pairs_dataframe(&m.strong_pairs(0.7)).unwrap();
        assert_eq!(pairs.height(), 1);
    }
}
