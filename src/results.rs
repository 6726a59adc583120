//! Model Results Module
//! Pre-computed classifier scores and feature importances shown by the panel.
//! The numbers are fixture data (`assets/model_results.json`), not computed here.

use polars::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const EMBEDDED_RESULTS: &str = include_str!("../assets/model_results.json");

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Invalid results JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read results file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    Binary,
    Multiclass,
}

impl Task {
    pub const ALL: [Task; 2] = [Task::Binary, Task::Multiclass];

    pub fn slug(self) -> &'static str {
        match self {
            Task::Binary => "binary",
            Task::Multiclass => "multiclass",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Task::Binary => "Binary Classification",
            Task::Multiclass => "Multi-Class Classification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CvStrategy {
    #[default]
    Stratified,
    Spatial,
}

impl CvStrategy {
    pub const ALL: [CvStrategy; 2] = [CvStrategy::Stratified, CvStrategy::Spatial];

    pub fn slug(self) -> &'static str {
        match self {
            CvStrategy::Stratified => "stratified",
            CvStrategy::Spatial => "spatial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CvStrategy::Stratified => "Stratified K-Fold (10-fold)",
            CvStrategy::Spatial => "Spatial Cross-Validation (GroupKFold by Zone)",
        }
    }
}

impl fmt::Display for CvStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelScores {
    pub model: String,
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskResults {
    /// Metric names in display order.
    pub metrics: Vec<String>,
    pub stratified: Vec<ModelScores>,
    pub spatial: Vec<ModelScores>,
    pub top_features: Vec<FeatureImportance>,
}

/// Stratified vs spatial score of one model on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CvComparisonRow {
    pub model: String,
    pub metric: String,
    pub stratified: f64,
    pub spatial: f64,
    pub difference: f64,
    pub difference_pct: f64,
}

impl TaskResults {
    pub fn scores(&self, cv: CvStrategy) -> &[ModelScores] {
        match cv {
            CvStrategy::Stratified => &self.stratified,
            CvStrategy::Spatial => &self.spatial,
        }
    }

    /// Scores under `cv` as a frame: `Model`, then one column per metric.
    /// A metric missing for a model is null.
    pub fn scores_dataframe(&self, cv: CvStrategy) -> PolarsResult<DataFrame> {
        let rows = self.scores(cv);
        let mut columns = vec![Column::new(
            "Model".into(),
            rows.iter().map(|m| m.model.clone()).collect::<Vec<_>>(),
        )];
        for metric in &self.metrics {
            let values: Vec<Option<f64>> =
                rows.iter().map(|m| m.scores.get(metric).copied()).collect();
            columns.push(Column::new(metric.as_str().into(), values));
        }
        DataFrame::new(columns)
    }

    pub fn models(&self) -> Vec<String> {
        self.stratified.iter().map(|m| m.model.clone()).collect()
    }

    fn score(&self, cv: CvStrategy, model: &str, metric: &str) -> Result<f64, ResultsError> {
        let row = self
            .scores(cv)
            .iter()
            .find(|m| m.model == model)
            .ok_or_else(|| ResultsError::UnknownModel(model.to_string()))?;
        row.scores
            .get(metric)
            .copied()
            .ok_or_else(|| ResultsError::UnknownMetric(metric.to_string()))
    }

    /// Models ordered by `metric`, best first.
    pub fn ranking(
        &self,
        cv: CvStrategy,
        metric: &str,
    ) -> Result<Vec<(String, f64)>, ResultsError> {
        let mut ranked = self
            .scores(cv)
            .iter()
            .map(|m| {
                m.scores
                    .get(metric)
                    .map(|v| (m.model.clone(), *v))
                    .ok_or_else(|| ResultsError::UnknownMetric(metric.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }

    /// How much each model loses when validated on held-out zones.
    pub fn cv_comparison(
        &self,
        models: &[String],
        metrics: &[String],
    ) -> Result<Vec<CvComparisonRow>, ResultsError> {
        let mut rows = Vec::with_capacity(models.len() * metrics.len());
        for model in models {
            for metric in metrics {
                let stratified = self.score(CvStrategy::Stratified, model, metric)?;
                let spatial = self.score(CvStrategy::Spatial, model, metric)?;
                let difference = stratified - spatial;
                rows.push(CvComparisonRow {
                    model: model.clone(),
                    metric: metric.clone(),
                    stratified,
                    spatial,
                    difference,
                    difference_pct: difference / stratified * 100.0,
                });
            }
        }
        Ok(rows)
    }

    /// Feature count per category, most frequent first.
    pub fn importance_by_category(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for feature in &self.top_features {
            *counts.entry(feature.category.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelResults {
    pub binary: TaskResults,
    pub multiclass: TaskResults,
}

impl ModelResults {
    /// Results bundled with the binary.
    pub fn embedded() -> Result<Self, ResultsError> {
        Ok(serde_json::from_str(EMBEDDED_RESULTS)?)
    }

    /// Results from an external JSON file with the same layout.
    pub fn from_path(path: &Path) -> Result<Self, ResultsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn task(&self, task: Task) -> &TaskResults {
        match task {
            Task::Binary => &self.binary,
            Task::Multiclass => &self.multiclass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_results_parse() {
        let results = ModelResults::embedded().unwrap();
        assert_eq!(results.binary.stratified.len(), 7);
        assert_eq!(results.multiclass.spatial.len(), 7);
        assert_eq!(results.binary.metrics.len(), 5);
        assert_eq!(results.multiclass.top_features.len(), 10);
    }

    #[test]
    fn ranking_is_sorted_best_first() {
        let results = ModelResults::embedded().unwrap();
        let ranked = results.binary.ranking(CvStrategy::Spatial, "F1").unwrap();
        assert_eq!(ranked[0].0, "Random Forest");
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));

        let mc = results.task(Task::Multiclass).ranking(CvStrategy::Spatial, "Macro_F1").unwrap();
        assert_eq!(mc[0].0, "K Neighbors");
    }

    #[test]
    fn unknown_metric_is_an_error() {
        let results = ModelResults::embedded().unwrap();
        let err = results.binary.ranking(CvStrategy::Stratified, "Macro_F1").unwrap_err();
        assert!(matches!(err, ResultsError::UnknownMetric(_)));
    }

    #[test]
    fn cv_comparison_rows() {
        let results = ModelResults::embedded().unwrap();
        let rows = results
            .multiclass
            .cv_comparison(&["K Neighbors".to_string()], &["Macro_F1".to_string()])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].difference - (0.7659 - 0.6209)).abs() < 1e-9);
        assert!((rows[0].difference_pct - 18.93).abs() < 0.01);

        let err = results
            .binary
            .cv_comparison(&["Perceptron".to_string()], &["F1".to_string()])
            .unwrap_err();
        assert!(matches!(err, ResultsError::UnknownModel(_)));
    }

    #[test]
    fn scores_frame_has_model_then_metrics() {
        let results = ModelResults::embedded().unwrap();
        let df = results.binary.scores_dataframe(CvStrategy::Spatial).unwrap();
        assert_eq!(df.height(), 7);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["Model", "Accuracy", "Precision", "Recall", "F1", "ROC_AUC"]);

        let df = results.multiclass.scores_dataframe(CvStrategy::Stratified).unwrap();
        assert_eq!(df.width(), 5);
        assert_eq!(df.column("Macro_F1").unwrap().null_count(), 0);
    }

    #[test]
    fn feature_categories() {
        let results = ModelResults::embedded().unwrap();
        assert_eq!(
            results.binary.importance_by_category(),
            vec![("Chlorophyll".to_string(), 8), ("Geographic".to_string(), 2)]
        );
    }
}
