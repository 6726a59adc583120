//! CSV Export Module
//! Serializes the table and the engine's frames into downloadable CSV bytes.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::ObservationTable;
use crate::results::{CvStrategy, TaskResults};
use crate::stats::{
    strong_pairs_dataframe, CorrelationMatrix, GroupStatsTable, StatsFrame, StrongPair,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write a frame as UTF-8 CSV with a header row.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buf)
}

pub fn table_csv(table: &ObservationTable) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(table.dataframe())
}

pub fn stats_csv(frame: &StatsFrame) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(&frame.to_dataframe()?)
}

pub fn group_stats_csv(groups: &GroupStatsTable) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(&groups.to_dataframe()?)
}

pub fn correlation_csv(matrix: &CorrelationMatrix) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(&matrix.to_dataframe()?)
}

pub fn strong_pairs_csv(pairs: &[StrongPair]) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(&strong_pairs_dataframe(pairs)?)
}

/// One task's scores under one CV strategy, one row per model.
pub fn results_csv(task: &TaskResults, cv: CvStrategy) -> Result<Vec<u8>, ExportError> {
    to_csv_bytes(&task.scores_dataframe(cv)?)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_table, PRESENCE_COL};
    use crate::results::{ModelResults, Task};
    use crate::stats::{CorrelationAnalyzer, CorrelationMethod, StatsCalculator};

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn stats_export_has_variable_column_first() {
        let table = sample_table();
        let frame = StatsCalculator::describe(&table, &["Distance_to_Coast".to_string()]).unwrap();
        let csv = text(stats_csv(&frame).unwrap());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "variable,count,mean,std,min,25%,50%,75%,max,range,cv"
        );
        assert!(lines.next().unwrap().starts_with("Distance_to_Coast,6,3.5,"));
    }

    #[test]
    fn table_export_round_trips_header() {
        let table = sample_table();
        let csv = text(table_csv(&table).unwrap());
        let header = csv.lines().next().unwrap();
        assert_eq!(header, table.column_names().join(","));
        assert_eq!(csv.lines().count(), table.row_count() + 1);
    }

    #[test]
    fn correlation_and_pairs_export() {
        let table = sample_table();
        let cols = vec!["Distance_to_Coast".to_string(), "Med_bathym".to_string()];
        let m = CorrelationAnalyzer::correlate(&table, &cols, CorrelationMethod::Spearman).unwrap();

        let csv = text(correlation_csv(&m).unwrap());
        assert!(csv.starts_with("variable,Distance_to_Coast,Med_bathym\n"));

        let csv = text(strong_pairs_csv(&m.strong_pairs(0.7)).unwrap());
        assert!(csv
            .starts_with("Variable 1,Variable 2,Correlation\nDistance_to_Coast,Med_bathym,"));
    }

    #[test]
    fn group_stats_export() {
        let table = sample_table();
        let groups = StatsCalculator::group_stats(&table, PRESENCE_COL, "Med_bathym").unwrap();
        let csv = text(group_stats_csv(&groups).unwrap());
        assert!(csv.starts_with("statistic,false,true\ncount,3"));
    }

    #[test]
    fn model_results_export() {
        let results = ModelResults::embedded().unwrap();
        let csv = text(results_csv(&results.binary, CvStrategy::Stratified).unwrap());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Model,Accuracy,Precision,Recall,F1,ROC_AUC"
        );
        assert!(lines.next().unwrap().starts_with("Random Forest,"));
        assert_eq!(csv.lines().count(), 1 + 7);

        let csv = text(results_csv(results.task(Task::Multiclass), CvStrategy::Spatial).unwrap());
        assert!(csv.starts_with("Model,Accuracy,Precision,Recall,Macro_F1\n"));
        assert_eq!(csv.lines().count(), 1 + 7);
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_bytes(&path, b"a,b\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
    }
}
