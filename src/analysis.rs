//! Analysis Module
//! One recomputation pass per user interaction: filter, describe, group by presence.

use polars::prelude::PolarsResult;

use crate::data::{
    FamilyCount, Month, ObservationTable, TemporalPeriod, VariableCategory, VariableSet, ZoneCount,
    PRESENCE_COL,
};
use crate::stats::{
    CorrelationAnalyzer, CorrelationMatrix, CorrelationMethod, GroupStatsTable, StatsCalculator,
    StatsError, StatsFrame, StrongPair,
};

/// Current state of the selectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub variable_set: VariableSet,
    pub category: VariableCategory,
    pub period: TemporalPeriod,
    pub months: Vec<Month>,
    /// Variable inspected by presence/absence; falls back to the first filtered one.
    pub focus: Option<String>,
}

impl Selection {
    /// Month picks only apply to monthly, time-bearing categories.
    pub fn effective_months(&self) -> &[Month] {
        if self.period == TemporalPeriod::Monthly && !self.category.ignores_period() {
            &self.months
        } else {
            &[]
        }
    }
}

/// Everything derived from one [`Selection`].
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub set_stats: StatsFrame,
    pub filtered: Vec<String>,
    pub focus: Option<String>,
    pub presence_stats: Option<GroupStatsTable>,
    /// Inline problems; the rest of the analysis is still usable.
    pub warnings: Vec<String>,
}

/// Dataset-level figures, computed once per load.
///
/// A missing summary column leaves its figure empty and adds a warning;
/// the rest of the overview is still filled in.
#[derive(Debug, Clone, Default)]
pub struct Overview {
    pub rows: usize,
    pub predictors: usize,
    pub presence: usize,
    pub zones: Vec<ZoneCount>,
    pub families: Vec<FamilyCount>,
    pub warnings: Vec<String>,
}

fn or_warn<T: Default>(warnings: &mut Vec<String>, context: &str, result: PolarsResult<T>) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("{context}: {e}");
        warnings.push(format!("{context}: {e}"));
        T::default()
    })
}

impl Overview {
    pub fn from_table(table: &ObservationTable) -> Self {
        let mut warnings = Vec::new();
        let presence = or_warn(&mut warnings, "Presence count", table.presence_count());
        let zones = or_warn(&mut warnings, "Zone summary", table.zone_summary());
        let families = or_warn(&mut warnings, "Family distribution", table.family_distribution());
        Self {
            rows: table.row_count(),
            predictors: table.numeric_columns().len(),
            presence,
            zones,
            families,
            warnings,
        }
    }
}

/// Correlation analysis over the static and annual-average variables.
#[derive(Debug, Clone)]
pub struct CorrelationSummary {
    pub matrix: CorrelationMatrix,
    pub strong_pairs: Vec<StrongPair>,
    pub threshold: f64,
}

fn warn(warnings: &mut Vec<String>, context: &str, err: StatsError) {
    log::warn!("{context}: {err}");
    warnings.push(format!("{context}: {err}"));
}

pub fn analyze(table: &ObservationTable, selection: &Selection) -> Analysis {
    let mut analysis = Analysis::default();

    let set_columns = table.variable_set(selection.variable_set);
    match StatsCalculator::describe(table, &set_columns) {
        Ok(frame) => analysis.set_stats = frame,
        Err(e) => warn(&mut analysis.warnings, "Descriptive statistics", e),
    }

    analysis.filtered = table.select_columns(
        selection.category,
        selection.period,
        selection.effective_months(),
    );

    analysis.focus = selection
        .focus
        .clone()
        .filter(|f| analysis.filtered.contains(f))
        .or_else(|| analysis.filtered.first().cloned());

    if let Some(focus) = &analysis.focus {
        match StatsCalculator::group_stats(table, PRESENCE_COL, focus) {
            Ok(groups) => analysis.presence_stats = Some(groups),
            Err(e) => warn(&mut analysis.warnings, "Statistics by presence", e),
        }
    }

    log::debug!(
        "Recomputed: {} set columns, {} filtered ({:?} / {:?})",
        analysis.set_stats.rows.len(),
        analysis.filtered.len(),
        selection.category,
        selection.period
    );
    analysis
}

pub fn correlation_summary(
    table: &ObservationTable,
    threshold: f64,
) -> Result<CorrelationSummary, StatsError> {
    let columns = table.catalog().correlation_columns();
    let matrix = CorrelationAnalyzer::correlate(table, &columns, CorrelationMethod::Spearman)?;
    let strong_pairs = matrix.strong_pairs(threshold);
    Ok(CorrelationSummary {
        matrix,
        strong_pairs,
        threshold,
    })
}

/// Display label for a presence group value.
pub fn presence_label(group: &str) -> &str {
    match group {
        "true" => "Presence",
        "false" => "Absence",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_table, FAMILY_COL};

    #[test]
    fn default_selection_describes_static_set() {
        let table = sample_table();
        let analysis = analyze(&table, &Selection::default());
        let described: Vec<&str> = analysis
            .set_stats
            .rows
            .iter()
            .map(|r| r.variable.as_str())
            .collect();
        assert_eq!(described, vec!["Med_bathym", "Distance_to_Coast"]);
        assert_eq!(analysis.filtered.len(), table.numeric_columns().len());
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn focus_falls_back_to_first_filtered_variable() {
        let table = sample_table();
        let selection = Selection {
            category: VariableCategory::Temperature,
            period: TemporalPeriod::Annual,
            focus: Some("Med_bathym".into()),
            ..Selection::default()
        };
        let analysis = analyze(&table, &selection);
        assert_eq!(analysis.filtered, vec!["VOTEMPER_2015_year"]);
        assert_eq!(analysis.focus.as_deref(), Some("VOTEMPER_2015_year"));
        let groups = analysis.presence_stats.unwrap();
        assert_eq!(groups.get("true").unwrap().count, 2);
    }

    #[test]
    fn months_ignored_outside_monthly() {
        let selection = Selection {
            category: VariableCategory::Chlorophyll,
            period: TemporalPeriod::Seasonal,
            months: vec![Month::March],
            ..Selection::default()
        };
        assert!(selection.effective_months().is_empty());
    }

    #[test]
    fn empty_filter_has_no_focus() {
        let table = sample_table();
        let selection = Selection {
            category: VariableCategory::WaveHeight,
            ..Selection::default()
        };
        let analysis = analyze(&table, &selection);
        assert!(analysis.filtered.is_empty());
        assert!(analysis.focus.is_none());
        assert!(analysis.presence_stats.is_none());
    }

    #[test]
    fn correlation_over_static_and_annual() {
        let table = sample_table();
        let summary = correlation_summary(&table, 0.7).unwrap();
        assert_eq!(
            summary.matrix.columns(),
            ["Med_bathym", "Distance_to_Coast", "VOTEMPER_2015_year"]
        );
        assert!(summary.strong_pairs.iter().any(|p| p.col_a == "Med_bathym"
            && p.col_b == "Distance_to_Coast"
            && (p.r + 1.0).abs() < 1e-12));
    }

    #[test]
    fn overview_counts() {
        let overview = Overview::from_table(&sample_table());
        assert_eq!(overview.rows, 6);
        assert_eq!(overview.presence, 3);
        assert_eq!(overview.zones.len(), 3);
        assert_eq!(overview.families[0].family, "Cymodoceaceae");
        assert!(overview.warnings.is_empty());
    }

    #[test]
    fn overview_without_family_column_warns() {
        let mut df = sample_table().dataframe().clone();
        let _ = df.drop_in_place(FAMILY_COL).unwrap();
        let table = ObservationTable::new(df, "no_family.csv");

        let overview = Overview::from_table(&table);
        assert_eq!(overview.rows, 6);
        assert_eq!(overview.presence, 3);
        assert_eq!(overview.zones.len(), 3);
        assert!(overview.families.is_empty());
        assert_eq!(overview.warnings.len(), 1);
        assert!(overview.warnings[0].starts_with("Family distribution"));

        let analysis = analyze(
            &table,
            &Selection {
                category: VariableCategory::Temperature,
                ..Selection::default()
            },
        );
        assert_eq!(analysis.filtered, vec!["VOTEMPER_2015_year"]);
        assert!(analysis.presence_stats.is_some());
    }

    #[test]
    fn presence_labels() {
        assert_eq!(presence_label("true"), "Presence");
        assert_eq!(presence_label("false"), "Absence");
        assert_eq!(presence_label("3"), "3");
    }
}
