//! Plain-text overview printed by `--summary`.

use std::fmt::Write;

use crate::analysis::{correlation_summary, Overview};
use crate::data::ObservationTable;

pub fn overview(table: &ObservationTable, threshold: f64) -> anyhow::Result<String> {
    let overview = Overview::from_table(table);
    let mut out = String::new();
    writeln!(out, "Source: {}", table.source().display())?;
    writeln!(out, "Total observations: {}", overview.rows)?;
    writeln!(out, "Numeric predictors: {}", overview.predictors)?;
    writeln!(out, "Seagrass present: {}", overview.presence)?;
    for warning in &overview.warnings {
        writeln!(out, "Warning: {warning}")?;
    }

    writeln!(out, "\nObservations per geographic zone:")?;
    for zone in &overview.zones {
        writeln!(
            out,
            "  Zone {:<3} {:>6}  {:>6.2}%",
            zone.zone, zone.count, zone.percentage
        )?;
    }

    writeln!(out, "\nFamily distribution (presence only):")?;
    for family in &overview.families {
        writeln!(
            out,
            "  {:<16} {:>6}  {:>6.2}%",
            family.family, family.count, family.percentage
        )?;
    }

    let summary = correlation_summary(table, threshold)?;
    writeln!(
        out,
        "\nStrong Spearman correlations (|r| > {}): {}",
        summary.threshold,
        summary.strong_pairs.len()
    )?;
    for pair in &summary.strong_pairs {
        writeln!(out, "  {:+.3}  {} ~ {}", pair.r, pair.col_a, pair.col_b)?;
    }

    Ok(out)
}
