//! Statistics Viewer Widget
//! Central panel: dataset overview, descriptive statistics, strong correlations,
//! zone summary and the presence/absence breakdown of the focused variable.

use crate::analysis::{presence_label, Analysis, CorrelationSummary, Overview};
use crate::stats::{DescriptiveStats, STAT_FIELDS};
use egui::{Color32, RichText, ScrollArea};

#[derive(Default)]
pub struct StatsView {
    pub overview: Overview,
    pub analysis: Analysis,
    pub correlation: Option<CorrelationSummary>,
}

fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(15.0);
    ui.label(RichText::new(title).size(18.0).strong());
    ui.add_space(5.0);
}

fn framed(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(8.0)
        .show(ui, add_contents);
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable the user picked for the presence breakdown, if changed.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<String> {
        let mut picked = None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_overview(ui);

                for warning in self.overview.warnings.iter().chain(&self.analysis.warnings) {
                    ui.colored_label(Color32::from_rgb(220, 53, 69), format!("⚠ {warning}"));
                }

                section(ui, "📊 Descriptive Statistics");
                if self.analysis.set_stats.is_empty() {
                    ui.label("No variables in this set.");
                } else {
                    let rows: Vec<(&str, &DescriptiveStats)> = self
                        .analysis
                        .set_stats
                        .rows
                        .iter()
                        .map(|row| (row.variable.as_str(), &row.stats))
                        .collect();
                    Self::draw_stats_table(ui, "describe", "Variable", &rows);
                }

                self.draw_correlations(ui);
                self.draw_zones(ui);
                picked = self.draw_distribution(ui);
            });

        picked
    }

    fn draw_overview(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for (label, value) in [
                ("Total Observations", self.overview.rows.to_string()),
                ("Environmental Predictors", self.overview.predictors.to_string()),
                ("Seagrass Present", self.overview.presence.to_string()),
                ("Geographic Zones", self.overview.zones.len().to_string()),
            ] {
                framed(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(20.0).strong());
                    });
                });
            }
        });
    }

    /// One row per entry, one column per statistic.
    fn draw_stats_table(
        ui: &mut egui::Ui,
        id: &str,
        first: &str,
        rows: &[(&str, &DescriptiveStats)],
    ) {
        framed(ui, |ui| {
            ScrollArea::horizontal().id_salt(id).show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("stats_table_{id}")))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new(first).strong().size(11.0));
                        for field in STAT_FIELDS {
                            ui.label(RichText::new(field).strong().size(11.0));
                        }
                        ui.end_row();

                        for (name, stats) in rows {
                            ui.label(RichText::new(*name).size(11.0));
                            ui.label(RichText::new(stats.count.to_string()).size(11.0));
                            for value in &stats.values()[1..] {
                                ui.label(RichText::new(fmt_stat(*value)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
        });
    }

    fn draw_correlations(&self, ui: &mut egui::Ui) {
        let Some(summary) = &self.correlation else {
            return;
        };
        section(ui, "🔗 Strong Spearman Correlations");
        ui.label(format!(
            "{} static and annual-average variables, pairs with |r| > {}",
            summary.matrix.size(),
            summary.threshold
        ));

        if summary.strong_pairs.is_empty() {
            ui.label(format!("No correlations with |r| > {} found.", summary.threshold));
            return;
        }

        framed(ui, |ui| {
            ScrollArea::vertical().id_salt("strong_pairs").max_height(260.0).show(ui, |ui| {
                egui::Grid::new("strong_pairs_grid")
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Variable 1").strong().size(11.0));
                        ui.label(RichText::new("Variable 2").strong().size(11.0));
                        ui.label(RichText::new("Correlation").strong().size(11.0));
                        ui.end_row();
                        for pair in &summary.strong_pairs {
                            let color = if pair.r > 0.0 {
                                Color32::from_rgb(40, 167, 69)
                            } else {
                                Color32::from_rgb(220, 53, 69)
                            };
                            ui.label(RichText::new(&pair.col_a).size(11.0));
                            ui.label(RichText::new(&pair.col_b).size(11.0));
                            ui.label(
                                RichText::new(format!("{:+.3}", pair.r))
                                    .size(11.0)
                                    .color(color),
                            );
                            ui.end_row();
                        }
                    });
            });
        });
    }

    fn draw_zones(&self, ui: &mut egui::Ui) {
        section(ui, "🗺 Geographic Distribution");
        ui.horizontal_top(|ui| {
            framed(ui, |ui| {
                egui::Grid::new("zone_grid").striped(true).show(ui, |ui| {
                    ui.label(RichText::new("Zone").strong());
                    ui.label(RichText::new("Count").strong());
                    ui.label(RichText::new("Percentage").strong());
                    ui.end_row();
                    for zone in &self.overview.zones {
                        ui.label(format!("Zone {}", zone.zone));
                        ui.label(zone.count.to_string());
                        ui.label(format!("{:.2}%", zone.percentage));
                        ui.end_row();
                    }
                });
            });
            ui.add_space(15.0);
            framed(ui, |ui| {
                egui::Grid::new("family_grid").striped(true).show(ui, |ui| {
                    ui.label(RichText::new("Family").strong());
                    ui.label(RichText::new("Count").strong());
                    ui.label(RichText::new("Percentage").strong());
                    ui.end_row();
                    for family in &self.overview.families {
                        ui.label(&family.family);
                        ui.label(family.count.to_string());
                        ui.label(format!("{:.2}%", family.percentage));
                        ui.end_row();
                    }
                });
            });
        });
    }

    fn draw_distribution(&self, ui: &mut egui::Ui) -> Option<String> {
        section(ui, "📈 Distribution Analysis");
        let filtered = &self.analysis.filtered;
        ui.label(format!("{} variables match your filter criteria", filtered.len()));

        let Some(focus) = &self.analysis.focus else {
            ui.colored_label(
                Color32::from_rgb(255, 193, 7),
                "No variables match the selected filter criteria. Please adjust your filters.",
            );
            return None;
        };

        let mut picked = None;
        egui::ComboBox::from_id_salt("focus_variable")
            .width(320.0)
            .selected_text(focus.as_str())
            .show_ui(ui, |ui| {
                for name in filtered {
                    if ui.selectable_label(name == focus, name).clicked() && name != focus {
                        picked = Some(name.clone());
                    }
                }
            });

        if let Some(groups) = &self.analysis.presence_stats {
            ui.add_space(8.0);
            ui.label(RichText::new(format!("Statistics for {focus}")).strong());
            let rows: Vec<(&str, &DescriptiveStats)> = groups
                .groups
                .iter()
                .map(|(label, stats)| (presence_label(label), stats))
                .collect();
            Self::draw_stats_table(ui, "presence", "Group", &rows);
        }
        picked
    }
}
