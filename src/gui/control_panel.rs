//! Control Panel Widget
//! Left side panel with the data source, variable filters and export buttons.

use crate::analysis::Selection;
use crate::data::{Month, TemporalPeriod, VariableCategory, VariableSet};
use crate::results::{CvStrategy, Task};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with filter selectors and export controls.
pub struct ControlPanel {
    pub selection: Selection,
    pub source: String,
    pub status: String,
    pub export_enabled: bool,
    month_picks: [bool; 12],
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            source: "No file loaded".to_string(),
            status: "Loading dataset...".to_string(),
            export_enabled: false,
            month_picks: [false; 12],
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn sync_months(&mut self) {
        self.selection.months = Month::ALL
            .into_iter()
            .zip(self.month_picks)
            .filter(|(_, picked)| *picked)
            .map(|(month, _)| month)
            .collect();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.selection.clone();

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌊 Seagrass Panel")
                    .size(22.0)
                    .color(Color32::from_rgb(46, 139, 87)),
            );
            ui.label(
                RichText::new("Mediterranean Seagrass Intelligence")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.source).size(12.0));
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Descriptive Statistics Section =====
        ui.label(RichText::new("📊 Variable Type").size(14.0).strong());
        ui.add_space(5.0);
        for set in VariableSet::ALL {
            ui.radio_value(&mut self.selection.variable_set, set, set.label());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Distribution Filters Section =====
        ui.label(RichText::new("🔧 Distribution Filters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 90.0;
        let combo_width = 190.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Variable:"));
            ComboBox::from_id_salt("category")
                .width(combo_width)
                .selected_text(self.selection.category.label())
                .show_ui(ui, |ui| {
                    for category in VariableCategory::ALL {
                        ui.selectable_value(
                            &mut self.selection.category,
                            category,
                            category.label(),
                        );
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Period:"));
            ComboBox::from_id_salt("period")
                .width(combo_width)
                .selected_text(self.selection.period.label())
                .show_ui(ui, |ui| {
                    for period in TemporalPeriod::ALL {
                        ui.selectable_value(&mut self.selection.period, period, period.label());
                    }
                });
        });

        if self.selection.period == TemporalPeriod::Monthly
            && self.selection.category != VariableCategory::Static
        {
            ui.add_space(5.0);
            ui.label("Specific month(s):");
            egui::Grid::new("month_picks").num_columns(3).show(ui, |ui| {
                for (i, month) in Month::ALL.into_iter().enumerate() {
                    ui.checkbox(&mut self.month_picks[i], month.label());
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
            ui.horizontal(|ui| {
                if ui.small_button("Clear Months").clicked() {
                    self.month_picks = [false; 12];
                }
            });
        }
        self.sync_months();

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.label(RichText::new("💾 Export CSV").size(14.0).strong());
        ui.add_space(5.0);
        ui.add_enabled_ui(self.export_enabled, |ui| {
            for (label, target) in [
                ("📥 Dataset", ExportTarget::Dataset),
                ("📥 Statistics", ExportTarget::Statistics),
                ("📥 Statistics by Presence", ExportTarget::PresenceStatistics),
                ("📥 Correlation Matrix", ExportTarget::Correlation),
                ("📥 Strong Correlations", ExportTarget::StrongPairs),
            ] {
                let button = egui::Button::new(RichText::new(label).size(13.0))
                    .min_size(egui::vec2(220.0, 26.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export(target);
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if action == ControlPanelAction::None && self.selection != before {
            action = ControlPanelAction::SelectionChanged;
        }
        action
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Dataset,
    Statistics,
    PresenceStatistics,
    Correlation,
    StrongPairs,
    ModelResults(Task, CvStrategy),
}

impl ExportTarget {
    pub fn file_name(self, set: VariableSet) -> String {
        match self {
            ExportTarget::Dataset => "med_seagrass_data.csv".to_string(),
            ExportTarget::Statistics => format!("seagrass_{}_statistics.csv", set.slug()),
            ExportTarget::PresenceStatistics => "seagrass_presence_statistics.csv".to_string(),
            ExportTarget::Correlation => "seagrass_spearman_correlation.csv".to_string(),
            ExportTarget::StrongPairs => "seagrass_strong_correlations.csv".to_string(),
            ExportTarget::ModelResults(task, cv) => {
                format!("{}_classification_{}_results.csv", task.slug(), cv.slug())
            }
        }
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    Export(ExportTarget),
}
