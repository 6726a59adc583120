//! Model Results Widget
//! Classifier comparison tables for the binary and multi-class tasks.

use crate::gui::ExportTarget;
use crate::results::{CvStrategy, ModelResults, Task};
use egui::{Color32, ComboBox, RichText, ScrollArea};

pub struct ResultsView {
    pub task: Task,
    pub cv: CvStrategy,
    pub metric: String,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self {
            task: Task::Binary,
            cv: CvStrategy::Stratified,
            metric: "Accuracy".to_string(),
        }
    }
}

impl ResultsView {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    /// Returns the download the user asked for, if any.
    pub fn show(&mut self, ui: &mut egui::Ui, results: &ModelResults) -> Option<ExportTarget> {
        let mut export = None;
        let task = results.task(self.task);
        if !task.metrics.contains(&self.metric) {
            if let Some(first) = task.metrics.first() {
                self.metric = first.clone();
            }
        }

        ui.label(RichText::new(format!("🎯 {}", self.task.label())).size(22.0).strong());
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Cross-Validation Strategy:");
            ComboBox::from_id_salt(("cv", self.task.label()))
                .width(320.0)
                .selected_text(self.cv.label())
                .show_ui(ui, |ui| {
                    for cv in CvStrategy::ALL {
                        ui.selectable_value(&mut self.cv, cv, cv.label());
                    }
                });
            ui.add_space(20.0);
            ui.label("Performance Metric:");
            ComboBox::from_id_salt(("metric", self.task.label()))
                .selected_text(&self.metric)
                .show_ui(ui, |ui| {
                    for metric in &task.metrics {
                        ui.selectable_value(&mut self.metric, metric.clone(), metric);
                    }
                });
        });

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(15.0);
                ui.label(
                    RichText::new(format!("📊 Ranking by {} - {}", self.metric, self.cv))
                        .size(16.0)
                        .strong(),
                );
                match task.ranking(self.cv, &self.metric) {
                    Ok(ranked) => {
                        egui::Grid::new(("ranking", self.task.label()))
                            .striped(true)
                            .spacing([16.0, 4.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("#").strong());
                                ui.label(RichText::new("Model").strong());
                                ui.label(RichText::new(&self.metric).strong());
                                ui.end_row();
                                for (rank, (model, score)) in ranked.iter().enumerate() {
                                    ui.label((rank + 1).to_string());
                                    ui.label(model);
                                    ui.add(
                                        egui::ProgressBar::new(*score as f32)
                                            .text(format!("{score:.4}")),
                                    );
                                    ui.end_row();
                                }
                            });
                    }
                    Err(e) => {
                        ui.colored_label(Color32::from_rgb(220, 53, 69), e.to_string());
                    }
                }

                ui.add_space(15.0);
                ui.label(RichText::new("⚖ Stratified vs Spatial CV").size(16.0).strong());
                match task.cv_comparison(&task.models(), &task.metrics) {
                    Ok(rows) => {
                        egui::Grid::new(("comparison", self.task.label()))
                            .striped(true)
                            .spacing([16.0, 4.0])
                            .show(ui, |ui| {
                                for header in [
                                    "Model",
                                    "Metric",
                                    "Stratified CV",
                                    "Spatial CV",
                                    "Difference",
                                    "Difference %",
                                ] {
                                    ui.label(RichText::new(header).strong());
                                }
                                ui.end_row();
                                for row in rows.iter().filter(|r| r.metric == self.metric) {
                                    ui.label(&row.model);
                                    ui.label(&row.metric);
                                    ui.label(format!("{:.2}", row.stratified));
                                    ui.label(format!("{:.2}", row.spatial));
                                    ui.label(format!("{:.2}", row.difference));
                                    ui.label(format!("{:.1}%", row.difference_pct));
                                    ui.end_row();
                                }
                            });
                    }
                    Err(e) => {
                        ui.colored_label(Color32::from_rgb(220, 53, 69), e.to_string());
                    }
                }

                ui.add_space(15.0);
                ui.label(RichText::new("🔑 Top Features").size(16.0).strong());
                ui.horizontal_top(|ui| {
                    egui::Grid::new(("features", self.task.label()))
                        .striped(true)
                        .spacing([16.0, 4.0])
                        .show(ui, |ui| {
                            ui.label(RichText::new("Feature").strong());
                            ui.label(RichText::new("Importance").strong());
                            ui.label(RichText::new("Category").strong());
                            ui.end_row();
                            for feature in &task.top_features {
                                ui.label(&feature.feature);
                                ui.label(format!("{:.4}", feature.importance));
                                ui.label(&feature.category);
                                ui.end_row();
                            }
                        });
                    ui.add_space(30.0);
                    egui::Grid::new(("feature_categories", self.task.label()))
                        .striped(true)
                        .show(ui, |ui| {
                            ui.label(RichText::new("Category").strong());
                            ui.label(RichText::new("Features").strong());
                            ui.end_row();
                            for (category, count) in task.importance_by_category() {
                                ui.label(category);
                                ui.label(count.to_string());
                                ui.end_row();
                            }
                        });
                });

                ui.add_space(15.0);
                ui.label(RichText::new("💾 Download Results").size(16.0).strong());
                ui.horizontal(|ui| {
                    for (label, cv) in [
                        ("📥 Stratified CV Results", CvStrategy::Stratified),
                        ("📥 Spatial CV Results", CvStrategy::Spatial),
                    ] {
                        let button = egui::Button::new(RichText::new(label).size(13.0))
                            .min_size(egui::vec2(220.0, 26.0));
                        if ui.add(button).clicked() {
                            export = Some(ExportTarget::ModelResults(self.task, cv));
                        }
                    }
                });
            });
        export
    }
}
