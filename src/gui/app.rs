//! Seagrass Panel Main Application
//! Main window with control panel, statistics view and model results pages.

use crate::analysis::{analyze, correlation_summary, CorrelationSummary, Overview};
use crate::config::PanelConfig;
use crate::data::{DatasetStore, ObservationTable};
use crate::export;
use crate::gui::{ControlPanel, ControlPanelAction, ExportTarget, ResultsView, StatsView};
use crate::results::{ModelResults, Task};
use egui::{Color32, RichText, SidePanel, TopBottomPanel};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Dataset loading result from background thread
enum LoadResult {
    Complete {
        table: Arc<ObservationTable>,
        overview: Overview,
        correlation: Option<CorrelationSummary>,
    },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Variables,
    Models(Task),
}

/// Main application window.
pub struct SeagrassApp {
    config: PanelConfig,
    store: Arc<DatasetStore>,
    table: Option<Arc<ObservationTable>>,
    load_error: Option<String>,

    control_panel: ControlPanel,
    stats_view: StatsView,
    binary_view: ResultsView,
    multiclass_view: ResultsView,
    results: Option<ModelResults>,
    results_error: Option<String>,
    page: Page,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl SeagrassApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: PanelConfig) -> Self {
        let store = Arc::new(DatasetStore::new(config.data_path.clone()));

        let loaded = match &config.results_path {
            Some(path) => ModelResults::from_path(path),
            None => ModelResults::embedded(),
        };
        let (results, results_error) = match loaded {
            Ok(results) => (Some(results), None),
            Err(e) => {
                log::error!("Model results unavailable: {e}");
                (None, Some(e.to_string()))
            }
        };

        let mut control_panel = ControlPanel::new();
        control_panel.source = config.data_path.display().to_string();

        let mut app = Self {
            config,
            store,
            table: None,
            load_error: None,
            control_panel,
            stats_view: StatsView::new(),
            binary_view: ResultsView::new(Task::Binary),
            multiclass_view: ResultsView::new(Task::Multiclass),
            results,
            results_error,
            page: Page::Variables,
            load_rx: None,
        };
        app.start_loading();
        app
    }

    /// Load the dataset and the load-time summaries in a background thread.
    fn start_loading(&mut self) {
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.control_panel.set_status("Loading dataset...");

        let store = Arc::clone(&self.store);
        let threshold = self.config.strong_threshold;

        thread::spawn(move || {
            let result = match store.get_or_load() {
                Ok(table) => {
                    let overview = Overview::from_table(&table);
                    let correlation = match correlation_summary(&table, threshold) {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            log::warn!("Correlation analysis skipped: {e}");
                            None
                        }
                    };
                    LoadResult::Complete {
                        table,
                        overview,
                        correlation,
                    }
                }
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete {
                table,
                overview,
                correlation,
            }) => {
                self.control_panel.set_status(&format!(
                    "Loaded {} rows, {} columns",
                    table.row_count(),
                    table.column_names().len()
                ));
                self.control_panel.export_enabled = true;
                self.stats_view.overview = overview;
                self.stats_view.correlation = correlation;
                self.table = Some(table);
                self.recompute();
            }
            Ok(LoadResult::Error(error)) => {
                log::error!("{error}");
                self.control_panel.set_status(&format!("Error: {error}"));
                self.load_error = Some(error);
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.load_error = Some("Loader thread stopped unexpectedly".to_string());
            }
        }
    }

    fn recompute(&mut self) {
        if let Some(table) = &self.table {
            self.stats_view.analysis = analyze(table, &self.control_panel.selection);
        }
    }

    fn export_bytes(&self, target: ExportTarget) -> Result<Vec<u8>, String> {
        let analysis = &self.stats_view.analysis;
        let table = || self.table.as_ref().ok_or("No data loaded");
        let correlation = || {
            self.stats_view
                .correlation
                .as_ref()
                .ok_or("Correlation analysis unavailable")
        };

        let result = match target {
            ExportTarget::Dataset => export::table_csv(table()?),
            ExportTarget::Statistics => export::stats_csv(&analysis.set_stats),
            ExportTarget::PresenceStatistics => {
                let groups = analysis
                    .presence_stats
                    .as_ref()
                    .ok_or("No variable selected")?;
                export::group_stats_csv(groups)
            }
            ExportTarget::Correlation => export::correlation_csv(&correlation()?.matrix),
            ExportTarget::StrongPairs => export::strong_pairs_csv(&correlation()?.strong_pairs),
            ExportTarget::ModelResults(task, cv) => {
                let results = self.results.as_ref().ok_or("Model results unavailable")?;
                export::results_csv(results.task(task), cv)
            }
        };
        result.map_err(|e| e.to_string())
    }

    /// Handle CSV export with a save dialog
    fn handle_export(&mut self, target: ExportTarget) {
        let bytes = match self.export_bytes(target) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.control_panel.set_status(&format!("Export error: {e}"));
                return;
            }
        };

        let file_name = target.file_name(self.control_panel.selection.variable_set);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(file_name.as_str())
            .save_file()
        else {
            return;
        };

        match export::write_bytes(&path, &bytes) {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported {}", path.display())),
            Err(e) => {
                log::error!("{e}");
                self.control_panel.set_status(&format!("Export error: {e}"));
            }
        }
    }

    fn show_load_error(ui: &mut egui::Ui, error: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(
                RichText::new("⚠ Dataset unavailable")
                    .size(24.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            ui.add_space(10.0);
            ui.label(error);
            ui.add_space(10.0);
            ui.label(
                RichText::new(format!(
                    "Set --data or {} to the merged presence/absence CSV.",
                    crate::config::DATA_ENV
                ))
                .color(Color32::GRAY),
            );
        });
    }
}

impl eframe::App for SeagrassApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        TopBottomPanel::top("pages").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(
                    &mut self.page,
                    Page::Variables,
                    "🌿 Environmental Variables",
                );
                ui.selectable_value(
                    &mut self.page,
                    Page::Models(Task::Binary),
                    "🎯 Binary Classification",
                );
                ui.selectable_value(
                    &mut self.page,
                    Page::Models(Task::Multiclass),
                    "🧬 Multi-Class Classification",
                );
            });
        });

        if self.page == Page::Variables {
            SidePanel::left("control_panel")
                .min_width(300.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| match self.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::Export(target) => self.handle_export(target),
                        ControlPanelAction::None => {}
                    });
                });
        }

        let mut results_export = None;
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Variables => {
                if let Some(error) = &self.load_error {
                    Self::show_load_error(ui, error);
                } else if self.table.is_none() {
                    ui.centered_and_justified(|ui| ui.spinner());
                } else if let Some(focus) = self.stats_view.show(ui) {
                    self.control_panel.selection.focus = Some(focus);
                    self.recompute();
                }
            }
            Page::Models(task) => {
                let view = match task {
                    Task::Binary => &mut self.binary_view,
                    Task::Multiclass => &mut self.multiclass_view,
                };
                match (&self.results, &self.results_error) {
                    (Some(results), _) => results_export = view.show(ui, results),
                    (None, error) => {
                        ui.colored_label(
                            Color32::from_rgb(220, 53, 69),
                            error.as_deref().unwrap_or("Model results unavailable"),
                        );
                    }
                }
            }
        });
        if let Some(target) = results_export {
            self.handle_export(target);
        }
    }
}
