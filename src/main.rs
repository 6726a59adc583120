//! Seagrass Panel - interactive dashboard, or a text overview with `--summary`.

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use seagrass_panel::config::{Cli, PanelConfig};
use seagrass_panel::data::DatasetStore;
use seagrass_panel::gui::SeagrassApp;
use seagrass_panel::report;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = PanelConfig::from_env(&cli)?;
    log::info!("Dataset: {}", config.data_path.display());

    if cli.summary {
        let store = DatasetStore::new(config.data_path.clone());
        let table = store.get_or_load().map_err(|e| {
            log::error!("{e}");
            e
        })?;
        let text = report::overview(&table, config.strong_threshold)
            .context("Failed to summarize dataset")?;
        print!("{text}");
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Seagrass Panel"),
        ..Default::default()
    };

    eframe::run_native(
        "Seagrass Panel",
        options,
        Box::new(|cc| Ok(Box::new(SeagrassApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
