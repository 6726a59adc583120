//! GUI module - User interface components

mod app;
mod control_panel;
mod results_view;
mod stats_view;

pub use app::SeagrassApp;
pub use control_panel::{ControlPanel, ControlPanelAction, ExportTarget};
pub use results_view::ResultsView;
pub use stats_view::StatsView;
