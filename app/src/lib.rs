//! FILENAME: app/src/lib.rs
// PURPOSE: Dashboard backend library entry point.
// CONTEXT: Wires configuration, logging and shared state to the command
// functions the presentation layer calls. Rendering lives outside this crate.

pub mod api_types;
pub mod commands;
pub mod config;
pub mod logging;
pub mod state;

pub use api_types::{
    DashboardKind, DashboardSummary, FilterSelections, PeriodInfo, PeriodProducts,
    ProductPerformance,
};
pub use commands::{
    compare_months, get_available_months, get_filter_options, get_product_performance,
    get_week_options, load_dashboard, set_first_weekday,
};
pub use config::DashboardConfig;
pub use state::{create_dashboard_state, DashboardState, WeekTables};

use dataset::log_info;
use log::LevelFilter;
use std::path::Path;

/// Reads the config (defaults when `config_path` is `None`), installs the
/// logger and returns fresh state. Data is loaded by `load_dashboard`.
pub fn init(config_path: Option<&Path>) -> Result<DashboardState, String> {
    let config = match config_path {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    logging::init_logging(config.log_file.as_deref(), LevelFilter::Info)?;
    log_info!("SYS", "dashboard backend starting");
    Ok(create_dashboard_state(config))
}
