mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
pub use config::{AppConfig, Overrides, DEFAULT_CONFIG_FILE};
pub use logging::{initialize as initialize_logging, LogDestination};
