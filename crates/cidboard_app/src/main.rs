//! Terminal console for the CID Excel upload and processing service.
mod platform;

use std::path::PathBuf;

use anyhow::anyhow;
use board_logging::{board_info, board_warn, parse_level};
use cidboard_core::Route;
use clap::Parser;
use log::LevelFilter;

use platform::{AppConfig, LogDestination, Overrides, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "cidboard",
    version,
    about = "Upload Excel batches, drive processing and download results"
)]
struct Cli {
    /// RON config file; missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Origin of the processing service.
    #[arg(long, env = "CIDBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Page to open first.
    #[arg(long, default_value = "/login")]
    route: String,

    /// Where exports are saved.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    log: Option<LogDestination>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match AppConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    config.apply(Overrides {
        base_url: cli.base_url,
        download_dir: cli.download_dir,
        log: cli.log,
    });

    let level = parse_level(&config.log_level).unwrap_or(LevelFilter::Info);
    platform::initialize_logging(config.log, level);
    if let Some(err) = load_error {
        board_warn!("{}; using defaults", err);
    }

    let start = Route::from_path(&cli.route)
        .ok_or_else(|| anyhow!("unknown page: {}", cli.route))?;
    board_info!("starting on {} against {}", start.path(), config.base_url);

    platform::run_app(&config, start)
}
