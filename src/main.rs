mod blackboard; // shared mapping context
mod config; // `config`-crate loader
mod survey; // scan / move sequence

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let app_config = config::load_config(&path).with_context(|| format!("Failed to load configuration from {}", path))?;

    info!("Sonarmap started. Surveying with {} planned moves.", app_config.survey.moves.len());
    match survey::run(&app_config) {
        Ok(totals) => {
            info!(scans = totals.scans, new_obstacles = totals.new_obstacles, "Sonarmap finished successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Survey failed: {:?}", e);
            Err(e)
        }
    }
}
