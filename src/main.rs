//! gamebot - IRC game search bot.

use std::sync::Arc;

use gamebot::config::{Config, validate};
use gamebot::search::{IgdbGateway, SearchGateway, UnconfiguredGateway};
use gamebot::state::{ChannelStore, FileChannelStore, MemoryChannelStore};
use gamebot::{Bot, telemetry};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gamebot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(path = %config_path, "{}", e);
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        tls = config.server.tls,
        nick = %config.bot.nick,
        "Starting gamebot"
    );

    let store: Arc<dyn ChannelStore> = match &config.bot.channels_file {
        Some(path) => Arc::new(FileChannelStore::new(path, config.bot.channels.clone())),
        None => Arc::new(MemoryChannelStore::new(config.bot.channels.clone())),
    };

    let igdb = IgdbGateway::from_config(&config.igdb)?;
    let gateway: Arc<dyn SearchGateway> = if igdb.is_configured() {
        Arc::new(igdb)
    } else {
        warn!("No IGDB credentials configured; searches will fail");
        Arc::new(UnconfiguredGateway)
    };

    let bot = Bot::new(config, store, gateway);
    let reason = bot.run().await?;
    if reason.is_requested() {
        info!(?reason, "gamebot stopped");
        Ok(())
    } else {
        anyhow::bail!("disconnected from server: {:?}", reason)
    }
}
