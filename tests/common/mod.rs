//! Integration test common infrastructure.
//!
//! Provides a scripted mock IRC server, a stub search gateway and a helper
//! that runs a bot against them.

#![allow(dead_code)]

pub mod gateway;
pub mod server;

use std::sync::Arc;

use gamebot::search::SearchGateway;
use gamebot::state::MemoryChannelStore;
use gamebot::{Bot, BotError, Config, StopReason};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[allow(unused_imports)]
pub use gateway::{Canned, StubGateway};
#[allow(unused_imports)]
pub use server::{BotConnection, MockServer};

pub const NICK: &str = "GameBot";
pub const OWNER: &str = "boliver";
pub const ADMIN: &str = "alice";

/// Config pointing at the mock server, with pacing disabled.
pub fn test_config(port: u16, extra_bot: &str) -> Config {
    let toml = format!(
        r##"
[server]
host = "127.0.0.1"
port = {port}

[bot]
nick = "{NICK}"
owner = "{OWNER}"
admins = ["{ADMIN}"]
message_delay_ms = 0
join_delay_ms = 0
{extra_bot}
"##
    );
    toml::from_str(&toml).expect("test config parses")
}

/// A bot running on its own task.
pub struct RunningBot {
    pub store: Arc<MemoryChannelStore>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<StopReason, BotError>>,
}

impl RunningBot {
    pub fn spawn(config: Config, channels: &[&str], gateway: Arc<dyn SearchGateway>) -> Self {
        let store = Arc::new(MemoryChannelStore::new(
            channels.iter().map(|c| c.to_string()).collect(),
        ));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let bot = Bot::new(config, store.clone(), gateway);
        let handle = tokio::spawn(async move {
            bot.run_with_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
        });
        Self {
            store,
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Signal shutdown.
    #[allow(dead_code)]
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the bot task to finish.
    pub async fn join(self) -> Result<StopReason, BotError> {
        let _keep_alive = self.stop;
        tokio::time::timeout(std::time::Duration::from_secs(5), self.handle)
            .await
            .expect("bot finished in time")
            .expect("bot task did not panic")
    }
}
