//! irc-gamebot: an IRC bot that answers `!game` queries from the IGDB catalog.
//!
//! The binary in `main.rs` loads the config, builds the collaborators and
//! runs a [`Bot`]. Everything is exposed here so integration tests can drive
//! a bot against a mock server.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod search;
pub mod state;
pub mod telemetry;

pub use bot::{Bot, QUIT_REASON, StopReason};
pub use config::Config;
pub use error::BotError;
