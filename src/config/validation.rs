//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::state::is_valid_channel;
use gamebot_proto::NickExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    MissingHost,
    #[error("server.port must be non-zero")]
    InvalidPort,
    #[error("bot.nick is not a valid nickname: '{0}'")]
    InvalidNick(String),
    #[error("bot.alt_nick is not a valid nickname: '{0}'")]
    InvalidAltNick(String),
    #[error("bot.owner is required")]
    MissingOwner,
    #[error("bot.channels contains an invalid channel name: '{0}'")]
    InvalidChannel(String),
    #[error("igdb.max_concurrent must be at least 1")]
    InvalidMaxConcurrent,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let bot = &config.bot;
    if !bot.nick.is_valid_nick() {
        errors.push(ValidationError::InvalidNick(bot.nick.clone()));
    }
    if let Some(ref alt) = bot.alt_nick {
        if !alt.is_valid_nick() {
            errors.push(ValidationError::InvalidAltNick(alt.clone()));
        }
    }
    if bot.owner.trim().is_empty() {
        errors.push(ValidationError::MissingOwner);
    }

    for channel in &bot.channels {
        if !is_valid_channel(channel) {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    if config.igdb.max_concurrent == 0 {
        errors.push(ValidationError::InvalidMaxConcurrent);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
