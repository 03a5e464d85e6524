//! IGDB bearer tokens.
//!
//! IGDB authenticates through Twitch. A configured static token is used as
//! is; otherwise a client-credentials grant is performed on first use and the
//! token is cached until shortly before it expires.

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::IgdbConfig;
use crate::error::GatewayError;

/// Twitch OAuth token endpoint.
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the grant response omits `expires_in`.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Client-credentials grant with a cached result.
#[derive(Debug)]
pub struct ClientCredentials {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            token_url: TWITCH_TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    async fn token(&self) -> Result<String, GatewayError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch(&self) -> Result<CachedToken, GatewayError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Credentials(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(GatewayError::Credentials(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Credentials(e.to_string()))?;
        let value = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Credentials("no access_token in response".to_string()))?;

        let lifetime = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME);
        info!(expires_in = lifetime.as_secs(), "Obtained IGDB access token");

        Ok(CachedToken {
            value,
            expires_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

/// Where the bearer token comes from.
#[derive(Debug)]
pub enum Credentials {
    /// Pre-issued token from the config file.
    Static(String),
    /// Obtained (and refreshed) through the client-credentials grant.
    Grant(ClientCredentials),
}

impl Credentials {
    /// Pick a credential source from the config. `None` if nothing usable is set.
    pub fn from_config(config: &IgdbConfig, http: reqwest::Client) -> Option<Self> {
        if !config.has_credentials() {
            return None;
        }
        if !config.access_token.is_empty() {
            Some(Self::Static(config.access_token.clone()))
        } else {
            Some(Self::Grant(ClientCredentials::new(
                http,
                config.client_id.clone(),
                config.client_secret.clone(),
            )))
        }
    }

    /// Current bearer token.
    pub async fn token(&self) -> Result<String, GatewayError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Grant(grant) => grant.token().await,
        }
    }

    /// Drop a token the API rejected. Returns true if a fresh one can be fetched.
    pub async fn invalidate(&self) -> bool {
        match self {
            Self::Static(_) => false,
            Self::Grant(grant) => {
                grant.invalidate().await;
                true
            }
        }
    }
}
