//! IGDB v4 search gateway.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Credentials, Filters, GameResult, SearchGateway};
use crate::config::IgdbConfig;
use crate::error::GatewayError;

/// IGDB games endpoint.
pub const IGDB_GAMES_URL: &str = "https://api.igdb.com/v4/games";

/// Results requested per search.
const RESULT_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct IgdbGame {
    name: Option<String>,
    first_release_date: Option<i64>,
    #[serde(default)]
    platforms: Vec<IgdbPlatform>,
    rating: Option<f64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IgdbPlatform {
    name: Option<String>,
}

impl From<IgdbGame> for GameResult {
    fn from(game: IgdbGame) -> Self {
        GameResult {
            name: game.name.unwrap_or_else(|| "Unknown".to_string()),
            rating: game.rating,
            release_date: game.first_release_date,
            platforms: game
                .platforms
                .into_iter()
                .filter_map(|p| p.name)
                .filter(|n| !n.is_empty())
                .collect(),
            url: game.url.filter(|u| !u.is_empty()),
        }
    }
}

/// Quote a value for an apicalypse string literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Build the apicalypse request body for a search.
///
/// Year ranges are OR-ed together; the platform clause is AND-ed with them.
pub fn build_query(query: &str, filters: &Filters) -> String {
    let mut clauses = Vec::new();

    let years: Vec<String> = filters
        .year_ranges()
        .iter()
        .map(|r| {
            format!(
                "(first_release_date >= {} & first_release_date <= {})",
                r.start_timestamp(),
                r.end_timestamp()
            )
        })
        .collect();
    if !years.is_empty() {
        clauses.push(if years.len() == 1 {
            years[0].clone()
        } else {
            format!("({})", years.join(" | "))
        });
    }

    if !filters.platforms.is_empty() {
        let names: Vec<String> = filters.platforms.iter().map(|p| quote(p)).collect();
        clauses.push(format!("platforms.name = ({})", names.join(",")));
    }

    let mut body = format!(
        "search {}; fields name,first_release_date,platforms.name,rating,url;",
        quote(query)
    );
    if !clauses.is_empty() {
        body.push_str(&format!(" where {};", clauses.join(" & ")));
    }
    body.push_str(&format!(" limit {};", RESULT_LIMIT));
    body
}

/// Search gateway backed by the IGDB API.
pub struct IgdbGateway {
    http: reqwest::Client,
    client_id: String,
    credentials: Option<Credentials>,
    endpoint: String,
}

impl IgdbGateway {
    /// Build a gateway from config. Searches fail with `NotConfigured` when
    /// no usable credentials are present.
    pub fn from_config(config: &IgdbConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("irc-gamebot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let credentials = Credentials::from_config(config, http.clone());
        Ok(Self::new(http, config.client_id.clone(), credentials))
    }

    pub fn new(http: reqwest::Client, client_id: String, credentials: Option<Credentials>) -> Self {
        Self {
            http,
            client_id,
            credentials,
            endpoint: IGDB_GAMES_URL.to_string(),
        }
    }

    /// Override the games endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn post(&self, token: &str, body: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Client-ID", &self.client_id)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body.to_string())
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl SearchGateway for IgdbGateway {
    async fn search(&self, query: &str, filters: &Filters) -> Result<Vec<GameResult>, GatewayError> {
        let credentials = self.credentials.as_ref().ok_or(GatewayError::NotConfigured)?;
        let body = build_query(query, filters);
        debug!(body = %body, "IGDB query");

        let mut response = self.post(&credentials.token().await?, &body).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED && credentials.invalidate().await {
            debug!("IGDB rejected the cached token, refreshing");
            response = self.post(&credentials.token().await?, &body).await?;
        }

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), query = %query, "IGDB search failed");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                credentials.invalidate().await;
            }
            return Err(GatewayError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let games: Vec<IgdbGame> =
            serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))?;
        debug!(query = %query, hits = games.len(), "IGDB search complete");
        Ok(games.into_iter().map(GameResult::from).collect())
    }
}
