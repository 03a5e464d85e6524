//! Stub search gateway.

use async_trait::async_trait;
use gamebot::error::GatewayError;
use gamebot::search::{Filters, GameResult, SearchGateway};
use tokio::sync::Mutex;

/// Canned outcome returned by [`StubGateway`].
pub enum Canned {
    Games(Vec<GameResult>),
    Failure(u16),
}

/// Gateway returning a fixed answer and recording every request.
pub struct StubGateway {
    canned: Canned,
    requests: Mutex<Vec<(String, Filters)>>,
}

impl StubGateway {
    pub fn new(canned: Canned) -> Self {
        Self {
            canned,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Canned::Games(Vec::new()))
    }

    #[allow(dead_code)]
    pub async fn requests(&self) -> Vec<(String, Filters)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SearchGateway for StubGateway {
    async fn search(&self, query: &str, filters: &Filters) -> Result<Vec<GameResult>, GatewayError> {
        self.requests
            .lock()
            .await
            .push((query.to_string(), filters.clone()));
        match &self.canned {
            Canned::Games(games) => Ok(games.clone()),
            Canned::Failure(status) => Err(GatewayError::Status(*status)),
        }
    }
}

/// A well-known result for reply assertions.
#[allow(dead_code)]
pub fn ocarina() -> GameResult {
    GameResult {
        name: "The Legend of Zelda: Ocarina of Time".to_string(),
        rating: Some(91.6),
        release_date: Some(911_606_400),
        platforms: vec!["Nintendo 64".to_string(), "Wii".to_string()],
        url: Some("https://www.igdb.com/games/the-legend-of-zelda-ocarina-of-time".to_string()),
    }
}
