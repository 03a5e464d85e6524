//! Game search gateway.
//!
//! The dispatcher only sees the [`SearchGateway`] trait. The production
//! implementation is [`IgdbGateway`]; tests substitute their own.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::error::GatewayError;

pub mod credentials;
pub mod igdb;

pub use credentials::Credentials;
pub use igdb::IgdbGateway;

/// Optional narrowing of a search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    /// Raw year values: `1998` or `1998-2000`. Malformed values are skipped
    /// when the query is built.
    pub years: Vec<String>,
    /// Platform names, matched exactly by the catalog.
    pub platforms: Vec<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.platforms.is_empty()
    }

    /// The well-formed year ranges, in order.
    pub fn year_ranges(&self) -> Vec<YearRange> {
        self.years.iter().filter_map(|y| YearRange::parse(y)).collect()
    }
}

/// Inclusive date range covering whole years.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl YearRange {
    /// Parse `YYYY` (one year) or `YYYY-YYYY`. Returns `None` if malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (first, last) = match value.split_once('-') {
            Some((a, b)) => (parse_year(a)?, parse_year(b)?),
            None => {
                let year = parse_year(value)?;
                (year, year)
            }
        };
        if first > last {
            return None;
        }
        Some(Self {
            start: NaiveDate::from_ymd_opt(first, 1, 1)?,
            end: NaiveDate::from_ymd_opt(last, 12, 31)?,
        })
    }

    /// Unix timestamp of the first second of the range.
    pub fn start_timestamp(&self) -> i64 {
        self.start.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// Unix timestamp of the last second of the range.
    pub fn end_timestamp(&self) -> i64 {
        self.end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// One catalog hit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameResult {
    pub name: String,
    /// Aggregate rating, 0-100.
    pub rating: Option<f64>,
    /// First release date as a Unix timestamp.
    pub release_date: Option<i64>,
    pub platforms: Vec<String>,
    pub url: Option<String>,
}

impl GameResult {
    /// Calendar year of the first release.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.year())
    }
}

/// A source of game search results.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, query: &str, filters: &Filters) -> Result<Vec<GameResult>, GatewayError>;
}

/// Gateway used when no IGDB credentials are configured.
#[derive(Debug, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl SearchGateway for UnconfiguredGateway {
    async fn search(&self, _query: &str, _filters: &Filters) -> Result<Vec<GameResult>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

/// Minimal one-shot HTTP responder for gateway tests.
#[cfg(test)]
pub(crate) mod test_http {
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// A captured request: request line, headers (lowercased names) and body.
    #[derive(Debug)]
    pub struct Captured {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl Captured {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Serve `responses` (status, body) in order, one per connection.
    /// Returns the base URL and a receiver of captured requests.
    pub async fn serve(responses: Vec<(u16, String)>) -> (String, mpsc::UnboundedReceiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).await.unwrap();
                let mut headers = Vec::new();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((k, v)) = line.split_once(':') {
                        headers.push((k.trim().to_ascii_lowercase(), v.trim().to_string()));
                    }
                }
                let len: usize = headers
                    .iter()
                    .find(|(k, _)| k == "content-length")
                    .and_then(|(_, v)| v.parse().ok())
                    .unwrap_or(0);
                let mut req_body = vec![0u8; len];
                reader.read_exact(&mut req_body).await.unwrap();

                let _ = tx.send(Captured {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8_lossy(&req_body).into_owned(),
                });

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        (format!("http://{}", addr), rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_span() {
        let range = YearRange::parse("1998-2000").unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(1998, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
        assert_eq!(range.start_timestamp(), 883_612_800);
        assert_eq!(range.end_timestamp(), 978_307_199);
    }

    #[test]
    fn test_bare_year_is_whole_year() {
        let range = YearRange::parse("1991").unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(1991, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(1991, 12, 31).unwrap());
    }

    #[test]
    fn test_malformed_years_skipped() {
        for bad in ["", "98", "199x", "2000-1998", "1998-", "1998-2000-2002", "abcd-efgh"] {
            assert!(YearRange::parse(bad).is_none(), "{bad:?} should be rejected");
        }

        let filters = Filters {
            years: vec!["nineties".into(), "1995".into()],
            platforms: vec![],
        };
        assert_eq!(filters.year_ranges().len(), 1);
    }

    #[test]
    fn test_release_year_from_timestamp() {
        let game = GameResult {
            name: "The Legend of Zelda: Ocarina of Time".into(),
            release_date: Some(911_606_400),
            ..GameResult::default()
        };
        assert_eq!(game.release_year(), Some(1998));
        assert_eq!(GameResult::default().release_year(), None);
    }

    #[tokio::test]
    async fn test_unconfigured_gateway() {
        let err = UnconfiguredGateway
            .search("zelda", &Filters::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "IGDB API credentials not configured");
    }
}
