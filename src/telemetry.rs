//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`json` or anything else).
pub const LOG_FORMAT_ENV: &str = "GAMEBOT_LOG_FORMAT";

/// Install the global subscriber.
///
/// Filtering follows `RUST_LOG` (default `info`). Set `GAMEBOT_LOG_FORMAT=json`
/// for one JSON object per event.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering one server connection.
    pub fn session(host: &str, port: u16, nick: &str) -> Span {
        info_span!("session", host = %host, port = port, nick = %nick)
    }

    /// Span covering one dispatched user command.
    pub fn command(source: &str, target: &str) -> Span {
        info_span!("command", source = %source, target = %target)
    }

    /// Span covering one catalog search.
    pub fn search(target: &str, query: &str) -> Span {
        info_span!("search", target = %target, query = %query)
    }
}
