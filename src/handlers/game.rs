//! `!game` parsing and reply formatting.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::GatewayError;
use crate::search::{Filters, GameResult};

/// Reply for a `!game` with no search terms.
pub const GAME_USAGE: &str =
    "Usage: !game <search term> [--years YYYY-YYYY] [--platform platform1,platform2]";

/// Results shown per search.
pub const MAX_RESULTS_SHOWN: usize = 3;

/// Platform names shown per result.
pub const MAX_PLATFORMS_SHOWN: usize = 3;

/// A parsed `!game` request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameQuery {
    /// Search terms, single-spaced. Empty if none were given.
    pub query: String,
    pub filters: Filters,
}

fn filter_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?i)(?:^|\s+)--(years?|platform|p)\s+").expect("filter marker pattern is valid")
    })
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse everything after `!game`.
///
/// Text before the first `--year`/`--years`/`--platform`/`--p` marker is the
/// query. Marker values are comma separated; repeated markers accumulate.
pub fn parse_game_args(args: &str) -> GameQuery {
    let args = args.trim();
    let markers: Vec<_> = filter_marker().captures_iter(args).collect();

    let head_end = markers
        .first()
        .and_then(|c| c.get(0))
        .map_or(args.len(), |m| m.start());
    let query = args[..head_end].split_whitespace().collect::<Vec<_>>().join(" ");

    let mut filters = Filters::default();
    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value_end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(args.len(), |m| m.start());
        let values = split_values(&args[whole.end()..value_end]);

        match kind.as_str().to_ascii_lowercase().as_str() {
            "year" | "years" => filters.years.extend(values),
            _ => filters.platforms.extend(values),
        }
    }

    GameQuery { query, filters }
}

/// One numbered result line.
pub fn format_result(index: usize, game: &GameResult) -> String {
    let mut line = format!("{}. {}", index, game.name);
    if let Some(year) = game.release_year() {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(rating) = game.rating.filter(|r| *r > 0.0) {
        line.push_str(&format!(" | Rating: {:.1}/100", rating));
    }
    if !game.platforms.is_empty() {
        let shown: Vec<&str> = game
            .platforms
            .iter()
            .take(MAX_PLATFORMS_SHOWN)
            .map(String::as_str)
            .collect();
        line.push_str(&format!(" | Platforms: {}", shown.join(", ")));
    }
    if let Some(url) = &game.url {
        line.push_str(&format!(" | {}", url));
    }
    line
}

/// The full reply batch for a finished search.
pub fn format_reply(query: &str, outcome: &Result<Vec<GameResult>, GatewayError>) -> Vec<String> {
    match outcome {
        Err(e) => vec![format!("Search failed: {}", e)],
        Ok(games) if games.is_empty() => vec![format!("No games found for '{}'", query)],
        Ok(games) => {
            let mut lines = Vec::with_capacity(MAX_RESULTS_SHOWN + 1);
            lines.push(format!("Found {} game(s) for '{}':", games.len(), query));
            lines.extend(
                games
                    .iter()
                    .take(MAX_RESULTS_SHOWN)
                    .enumerate()
                    .map(|(i, game)| format_result(i + 1, game)),
            );
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::YearRange;
    use chrono::NaiveDate;

    #[test]
    fn test_plain_query_is_whitespace_normalized() {
        let parsed = parse_game_args("  super   mario\tbros ");
        assert_eq!(parsed.query, "super mario bros");
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn test_year_range_filter() {
        let parsed = parse_game_args(" zelda --years 1998-2000");
        assert_eq!(parsed.query, "zelda");
        assert_eq!(parsed.filters.years, vec!["1998-2000"]);

        let range = YearRange::parse(&parsed.filters.years[0]).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(1998, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
    }

    #[test]
    fn test_platform_filter() {
        let parsed = parse_game_args(" mario --platform NES,SNES");
        assert_eq!(parsed.query, "mario");
        assert_eq!(parsed.filters.platforms, vec!["NES", "SNES"]);
        assert!(parsed.filters.years.is_empty());
    }

    #[test]
    fn test_markers_are_case_insensitive_and_accumulate() {
        let parsed =
            parse_game_args(" final fantasy --YEAR 1997 --p PlayStation , PC --Years 2001,, 2002");
        assert_eq!(parsed.query, "final fantasy");
        assert_eq!(parsed.filters.years, vec!["1997", "2001", "2002"]);
        assert_eq!(parsed.filters.platforms, vec!["PlayStation", "PC"]);
    }

    #[test]
    fn test_marker_without_value_stays_in_query() {
        let parsed = parse_game_args(" doom --years");
        assert_eq!(parsed.query, "doom --years");
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn test_filters_only_gives_empty_query() {
        let parsed = parse_game_args(" --platform PC");
        assert!(parsed.query.is_empty());
        assert_eq!(parsed.filters.platforms, vec!["PC"]);
    }

    fn ocarina() -> GameResult {
        GameResult {
            name: "The Legend of Zelda: Ocarina of Time".into(),
            rating: Some(91.64),
            release_date: Some(911_606_400),
            platforms: vec![
                "Nintendo 64".into(),
                "Wii".into(),
                "Wii U".into(),
                "iQue Player".into(),
            ],
            url: Some("https://www.igdb.com/games/the-legend-of-zelda-ocarina-of-time".into()),
        }
    }

    #[test]
    fn test_format_full_result() {
        assert_eq!(
            format_result(1, &ocarina()),
            "1. The Legend of Zelda: Ocarina of Time (1998) | Rating: 91.6/100 | \
             Platforms: Nintendo 64, Wii, Wii U | \
             https://www.igdb.com/games/the-legend-of-zelda-ocarina-of-time"
        );
    }

    #[test]
    fn test_format_omits_missing_segments() {
        let game = GameResult {
            name: "Obscure Homebrew".into(),
            rating: Some(0.0),
            ..GameResult::default()
        };
        assert_eq!(format_result(2, &game), "2. Obscure Homebrew");
    }

    #[test]
    fn test_reply_caps_results() {
        let games = vec![ocarina(); 5];
        let lines = format_reply("zelda", &Ok(games));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Found 5 game(s) for 'zelda':");
        assert!(lines[3].starts_with("3. "));
    }

    #[test]
    fn test_reply_no_results_and_errors() {
        assert_eq!(
            format_reply("qwzx", &Ok(vec![])),
            vec!["No games found for 'qwzx'"]
        );
        assert_eq!(
            format_reply("zelda", &Err(GatewayError::NotConfigured)),
            vec!["Search failed: IGDB API credentials not configured"]
        );
        assert_eq!(
            format_reply("zelda", &Err(GatewayError::Status(429))),
            vec!["Search failed: API error: 429"]
        );
    }
}
