use serde_json::Value;
use thiserror::Error;

use crate::matching::extract_token_ids;
use crate::matching::similarity::{ratio, LABEL_MATCH_THRESHOLD};
use crate::matching::teams::nfl_nickname;
use crate::platforms::field_str;

#[derive(Error, Debug, PartialEq)]
pub enum MappingError {
    #[error("Polymarket event has {0} teams/outcomes, expected exactly 2")]
    NotTwoTeams(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerParts {
    pub series: String,
    pub date: String,
    pub matchup: String,
}

/// "KXNFL-25DEC-KCBAL" -> series / date / matchup.
pub fn parse_kalshi_ticker(ticker: &str) -> Option<TickerParts> {
    let mut parts = ticker.split('-');
    let series = parts.next()?;
    let date = parts.next()?;
    let matchup = parts.next()?;
    Some(TickerParts {
        series: series.to_string(),
        date: date.to_string(),
        matchup: matchup.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolyTeam {
    pub name: String,
    pub yes_token_id: Option<String>,
}

/// One team per Polymarket sub-market, named by `groupItemTitle` (or the question).
pub fn poly_teams(event: &Value) -> Vec<PolyTeam> {
    event
        .get("markets")
        .and_then(|v| v.as_array())
        .map(|markets| {
            markets
                .iter()
                .map(|m| PolyTeam {
                    name: field_str(m, "groupItemTitle")
                        .filter(|s| !s.is_empty())
                        .or_else(|| field_str(m, "question"))
                        .unwrap_or("")
                        .to_string(),
                    yes_token_id: extract_token_ids(m).0,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Kalshi team code is the last ticker segment: "...-KCBAL-KC" -> "KC".
fn team_code(ticker: &str) -> &str {
    ticker.rsplit('-').next().unwrap_or(ticker)
}

fn same_team(code: &str, team_name: &str) -> bool {
    let name = team_name.to_lowercase();
    if name.contains(&code.to_lowercase()) {
        return true;
    }
    match nfl_nickname(code) {
        Some(nick) => {
            let nick = nick.to_lowercase();
            name.contains(&nick) || ratio(&nick, &name) >= LABEL_MATCH_THRESHOLD
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbMapping {
    /// `<kalshi ticker>-yes|no` -> Polymarket yes token id, in Kalshi market order.
    pub entries: Vec<(String, String)>,
}

fn toml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl ArbMapping {
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn to_toml(&self, table: &str) -> String {
        let mut out = format!("[arbitrage.{}]\n", toml_string(table));
        for (k, v) in &self.entries {
            out.push_str(&format!("{} = {}\n", toml_string(k), toml_string(v)));
        }
        out
    }
}

/// Pair each Kalshi team market with the Polymarket team it names.
///
/// Buying YES on a Kalshi team is hedged by the OTHER team's Polymarket YES;
/// buying NO is hedged by the SAME team's Polymarket YES.
pub fn generate_arbitrage_mapping<S: AsRef<str>>(
    kalshi_tickers: &[S],
    poly_event: &Value,
) -> Result<ArbMapping, MappingError> {
    let teams = poly_teams(poly_event);
    if teams.len() != 2 {
        return Err(MappingError::NotTwoTeams(teams.len()));
    }

    let mut mapping = ArbMapping::default();
    for ticker in kalshi_tickers {
        let ticker = ticker.as_ref();
        let code = team_code(ticker);
        let Some(same) = teams.iter().find(|t| same_team(code, &t.name)) else {
            continue;
        };
        let Some(same_id) = same.yes_token_id.as_deref() else {
            continue;
        };
        let opposite = teams
            .iter()
            .filter_map(|t| t.yes_token_id.as_deref())
            .find(|id| *id != same_id);

        if let Some(opposite_id) = opposite {
            mapping.entries.push((format!("{}-yes", ticker), opposite_id.to_string()));
            mapping.entries.push((format!("{}-no", ticker), same_id.to_string()));
        }
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chiefs_ravens_event() -> Value {
        json!({
            "slug": "nfl-kc-bal-2025-12-15",
            "markets": [
                {"groupItemTitle": "Chiefs", "clobTokenIds": "[\"111\",\"112\"]"},
                {"groupItemTitle": "Ravens", "clobTokenIds": ["222", "223"]}
            ]
        })
    }

    #[test]
    fn ticker_parts() {
        let parts = parse_kalshi_ticker("KXNFL-25DEC-KCBAL").unwrap();
        assert_eq!(parts.series, "KXNFL");
        assert_eq!(parts.date, "25DEC");
        assert_eq!(parts.matchup, "KCBAL");
        assert!(parse_kalshi_ticker("KXNFL-25DEC").is_none());
        assert_eq!(parse_kalshi_ticker("A-B-C-D").unwrap().matchup, "C");
    }

    #[test]
    fn yes_maps_to_opposite_and_no_to_same() {
        let tickers = ["KXNFLGAME-25DEC15KCBAL-KC", "KXNFLGAME-25DEC15KCBAL-BAL"];
        let mapping = generate_arbitrage_mapping(&tickers, &chiefs_ravens_event()).unwrap();

        assert_eq!(mapping.entries.len(), 4);
        assert_eq!(mapping.get("KXNFLGAME-25DEC15KCBAL-KC-yes"), Some("222"));
        assert_eq!(mapping.get("KXNFLGAME-25DEC15KCBAL-KC-no"), Some("111"));
        assert_eq!(mapping.get("KXNFLGAME-25DEC15KCBAL-BAL-yes"), Some("111"));
        assert_eq!(mapping.get("KXNFLGAME-25DEC15KCBAL-BAL-no"), Some("222"));
    }

    #[test]
    fn code_contained_in_name_matches_without_table() {
        let event = json!({"markets": [
            {"question": "Will OKC win?", "clobTokenIds": ["1", "2"]},
            {"question": "Will DEN win?", "clobTokenIds": ["3", "4"]}
        ]});
        let mapping = generate_arbitrage_mapping(&["KXNBAGAME-X-OKC"], &event).unwrap();
        assert_eq!(mapping.get("KXNBAGAME-X-OKC-yes"), Some("3"));
        assert_eq!(mapping.get("KXNBAGAME-X-OKC-no"), Some("1"));
    }

    #[test]
    fn unknown_codes_are_skipped() {
        let mapping = generate_arbitrage_mapping(&["KXNFLGAME-X-ZZZ"], &chiefs_ravens_event()).unwrap();
        assert!(mapping.entries.is_empty());
    }

    #[test]
    fn event_must_have_two_teams() {
        let event = json!({"markets": [{"groupItemTitle": "Chiefs", "clobTokenIds": ["1", "2"]}]});
        assert_eq!(
            generate_arbitrage_mapping(&["KX-X-KC"], &event),
            Err(MappingError::NotTwoTeams(1))
        );
        assert_eq!(
            generate_arbitrage_mapping(&["KX-X-KC"], &json!({})),
            Err(MappingError::NotTwoTeams(0))
        );
    }

    #[test]
    fn toml_rendering_quotes_keys_and_values() {
        let mapping = ArbMapping {
            entries: vec![("KX-A-KC-yes".into(), "222".into())],
        };
        assert_eq!(
            mapping.to_toml("KX-A"),
            "[arbitrage.\"KX-A\"]\n\"KX-A-KC-yes\" = \"222\"\n"
        );
    }
}
