use thiserror::Error;

use crate::matching::similarity::{find_best_match, LABEL_MATCH_THRESHOLD};
use crate::platforms::kalshi::MarketKind;

// ── Supported series ────────────────────────────────────────────────────

#[derive(Debug)]
pub struct LeagueSeries {
    pub league: &'static str,
    /// Sport hint understood by the Polymarket matcher, when there is one.
    pub sport_hint: Option<&'static str>,
    pub moneyline: &'static str,
    pub spread: &'static str,
    pub total: &'static str,
}

impl LeagueSeries {
    pub fn ticker(&self, kind: MarketKind) -> &'static str {
        match kind {
            MarketKind::Moneyline => self.moneyline,
            MarketKind::Spread => self.spread,
            MarketKind::Total => self.total,
        }
    }
}

#[derive(Debug)]
pub struct SeriesCategory {
    pub name: &'static str,
    pub leagues: &'static [LeagueSeries],
}

pub static ALLOWED_SERIES: &[SeriesCategory] = &[
    SeriesCategory {
        name: "Football",
        leagues: &[
            LeagueSeries {
                league: "NFL",
                sport_hint: Some("NFL"),
                moneyline: "KXNFLGAME",
                spread: "KXNFLSPREAD",
                total: "KXNFLTOTAL",
            },
            LeagueSeries {
                league: "College Football",
                sport_hint: Some("Football"),
                moneyline: "KXNCAAFGAME",
                spread: "KXNCAAFSPREAD",
                total: "KXNCAAFTOTAL",
            },
        ],
    },
    SeriesCategory {
        name: "Basketball",
        leagues: &[
            LeagueSeries {
                league: "NBA",
                sport_hint: Some("NBA"),
                moneyline: "KXNBAGAME",
                spread: "KXNBASPREAD",
                total: "KXNBATOTAL",
            },
            LeagueSeries {
                league: "College (Men)",
                sport_hint: Some("Basketball"),
                moneyline: "KXNCAAMBGAME",
                spread: "KXNCAAMBSPREAD",
                total: "KXNCAAMBTOTAL",
            },
            LeagueSeries {
                league: "College (Women)",
                sport_hint: Some("Basketball"),
                moneyline: "KXNCAAWBGAME",
                spread: "KXNCAAWBSPREAD",
                total: "KXNCAAWBTOTAL",
            },
        ],
    },
    SeriesCategory {
        name: "Hockey",
        leagues: &[LeagueSeries {
            league: "NHL",
            sport_hint: None,
            moneyline: "KXNHLGAME",
            spread: "KXNHLSPREAD",
            total: "KXNHLTOTAL",
        }],
    },
];

/// Find the supported league and market kind a series ticker belongs to.
pub fn find_series(series_ticker: &str) -> Option<(&'static LeagueSeries, MarketKind)> {
    let wanted = series_ticker.trim().to_uppercase();
    ALLOWED_SERIES
        .iter()
        .flat_map(|cat| cat.leagues.iter())
        .find_map(|league| {
            MarketKind::ALL
                .into_iter()
                .find(|kind| league.ticker(*kind) == wanted)
                .map(|kind| (league, kind))
        })
}

// ── Full sports catalogue ───────────────────────────────────────────────

pub static HIERARCHY: &[(&str, &[(&str, &str)])] = &[
    (
        "Baseball",
        &[
            ("Pro Baseball Spread", "KXMLBSPREAD"),
            ("Pro Baseball Total Points", "KXMLBTOTAL"),
            ("Professional Baseball All-Star Game", "KXMLBASGAME"),
            ("Professional Baseball Game", "KXMLBGAME"),
            ("Professional Baseball Series Total Games", "KXMLBSERIESGAMETOTAL"),
        ],
    ),
    (
        "Basketball",
        &[
            ("Chinese Basketball Association Game", "KXCBAGAME"),
            ("College Basketball Game", "KXNCAABGAME"),
            ("College Basketball Women's Game", "KXNCAAWBGAME"),
            ("Eurocup Basketball Game", "KXEUROCUPGAME"),
            ("Euroleague Game", "KXEUROLEAGUEGAME"),
            ("MVE NBA Multi Game", "KXMVENBAMULTIGAMEEXTENDED"),
            ("MVE NBA Single Game", "KXMVENBASINGLEGAME"),
            ("Men's College Basketball Men's Game", "KXNCAAMBGAME"),
            ("Men's College Basketball Spread", "KXNCAAMBSPREAD"),
            ("Men's College Basketball Total Points", "KXNCAAMBTOTAL"),
            ("NBA All-Star game", "KXNBAALLSTAR"),
            ("NBL Basketball Game", "KXNBLGAME"),
            ("Pro Basketball Spread", "KXNBASPREAD"),
            ("Pro Basketball Total Points", "KXNBATOTAL"),
            ("Professional Basketball Game", "KXNBAGAME"),
            ("Professional Women's Basketball Game", "KXWNBAGAME"),
            ("WNBA All Star Game", "KXWNBAASGAME"),
            ("Women's College Basketball Spread", "KXNCAAWBSPREAD"),
            ("Women's College Basketball Total Points", "KXNCAAWBTOTAL"),
        ],
    ),
    (
        "Cricket",
        &[
            ("Cricket ODI Match", "KXCRICKETODIMATCH"),
            ("Cricket T20I Match", "KXCRICKETT20IMATCH"),
            ("Cricket Test Match", "KXCRICKETTESTMATCH"),
            ("Cricket Women ODI Match", "KXCRICKETWOMENODIMATCH"),
            ("Cricket Women T20I Match", "KXCRICKETWOMENT20IMATCH"),
            ("Cricket Women Test Match", "KXCRICKETWOMENTESTMATCH"),
            ("Indian Premier League Cricket Game", "KXIPLGAME"),
        ],
    ),
    (
        "Darts",
        &[
            ("Darts Match", "KXDARTSMATCH"),
        ],
    ),
    (
        "Esports",
        &[
            ("Call of Duty Games", "KXCODGAME"),
            ("Counter-Strike 2 Games", "KXCSGOGAME"),
            ("Cs2 Games", "KXCS2GAMES"),
            ("Dota 2 Game", "KXDOTA2GAME"),
            ("League of Legends Game", "KXLOLGAME"),
            ("League of Legends Games", "KXLOLGAMES"),
            ("League of Legends Total Maps Played", "KXLOLTOTAL"),
            ("R6 Game", "KXR6GAME"),
        ],
    ),
    (
        "Football",
        &[
            ("College Football FCS Game", "KXNCAAFCSGAME"),
            ("College Football Game", "KXNCAAFGAME"),
            ("College Football Spread", "KXNCAAFSPREAD"),
            ("College Football Total Points", "KXNCAAFTOTAL"),
            ("MVE NFL Multi Game", "KXMVENFLMULTIGAME"),
            ("MVE NFL Multi Game Extended", "KXMVENFLMULTIGAMEEXTENDED"),
            ("MVE NFL Single Game", "KXMVENFLSINGLEGAME"),
            ("NFL games times", "KXEVENTTIMES"),
            ("Pro Football Spread", "KXNFLSPREAD"),
            ("Pro Football Team Total Points", "KXNFLTEAMTOTAL"),
            ("Pro Football Total Points", "KXNFLTOTAL"),
            ("Professional Football Game", "KXNFLGAME"),
        ],
    ),
    (
        "Golf",
        &[
            ("PGA Ryder Cup Matchups", "KXPGARYDERMATCH"),
        ],
    ),
    (
        "Hockey",
        &[
            ("NHL Game", "KXNHLGAME"),
            ("NHL Goal Total", "KXNHLTOTAL"),
            ("NHL Spread", "KXNHLSPREAD"),
        ],
    ),
    (
        "Soccer",
        &[
            ("Argentina Primera Division Game", "KXARGPREMDIVGAME"),
            ("Australian A League Game", "KXALEAGUEGAME"),
            ("Belgian Pro League Game", "KXBELGIANPLGAME"),
            ("Brasileiro Serie A Game", "KXBRASILEIROGAME"),
            ("Bundesliga Game", "KXBUNDESLIGAGAME"),
            ("Bundesliga Spread", "KXBUNDESLIGASPREAD"),
            ("Bundesliga Total", "KXBUNDESLIGATOTAL"),
            ("Club World Club Game", "KXCLUBWCGAME"),
            ("Copa Del Rey Game", "KXCOPADELREYGAME"),
            ("Coppa Italia Game", "KXCOPPAITALIAGAME"),
            ("Croatia HNL Game", "KXHNLGAME"),
            ("DFB Pokal Game", "KXDFBPOKALGAME"),
            ("Danish Superliga Game", "KXDANISHSUPERLIGAGAME"),
            ("EFL Cup Game", "KXEFLCUPGAME"),
            ("English Premier League Game", "KXEPLGAME"),
            ("English Premier League Spread", "KXEPLSPREAD"),
            ("English Premier League Total Goals", "KXEPLTOTAL"),
            ("Eredivisie Game", "KXEREDIVISIEGAME"),
            ("Fifa Game", "KXFIFAGAME"),
            ("Japan J League Game", "KXJLEAGUEGAME"),
            ("Korea K League Game", "KXKLEAGUEGAME"),
            ("La Liga Game", "KXLALIGAGAME"),
            ("La Liga Spread", "KXLALIGASPREAD"),
            ("La Liga Total", "KXLALIGATOTAL"),
            ("Liga MX Game", "KXLIGAMXGAME"),
            ("Liga Portugal Game", "KXLIGAPORTUGALGAME"),
            ("Ligue 1 Game", "KXLIGUE1GAME"),
            ("Ligue 1 Spread", "KXLIGUE1SPREAD"),
            ("Ligue 1 Total", "KXLIGUE1TOTAL"),
            ("MLS Spread", "KXMLSSPREAD"),
            ("MLS Total", "KXMLSTOTAL"),
            ("Major League Soccer Game", "KXMLSGAME"),
            ("Polish Ekstraklasa Game", "KXEKSTRAKLASAGAME"),
            ("Saudi Pro League Game", "KXSAUDIPLGAME"),
            ("Scottish Premiership Game", "KXSCOTTISHPREMGAME"),
            ("Serie A Game", "KXSERIEAGAME"),
            ("Serie A Spread", "KXSERIEASPREAD"),
            ("Serie A Total", "KXSERIEATOTAL"),
            ("Soccer Goal Total", "KXSOCCERTOTAL"),
            ("Soccer Spread", "KXSOCCERSPREAD"),
            ("Swiss Super League Game", "KXSWISSLEAGUEGAME"),
            ("Taca de Portugal Game", "KXTACAPORTGAME"),
            ("Turkish Super Lig Game", "KXSUPERLIGGAME"),
            ("UEFA Conference League Game", "KXUECLGAME"),
            ("UEFA Europa League Game", "KXUELGAME"),
            ("UEFA Soccer Games", "KXUEFAGAME"),
        ],
    ),
];

/// Resolve a series title or ticker to a ticker.
///
/// Anything starting with "kx" is taken as a ticker already. Otherwise an
/// exact (case-insensitive) title or ticker match, then the closest title.
pub fn ticker_by_name(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    if q.starts_with("kx") {
        return Some(q.to_uppercase());
    }

    let entries = || HIERARCHY.iter().flat_map(|(_, series)| series.iter());

    if let Some((_, ticker)) = entries().find(|(name, ticker)| name.to_lowercase() == q || ticker.to_lowercase() == q) {
        return Some(ticker.to_string());
    }

    let names: Vec<&(&str, &str)> = entries().collect();
    find_best_match(&q, names.iter().map(|(name, _)| *name), LABEL_MATCH_THRESHOLD)
        .map(|(idx, _)| names[idx].1.to_string())
}

// ── Menu tree ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    ShowGames {
        league: &'static str,
        series_ticker: &'static str,
        kind: MarketKind,
    },
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Branch(Vec<MenuNode>),
    Leaf(MenuAction),
}

#[derive(Debug, Clone)]
pub struct MenuNode {
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Error, Debug, PartialEq)]
pub enum MenuError {
    #[error("No option '{choice}' under {at}. Options: {}", .options.join(", "))]
    UnknownChoice {
        at: String,
        choice: String,
        options: Vec<String>,
    },
    #[error("'{0}' is already a final choice")]
    PastLeaf(String),
}

impl MenuNode {
    fn branch(label: &str, children: Vec<MenuNode>) -> Self {
        Self {
            label: label.to_string(),
            kind: NodeKind::Branch(children),
        }
    }

    pub fn action(&self) -> Option<&MenuAction> {
        match &self.kind {
            NodeKind::Leaf(action) => Some(action),
            NodeKind::Branch(_) => None,
        }
    }

    /// Exact label (case-insensitive), else the closest label above the threshold.
    pub fn child(&self, choice: &str) -> Result<&MenuNode, MenuError> {
        let children = match &self.kind {
            NodeKind::Branch(children) => children,
            NodeKind::Leaf(_) => return Err(MenuError::PastLeaf(self.label.clone())),
        };

        let wanted = choice.trim().to_lowercase();
        if let Some(exact) = children.iter().find(|c| c.label.to_lowercase() == wanted) {
            return Ok(exact);
        }

        find_best_match(&wanted, children.iter().map(|c| c.label.as_str()), LABEL_MATCH_THRESHOLD)
            .map(|(idx, _)| &children[idx])
            .ok_or_else(|| MenuError::UnknownChoice {
                at: self.label.clone(),
                choice: choice.to_string(),
                options: children.iter().map(|c| c.label.clone()).collect(),
            })
    }

    /// Follow `path` from this node. Returns every node visited, this one first.
    pub fn walk<S: AsRef<str>>(&self, path: &[S]) -> Result<Vec<&MenuNode>, MenuError> {
        let mut trail = vec![self];
        let mut node = self;
        for step in path {
            node = node.child(step.as_ref())?;
            trail.push(node);
        }
        Ok(trail)
    }
}

/// Sports -> category -> league -> market type.
pub fn build_menu() -> MenuNode {
    let categories = ALLOWED_SERIES
        .iter()
        .map(|cat| {
            let leagues = cat
                .leagues
                .iter()
                .map(|league| {
                    let kinds = MarketKind::ALL
                        .into_iter()
                        .map(|kind| MenuNode {
                            label: kind.label().to_string(),
                            kind: NodeKind::Leaf(MenuAction::ShowGames {
                                league: league.league,
                                series_ticker: league.ticker(kind),
                                kind,
                            }),
                        })
                        .collect();
                    MenuNode::branch(league.league, kinds)
                })
                .collect();
            MenuNode::branch(cat.name, leagues)
        })
        .collect();

    MenuNode::branch("Sports", categories)
}
