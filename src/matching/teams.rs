// Kalshi names teams by city (with a trailing letter when a city has two
// teams); Polymarket titles use nicknames.

static NFL_TEAMS: &[(&str, &str)] = &[
    ("arizona", "cardinals"),
    ("atlanta", "falcons"),
    ("baltimore", "ravens"),
    ("buffalo", "bills"),
    ("carolina", "panthers"),
    ("chicago", "bears"),
    ("cincinnati", "bengals"),
    ("cleveland", "browns"),
    ("dallas", "cowboys"),
    ("denver", "broncos"),
    ("detroit", "lions"),
    ("green bay", "packers"),
    ("houston", "texans"),
    ("indianapolis", "colts"),
    ("jacksonville", "jaguars"),
    ("kansas city", "chiefs"),
    ("las vegas", "raiders"),
    ("los angeles c", "chargers"),
    ("los angeles r", "rams"),
    ("miami", "dolphins"),
    ("minnesota", "vikings"),
    ("new england", "patriots"),
    ("new orleans", "saints"),
    ("new york g", "giants"),
    ("new york j", "jets"),
    ("philadelphia", "eagles"),
    ("pittsburgh", "steelers"),
    ("san francisco", "49ers"),
    ("seattle", "seahawks"),
    ("tampa bay", "buccaneers"),
    ("tennessee", "titans"),
    ("washington", "commanders"),
];

static NBA_TEAMS: &[(&str, &str)] = &[
    ("atlanta", "hawks"),
    ("boston", "celtics"),
    ("brooklyn", "nets"),
    ("charlotte", "hornets"),
    ("chicago", "bulls"),
    ("cleveland", "cavaliers"),
    ("dallas", "mavericks"),
    ("denver", "nuggets"),
    ("detroit", "pistons"),
    ("golden state", "warriors"),
    ("houston", "rockets"),
    ("indiana", "pacers"),
    ("los angeles c", "clippers"),
    ("lac", "clippers"),
    ("los angeles l", "lakers"),
    ("lal", "lakers"),
    ("memphis", "grizzlies"),
    ("miami", "heat"),
    ("milwaukee", "bucks"),
    ("minnesota", "timberwolves"),
    ("new orleans", "pelicans"),
    ("new york", "knicks"),
    ("oklahoma city", "thunder"),
    ("orlando", "magic"),
    ("philadelphia", "76ers"),
    ("phoenix", "suns"),
    ("portland", "trail blazers"),
    ("sacramento", "kings"),
    ("san antonio", "spurs"),
    ("toronto", "raptors"),
    ("utah", "jazz"),
    ("washington", "wizards"),
];

/// Kalshi NFL ticker suffix code -> nickname.
static NFL_CODES: &[(&str, &str)] = &[
    ("KC", "Chiefs"),
    ("BAL", "Ravens"),
    ("BUF", "Bills"),
    ("NYJ", "Jets"),
    ("SEA", "Seahawks"),
    ("LAR", "Rams"),
    ("LAC", "Chargers"),
    ("SF", "49ers"),
    ("PHI", "Eagles"),
    ("DAL", "Cowboys"),
    ("NYG", "Giants"),
    ("WAS", "Commanders"),
    ("CHI", "Bears"),
    ("DET", "Lions"),
    ("GB", "Packers"),
    ("MIN", "Vikings"),
    ("ATL", "Falcons"),
    ("CAR", "Panthers"),
    ("NO", "Saints"),
    ("TB", "Buccaneers"),
    ("ARI", "Cardinals"),
    ("HOU", "Texans"),
    ("IND", "Colts"),
    ("JAX", "Jaguars"),
    ("TEN", "Titans"),
    ("DEN", "Broncos"),
    ("LV", "Raiders"),
    ("MIA", "Dolphins"),
    ("NE", "Patriots"),
    ("PIT", "Steelers"),
    ("CIN", "Bengals"),
    ("CLE", "Browns"),
];

/// Polymarket tag ids for the sport hints we know about.
static SPORT_TAGS: &[(&str, u32)] = &[
    ("NFL", 450),
    ("NBA", 745),
    ("MLB", 2217),
    ("FOOTBALL", 10),
    ("BASKETBALL", 28),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum League {
    Nfl,
    Nba,
}

impl League {
    pub fn from_sport(sport: &str) -> Option<Self> {
        match sport.trim().to_uppercase().as_str() {
            "NFL" => Some(League::Nfl),
            "NBA" => Some(League::Nba),
            _ => None,
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            League::Nfl => NFL_TEAMS,
            League::Nba => NBA_TEAMS,
        }
    }

    /// Translate a lower-cased Kalshi team name; unknown names pass through.
    pub fn normalize<'a>(&self, name: &'a str) -> &'a str {
        self.table()
            .iter()
            .find(|(city, _)| *city == name)
            .map(|(_, nick)| *nick)
            .unwrap_or(name)
    }
}

pub fn sport_tag(sport: &str) -> Option<u32> {
    let sport = sport.trim().to_uppercase();
    SPORT_TAGS.iter().find(|(name, _)| *name == sport).map(|(_, tag)| *tag)
}

pub fn nfl_nickname(code: &str) -> Option<&'static str> {
    let code = code.to_uppercase();
    NFL_CODES.iter().find(|(c, _)| *c == code).map(|(_, nick)| *nick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfl_cities_become_nicknames() {
        assert_eq!(League::Nfl.normalize("kansas city"), "chiefs");
        assert_eq!(League::Nfl.normalize("los angeles r"), "rams");
        assert_eq!(League::Nfl.normalize("new york j"), "jets");
    }

    #[test]
    fn nba_table_includes_abbreviations() {
        assert_eq!(League::Nba.normalize("lal"), "lakers");
        assert_eq!(League::Nba.normalize("portland"), "trail blazers");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(League::Nfl.normalize("springfield"), "springfield");
        assert_eq!(League::Nba.normalize("kansas city"), "kansas city");
    }

    #[test]
    fn league_from_sport_hint() {
        assert_eq!(League::from_sport("nfl"), Some(League::Nfl));
        assert_eq!(League::from_sport(" NBA "), Some(League::Nba));
        assert_eq!(League::from_sport("NHL"), None);
    }

    #[test]
    fn sport_tags_are_case_insensitive() {
        assert_eq!(sport_tag("NFL"), Some(450));
        assert_eq!(sport_tag("nba"), Some(745));
        assert_eq!(sport_tag("Football"), Some(10));
        assert_eq!(sport_tag("cricket"), None);
    }

    #[test]
    fn nfl_codes_resolve_nicknames() {
        assert_eq!(nfl_nickname("KC"), Some("Chiefs"));
        assert_eq!(nfl_nickname("lar"), Some("Rams"));
        assert_eq!(nfl_nickname("XYZ"), None);
    }
}
