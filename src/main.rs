mod alerts;
mod auth;
mod commands;
mod config;
mod games;
mod hierarchy;
mod mapping;
mod matching;
mod platforms;
mod ws;

use clap::{Parser, Subcommand};
use colored::*;

use platforms::kalshi::MarketKind;

#[derive(Parser)]
#[command(name = "kalshi-relay")]
#[command(about = "Relay Kalshi account and market data to the terminal or a Discord channel, cross-referenced with Polymarket", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Kalshi credentials and the Discord webhook
    Setup,
    /// Show current configuration
    Status,
    /// Show the Kalshi account balance
    Balance {
        /// Also post to the configured Discord webhook
        #[arg(long)]
        post: bool,
    },
    /// List open Kalshi positions (up to 10)
    Positions {
        #[arg(long)]
        post: bool,
    },
    /// List recent Kalshi fills
    Fills {
        /// Number of fills to fetch
        #[arg(short, long, default_value = "10")]
        limit: u32,
        #[arg(long)]
        post: bool,
    },
    /// Browse sports -> league -> market type; at a market type, show upcoming games
    Browse {
        /// Menu path, e.g. Football NFL Moneyline
        path: Vec<String>,
        #[arg(long)]
        post: bool,
    },
    /// Resolve a series by title or ticker and list its open events
    Series {
        /// Series title (e.g. "Pro Football Spread") or ticker
        query: String,
        /// Show upcoming games with quotes for one market type (moneyline, spread, total)
        #[arg(short, long, value_parser = parse_market_kind)]
        kind: Option<MarketKind>,
        #[arg(long)]
        post: bool,
    },
    /// Find the Polymarket counterpart of a Kalshi event title
    Match {
        /// Event title, e.g. "Kansas City at Baltimore"
        title: String,
        /// Sport hint (NFL, NBA, MLB, Football, Basketball)
        #[arg(short, long)]
        sport: Option<String>,
        #[arg(long)]
        post: bool,
    },
    /// Match every open event of a Kalshi series against Polymarket
    MatchSeries {
        /// Series ticker, e.g. KXNFLGAME
        series: String,
        #[arg(short, long)]
        sport: Option<String>,
        #[arg(long)]
        post: bool,
    },
    /// Print the Kalshi -> Polymarket hedge token mapping for one game
    Map {
        /// Kalshi event ticker, e.g. KXNFLGAME-25DEC15KCBAL
        kalshi_event: String,
        /// Polymarket event slug
        poly_slug: String,
    },
    /// Stream order fills as they happen
    Stream,
}

fn parse_market_kind(s: &str) -> Result<MarketKind, String> {
    MarketKind::parse(s).ok_or_else(|| format!("unknown market type '{}' (moneyline, spread, total)", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("kalshi_relay=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Setup = cli.command {
        return commands::setup::setup_config().await;
    }
    if let Commands::Status = cli.command {
        return commands::status::show_status().await;
    }

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{} Could not load configuration: {}", "[ERROR]".red(), e);
            println!("Run 'kalshi-relay setup' to create one.");
            return Ok(());
        }
    };

    match cli.command {
        Commands::Setup | Commands::Status => {}
        Commands::Balance { post } => commands::portfolio::show_balance(&config, post).await?,
        Commands::Positions { post } => commands::portfolio::show_positions(&config, post).await?,
        Commands::Fills { limit, post } => commands::portfolio::show_fills(&config, limit, post).await?,
        Commands::Browse { path, post } => commands::browse::browse(&config, &path, post).await?,
        Commands::Series { query, kind, post } => {
            commands::browse::lookup_series(&config, &query, kind, post).await?
        }
        Commands::Match { title, sport, post } => {
            commands::arb::match_title(&config, &title, sport.as_deref(), post).await?
        }
        Commands::MatchSeries { series, sport, post } => {
            commands::arb::match_series(&config, &series, sport.as_deref(), post).await?
        }
        Commands::Map {
            kalshi_event,
            poly_slug,
        } => commands::arb::map_event(&config, &kalshi_event, &poly_slug).await?,
        Commands::Stream => commands::stream::stream_fills(&config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_kind_accepts_market_type_names() {
        let cli = Cli::try_parse_from(["kalshi-relay", "series", "KXNFLGAME", "--kind", "spreads"]).unwrap();
        match cli.command {
            Commands::Series { query, kind, post } => {
                assert_eq!(query, "KXNFLGAME");
                assert_eq!(kind, Some(MarketKind::Spread));
                assert!(!post);
            }
            _ => panic!("expected series command"),
        }
    }

    #[test]
    fn series_kind_rejects_unknown_market_type() {
        assert!(Cli::try_parse_from(["kalshi-relay", "series", "KXNFLGAME", "--kind", "props"]).is_err());
    }
}
