use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use common::GameId;
use reqwest::Url;

use crate::prelude::*;

const HANDOFF_FILE_NAME: &str = "trilha-handoff.json";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Game page URL. Every request is posted back to it.
    #[arg(long, env = "TRILHA_PAGE_URL")]
    pub page_url: String,
    /// Identifier of the game, as embedded in the game page.
    #[arg(long, env = "TRILHA_GAME_ID", default_value = "")]
    pub game_id: String,
    /// Value of the `csrftoken` cookie.
    #[arg(long, env = "TRILHA_CSRF_TOKEN")]
    pub csrf_token: Option<String>,
    /// Where the one-shot position/score handoff is kept.
    #[arg(long, env = "TRILHA_HANDOFF_FILE")]
    pub handoff_file: Option<PathBuf>,
    /// Seed for the die, for reproducible games.
    #[arg(long)]
    pub seed: Option<u64>,
    /// How long pending cancel notifications may take on shutdown.
    #[arg(long, default_value_t = 2000)]
    pub beacon_grace_ms: u64,
    /// Requests taking longer than this fail like any other network error.
    #[arg(long, env = "TRILHA_REQUEST_TIMEOUT_MS", default_value_t = 10000)]
    pub request_timeout_ms: u64,
}

/// Pacing of the board. Defaults match the web board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub step: Duration,
    pub celebration: Duration,
    pub modal: Duration,
    pub trivia_reveal: Duration,
    pub arrival_reveal: Duration,
    pub finalize: Duration,
    pub countdown_tick: Duration,
    pub trivia_result: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(320),
            celebration: Duration::from_millis(700),
            modal: Duration::from_millis(3000),
            trivia_reveal: Duration::from_millis(500),
            arrival_reveal: Duration::from_millis(800),
            finalize: Duration::from_millis(5000),
            countdown_tick: Duration::from_millis(1000),
            trivia_result: Duration::from_millis(5000),
        }
    }
}

impl Timings {
    /// Whole countdown ticks shown on the arrival modal before finalizing.
    pub fn arrival_countdown(&self) -> u32 {
        let tick = self.countdown_tick.as_millis().max(1);
        u32::try_from(self.finalize.as_millis() / tick).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub page_url: Url,
    pub game: Option<GameId>,
    pub csrf_token: Option<String>,
    pub handoff_path: PathBuf,
    pub seed: Option<u64>,
    pub beacon_grace: Duration,
    pub request_timeout: Duration,
    pub timings: Timings,
}

impl Config {
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let page_url = Url::parse(&args.page_url)
            .with_context(|| format!("Invalid game page url {}", args.page_url))?;

        let game = GameId::parse(&args.game_id);
        if game.is_none() {
            warn!("No valid game id given ({:?})", args.game_id);
        }

        let handoff_path = args
            .handoff_file
            .unwrap_or_else(|| std::env::temp_dir().join(HANDOFF_FILE_NAME));

        Ok(Self {
            page_url,
            game,
            csrf_token: args.csrf_token.filter(|token| !token.is_empty()),
            handoff_path,
            seed: args.seed,
            beacon_grace: Duration::from_millis(args.beacon_grace_ms),
            request_timeout: Duration::from_millis(args.request_timeout_ms.max(1)),
            timings: Timings::default(),
        })
    }

    /// Resolves a server supplied redirect against the game page.
    pub fn resolve(&self, target: &str) -> Url {
        self.page_url.join(target).unwrap_or_else(|e| {
            warn!("Could not resolve redirect {target}: {e}");
            self.page_url.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["trilha", "--page-url", "http://localhost:8000/tabuleiro/7/"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_web_board() {
        let timings = Timings::default();
        assert_eq!(timings.step, Duration::from_millis(320));
        assert_eq!(timings.arrival_countdown(), 5);
    }

    #[test]
    fn requests_time_out_by_default() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));

        let config = Config::from_args(args(&["--request-timeout-ms", "0"])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(1));
    }

    #[test]
    fn placeholder_game_id_is_dropped() {
        let config = Config::from_args(args(&["--game-id", "None"])).unwrap();
        assert_eq!(config.game, None);

        let config = Config::from_args(args(&["--game-id", "7", "--csrf-token", ""])).unwrap();
        assert_eq!(config.game.map(|g| g.id), Some("7".to_string()));
        assert_eq!(config.csrf_token, None);
    }

    #[test]
    fn redirects_resolve_against_page() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config.resolve("/").as_str(), "http://localhost:8000/");
        assert_eq!(
            config.resolve("/tabuleiro/").as_str(),
            "http://localhost:8000/tabuleiro/"
        );
    }

    #[test]
    fn bad_page_url_is_an_error() {
        let args = Args::parse_from(["trilha", "--page-url", "not a url"]);
        assert!(Config::from_args(args).is_err());
    }
}
