//! simulate - play one match between two random agents
//!
//! Settings come from an optional TOML file, then `DUEL_*` environment
//! overrides, then command-line flags. Set `RUST_LOG` to control log
//! output (e.g. `RUST_LOG=duel_rules=debug`).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use duel_rules::agent::{Agent, RandomAgent};
use duel_rules::catalog::mono_deck;
use duel_rules::core::{Color, MatchConfig};
use duel_rules::run_match;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Play one match between two random agents")]
struct Args {
    /// Match configuration file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Seed for shuffling and for both agents
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns
    #[arg(long)]
    turn_limit: Option<u32>,

    /// Deck color of the first seat (W, U, B, R or G)
    #[arg(long, default_value = "R", value_parser = parse_color)]
    first: Color,

    /// Deck color of the second seat
    #[arg(long, default_value = "G", value_parser = parse_color)]
    second: Color,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
}

fn parse_color(arg: &str) -> Result<Color, String> {
    let mut chars = arg.chars();
    let symbol = chars.next().map(|c| c.to_ascii_uppercase());
    match (symbol, chars.next()) {
        (Some(symbol), None) => Color::ALL
            .into_iter()
            .find(|c| c.symbol() == symbol)
            .ok_or_else(|| format!("unknown color {arg:?}")),
        _ => Err(format!("expected one mana symbol, got {arg:?}")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => MatchConfig::default().apply_env_overrides(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(limit) = args.turn_limit {
        config = config.with_turn_limit(Some(limit));
    }
    config.validate()?;

    info!(seed = config.seed, first = ?args.first, second = ?args.second, "starting match");
    let agents: [Box<dyn Agent>; 2] = [
        Box::new(RandomAgent::new(config.seed.wrapping_add(1))),
        Box::new(RandomAgent::new(config.seed.wrapping_add(2))),
    ];
    let decks = [mono_deck(args.first), mono_deck(args.second)];

    let outcome = run_match(config, decks, agents).map_err(|aborted| anyhow!("{aborted}"))?;
    match outcome.winner {
        Some(winner) => println!("{winner} wins by {} on turn {}", outcome.reason, outcome.turns),
        None => println!("draw ({}) on turn {}", outcome.reason, outcome.turns),
    }
    println!("{} transitions logged", outcome.log.len());
    Ok(())
}
