//! Interactive chess rules engine: reads moves and commands from stdin and
//! reports results to stdout. Logs go to stderr.

use std::io;

use anyhow::Context;
use clap::Parser;
use rookery::chess::game::Game;
use rookery::chess::replay::Replay;
use rookery::Engine;
use tracing_subscriber::EnvFilter;

/// Validates and applies chess moves given in algebraic notation or as
/// start and end squares.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Log filter used when `RUST_LOG` is not set, e.g. "debug" or
    /// "rookery::chess=trace".
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Start from this position (FEN) instead of the initial one.
    #[arg(long)]
    fen: Option<String>,
    /// Whitespace-separated moves to apply before reading the input.
    #[arg(long)]
    replay: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    rookery::print_engine_info();
    rookery::print_binary_info();

    let mut game = match &config.fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("can not start from {fen}"))?,
        None => Game::new(),
    };
    if let Some(movetext) = &config.replay {
        let applied = Replay::from_movetext(movetext)
            .run(&mut game)
            .context("can not replay moves")?;
        tracing::info!(moves = applied.len(), "replayed moves");
    }

    let mut engine = Engine::with_game(game, io::stdin().lock(), io::stdout().lock());
    engine.run()
}
