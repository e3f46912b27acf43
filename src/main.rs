use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use expectimax_2048::engine::DEFAULT_SIZE;
use expectimax_2048::expectimax::{Expectimax, ExpectimaxConfig};
use expectimax_2048::game::Game;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Play one game of 2048 with the expectimax policy.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML file with an `ExpectimaxConfig`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Search depth (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,
    /// Board dimension
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,
    /// Seed for tile spawns and search sampling; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many moves
    #[arg(long)]
    max_moves: Option<u32>,
    /// Hide the progress spinner
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<ExpectimaxConfig>(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ExpectimaxConfig::default(),
    };
    if let Some(depth) = args.depth {
        cfg.depth = depth;
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, size = args.size, depth = cfg.depth, eval = ?cfg.eval, "starting game");

    let mut expectimax = Expectimax::with_config(cfg, StdRng::seed_from_u64(seed.wrapping_add(1)))?;
    let mut game = Game::new(args.size, StdRng::seed_from_u64(seed))?;
    tracing::debug!("initial board\n{}", game.board());

    let pb = (!args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Moves: {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let start = Instant::now();
    let mut total_states: u64 = 0;
    while args.max_moves.map_or(true, |cap| game.moves() < cap) {
        let Some(direction) = expectimax.best_move(game.board()) else { break };
        game.play(direction);
        let stats = expectimax.last_stats();
        total_states = total_states.saturating_add(stats.nodes);
        tracing::debug!(
            moves = game.moves(),
            %direction,
            nodes = stats.nodes,
            elapsed = ?stats.elapsed,
            "board after move\n{}",
            game.board()
        );
        if let Some(pb) = &pb {
            pb.set_message(format!(
                "{} | score: {} | max tile: {} | nodes/s: {:.0}",
                game.moves(),
                game.board().score(),
                game.board().max_tile(),
                stats.nodes_per_second()
            ));
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let summary = game.summary();
    println!("{}", game.board());
    tracing::info!(
        score = summary.score,
        max_tile = summary.max_tile,
        moves = summary.moves,
        game_over = game.is_over(),
        states = total_states,
        peak_states = expectimax.last_stats().peak_nodes,
        elapsed = ?start.elapsed(),
        "game finished"
    );
    Ok(())
}
