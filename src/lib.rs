//! expectimax-2048: a 2048 game engine + sampled Expectimax policy
//!
//! This crate provides:
//! - An N×N `Board` with move resolution, random spawns and legality queries
//! - A heuristic evaluator with phase-adaptive or fixed feature weights
//! - An Expectimax AI (`expectimax` module) with adaptive chance-node sampling
//! - A `Game` lineage and a `Policy` trait for driving full games
//!
//! Quick start:
//! ```
//! use expectimax_2048::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut b = Board::new(4, &mut rng).unwrap();
//! let outcome = b.apply_move(Move::Left);
//! if outcome.changed {
//!     b.spawn_random_tile(&mut rng);
//! }
//! assert!(b.score() >= outcome.points);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use expectimax_2048::expectimax::{Expectimax, ExpectimaxConfig};
//! use expectimax_2048::game::Game;
//!
//! // 1) Policy and a seeded game
//! let mut policy = Expectimax::seeded(ExpectimaxConfig::default().with_depth(2), 123).unwrap();
//! let mut game = Game::seeded(4, 123).unwrap();
//!
//! // 2) Loop a couple of moves to demonstrate flow (keep doctests fast)
//! let summary = game.run(&mut policy, Some(4));
//!
//! // 3) Inspect final state (score, highest tile, etc.)
//! assert_eq!(summary.moves, 4);
//! assert!(policy.last_stats().nodes > 0);
//! ```
//!
pub mod engine;
pub mod error;
pub mod expectimax;
pub mod game;
pub mod policy;

pub use error::ConfigError;
