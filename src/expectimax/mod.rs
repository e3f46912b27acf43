//! Expectimax search policy for 2048.
//!
//! Decision nodes take the best legal move; chance nodes average over tile
//! spawns (2 with probability 0.9, 4 with 0.1). Deep in the tree, chance
//! nodes with many empty cells sample a bounded subset of them instead of
//! enumerating every cell.
//!
//! Notes
//! - All randomness (chance-node sampling) comes from the RNG handed to
//!   [`Expectimax::with_config`], so seeded searches are reproducible.
//! - The search is single-threaded and blocks for the whole call; depth is the
//!   only knob controlling work.
//!
//! Quick start
//! ```
//! use expectimax_2048::engine::Board;
//! use expectimax_2048::expectimax::{Expectimax, ExpectimaxConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::new(4, &mut rng).unwrap();
//!
//! let cfg = ExpectimaxConfig::default().with_depth(2);
//! let mut ex = Expectimax::seeded(cfg, 7).unwrap();
//! let m = ex.best_move(&b0);
//! assert!(m.is_some());
//! assert!(ex.last_stats().nodes > 0);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::Move;
use crate::error::ConfigError;

pub mod heuristic;
mod search;

pub use heuristic::{EvalMode, Phase, Weights};
pub use search::Expectimax;

/// When chance nodes fall back to sampling a subset of empty cells.
///
/// Sampling kicks in when a chance node has more than `min_empty` empty cells
/// and fewer than `max_depth` plies of remaining depth; it then draws
/// `sample_size` distinct cells (or all of them, if fewer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub min_empty: usize,
    pub max_depth: u32,
    pub sample_size: usize,
}

impl SamplingConfig {
    /// Never sample; every chance node is an exact expectation.
    pub const EXACT: SamplingConfig = SamplingConfig { min_empty: usize::MAX, max_depth: 0, sample_size: 1 };

    #[inline]
    pub(crate) fn applies(&self, empty: usize, depth: u32) -> bool {
        empty > self.min_empty && depth < self.max_depth
    }
}

impl Default for SamplingConfig {
    fn default() -> Self { Self { min_empty: 6, max_depth: 2, sample_size: 4 } }
}

/// Configurable knobs for Expectimax.
///
/// - `depth`: plies searched from the root, counting the root move itself.
/// - `sampling`: chance-node branching control.
/// - `eval`: leaf weights, phase-adaptive unless pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectimaxConfig {
    pub depth: u32,
    pub sampling: SamplingConfig,
    pub eval: EvalMode,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self { depth: 4, sampling: SamplingConfig::default(), eval: EvalMode::PhaseAdaptive }
    }
}

impl ExpectimaxConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Pin the leaf weights, overriding the phase-adaptive defaults.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.eval = EvalMode::Fixed(weights);
        self
    }

    /// Reject configurations that cannot drive a search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth < 1 {
            return Err(ConfigError::InvalidDepth { depth: self.depth });
        }
        if self.sampling.sample_size == 0 {
            return Err(ConfigError::DegenerateSampling { sample_size: 0 });
        }
        Ok(())
    }
}

/// Per-branch expected value at the root.
///
/// - `ev` is the expected value for taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// Nodes visited by the last call.
    pub nodes: u64,
    /// Largest `nodes` seen since construction or the last reset.
    pub peak_nodes: u64,
    /// Wall time spent in the last call.
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn nodes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.nodes as f64 / secs } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ExpectimaxConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_depth_and_empty_samples() {
        let cfg = ExpectimaxConfig::default().with_depth(0);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidDepth { depth: 0 }));
        let cfg = ExpectimaxConfig::default()
            .with_sampling(SamplingConfig { sample_size: 0, ..SamplingConfig::default() });
        assert_eq!(cfg.validate(), Err(ConfigError::DegenerateSampling { sample_size: 0 }));
    }

    #[test]
    fn sampling_threshold() {
        let s = SamplingConfig::default();
        assert!(s.applies(7, 1));
        assert!(!s.applies(6, 1));
        assert!(!s.applies(10, 2));
        assert!(!SamplingConfig::EXACT.applies(15, 0));
    }

    #[test]
    fn config_reads_from_toml() {
        let cfg: ExpectimaxConfig = toml::from_str(
            r#"
            depth = 3

            [sampling]
            sample_size = 2

            [eval]
            mode = "fixed"
            empty_tiles = 1.0
            monotonicity = 2.0
            smoothness = 0.0
            max_tile = 1.0
            corner_bonus = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.depth, 3);
        assert_eq!(cfg.sampling, SamplingConfig { sample_size: 2, ..SamplingConfig::default() });
        assert_eq!(
            cfg.eval,
            EvalMode::Fixed(Weights { empty_tiles: 1.0, monotonicity: 2.0, smoothness: 0.0, max_tile: 1.0, corner_bonus: 0.0 })
        );
        let cfg: ExpectimaxConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ExpectimaxConfig::default());
    }
}
