use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use crate::engine::{Board, Move};
use crate::error::ConfigError;

use super::{BranchEval, ExpectimaxConfig, SearchStats};

/// Probability that a spawned tile is a 2.
const SPAWN_TWO: f64 = 0.9;
/// Probability that a spawned tile is a 4.
const SPAWN_FOUR: f64 = 0.1;

enum Node { Max, Chance }

/// Single-threaded Expectimax search.
///
/// The configuration is validated once at construction, so a live
/// `Expectimax` never fails mid-search. `R` drives chance-node sampling.
pub struct Expectimax<R = StdRng> {
    cfg: ExpectimaxConfig,
    rng: R,
    stats: SearchStats,
}

impl Expectimax<StdRng> {
    /// Default configuration, sampling RNG seeded from OS entropy.
    pub fn new() -> Self {
        Self { cfg: ExpectimaxConfig::default(), rng: StdRng::from_entropy(), stats: SearchStats::default() }
    }

    /// Validated search with a seeded `StdRng` for sampling.
    pub fn seeded(cfg: ExpectimaxConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_config(cfg, StdRng::seed_from_u64(seed))
    }
}

impl Default for Expectimax<StdRng> { fn default() -> Self { Self::new() } }

impl<R: Rng> Expectimax<R> {
    pub fn with_config(cfg: ExpectimaxConfig, rng: R) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg, rng, stats: SearchStats::default() })
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Back-compat shim.
    ///
    /// Equivalent to [`Self::best_move`].
    #[inline]
    pub fn get_next_move(&mut self, board: &Board) -> Option<Move> { self.best_move(board) }

    /// Compute the best move using expectimax.
    ///
    /// Returns `None` when no direction changes the board: the game is over.
    /// Ties go to the earliest direction in [`Move::ALL`].
    ///
    /// Example
    /// ```
    /// use expectimax_2048::engine::{Board, Move};
    /// use expectimax_2048::expectimax::{Expectimax, ExpectimaxConfig};
    /// let b = Board::from_rows(&[
    ///     vec![2, 4, 8, 16],
    ///     vec![4, 8, 16, 32],
    ///     vec![0, 0, 0, 0],
    ///     vec![0, 0, 0, 0],
    /// ]).unwrap();
    /// let mut ex = Expectimax::seeded(ExpectimaxConfig::default().with_depth(2), 1).unwrap();
    /// assert_eq!(ex.best_move(&b), Some(Move::Down));
    /// ```
    pub fn best_move(&mut self, board: &Board) -> Option<Move> {
        let branches = self.branch_evals(board);
        let mut best: Option<BranchEval> = None;
        for branch in branches.into_iter().filter(|b| b.legal) {
            if best.map_or(true, |b| branch.ev > b.ev) {
                best = Some(branch);
            }
        }
        match best {
            Some(b) => tracing::debug!(
                dir = %b.dir,
                ev = b.ev,
                depth = self.cfg.depth,
                nodes = self.stats.nodes,
                elapsed = ?self.stats.elapsed,
                "expectimax chose move"
            ),
            None => tracing::debug!("expectimax found no legal move"),
        }
        best.map(|b| b.dir)
    }

    /// Compute EV for each direction (no normalization).
    ///
    /// Returns a fixed array in [`Move::ALL`] order and marks illegal moves
    /// as `legal=false`. Each legal root move is a chance node searched at
    /// `depth - 1`.
    pub fn branch_evals(&mut self, board: &Board) -> [BranchEval; 4] {
        let start = Instant::now();
        let mut state_count = 0u64;
        let depth = self.cfg.depth - 1;
        let out = Move::ALL.map(|dir| {
            let (next, outcome) = board.shifted(dir);
            if !outcome.changed {
                return BranchEval { dir, ev: 0.0, legal: false };
            }
            let ev = self.expectimax(&next, Node::Chance, depth, &mut state_count);
            tracing::trace!(%dir, ev, "root branch");
            BranchEval { dir, ev, legal: true }
        });
        self.record(state_count, start);
        out
    }

    /// EV at root, equivalent to the best branch EV.
    ///
    /// Falls back to the static evaluation on a terminal board.
    pub fn state_value(&mut self, board: &Board) -> f64 {
        let branches = self.branch_evals(board);
        branches
            .iter()
            .filter(|branch| branch.legal)
            .map(|branch| branch.ev)
            .reduce(f64::max)
            .unwrap_or_else(|| self.cfg.eval.evaluate(board))
    }

    /// Statistics collected from the last call to [`best_move`],
    /// [`branch_evals`] or [`state_value`].
    ///
    /// [`best_move`]: Self::best_move
    /// [`branch_evals`]: Self::branch_evals
    /// [`state_value`]: Self::state_value
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn record(&mut self, state_count: u64, start: Instant) {
        self.stats.nodes = state_count;
        self.stats.peak_nodes = self.stats.peak_nodes.max(state_count);
        self.stats.elapsed = start.elapsed();
    }

    fn expectimax(&mut self, board: &Board, node: Node, depth: u32, state_count: &mut u64) -> f64 {
        *state_count += 1;
        if depth == 0 {
            return self.cfg.eval.evaluate(board);
        }
        match node {
            Node::Max => self.evaluate_max(board, depth, state_count),
            Node::Chance => self.evaluate_chance(board, depth, state_count),
        }
    }

    fn evaluate_max(&mut self, board: &Board, depth: u32, state_count: &mut u64) -> f64 {
        let mut best_score: Option<f64> = None;
        for direction in Move::ALL {
            let (next, outcome) = board.shifted(direction);
            if !outcome.changed {
                continue;
            }
            let score = self.expectimax(&next, Node::Chance, depth - 1, state_count);
            best_score = Some(best_score.map_or(score, |best| best.max(score)));
        }
        // No legal move: terminal, score it as it stands.
        best_score.unwrap_or_else(|| self.cfg.eval.evaluate(board))
    }

    fn evaluate_chance(&mut self, board: &Board, depth: u32, state_count: &mut u64) -> f64 {
        let empty = board.empty_cells();
        if empty.is_empty() || board.is_terminal() {
            return self.cfg.eval.evaluate(board);
        }
        let cells: Vec<(usize, usize)> = if self.cfg.sampling.applies(empty.len(), depth) {
            let amount = self.cfg.sampling.sample_size.min(empty.len());
            index::sample(&mut self.rng, empty.len(), amount).into_iter().map(|i| empty[i]).collect()
        } else {
            empty
        };
        let mut score = 0.0;
        for &(row, col) in &cells {
            let mut with_two = board.clone();
            with_two.set(row, col, 2);
            let v2 = self.expectimax(&with_two, Node::Max, depth - 1, state_count);
            let mut with_four = board.clone();
            with_four.set(row, col, 4);
            let v4 = self.expectimax(&with_four, Node::Max, depth - 1, state_count);
            score += SPAWN_TWO * v2 + SPAWN_FOUR * v4;
        }
        score / cells.len() as f64
    }
}
