//! Static board evaluation used at the search horizon.
//!
//! The score is a weighted sum of five features: empty space, monotonicity,
//! smoothness, max tile and a corner bonus. Weights either follow the game
//! phase (bucketed on empty-cell count) or are pinned by the caller.

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Tile};

/// Flat bonus when the highest tile sits in a corner.
pub const CORNER_BONUS: f64 = 20_000.0;

/// Feature weights for [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub empty_tiles: f64,
    pub monotonicity: f64,
    pub smoothness: f64,
    pub max_tile: f64,
    pub corner_bonus: f64,
}

impl Weights {
    /// Hand-tuned single vector, used by the greedy baseline.
    pub const FIXED_DEFAULT: Weights = Weights {
        empty_tiles: 10.0,
        monotonicity: 4.0,
        smoothness: 0.5,
        max_tile: 2.0,
        corner_bonus: 1.0,
    };

    pub fn for_phase(phase: Phase) -> Weights {
        match phase {
            Phase::Early => Weights { empty_tiles: 10.0, monotonicity: 1.0, ..Weights::FIXED_DEFAULT },
            Phase::Mid => Weights { empty_tiles: 20.0, monotonicity: 4.0, ..Weights::FIXED_DEFAULT },
            Phase::Late => Weights { empty_tiles: 40.0, monotonicity: 8.0, ..Weights::FIXED_DEFAULT },
        }
    }
}

impl Default for Weights {
    fn default() -> Self { Weights::FIXED_DEFAULT }
}

/// Game phase, bucketed on the share of empty cells.
///
/// On a 4×4 board: early is 8+ empty, mid 4..=7, late 3 or fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// At least half the board empty.
    Early,
    /// At least a quarter empty.
    Mid,
    Late,
}

impl Phase {
    pub fn of(board: &Board) -> Phase {
        let cells = board.cells().len();
        match board.empty_cell_count() {
            n if n * 2 >= cells => Phase::Early,
            n if n * 4 >= cells => Phase::Mid,
            _ => Phase::Late,
        }
    }
}

/// How leaf weights are chosen. Phase-adaptive is the default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvalMode {
    #[default]
    PhaseAdaptive,
    Fixed(Weights),
}

impl EvalMode {
    #[inline]
    pub fn weights_for(&self, board: &Board) -> Weights {
        match self {
            EvalMode::PhaseAdaptive => Weights::for_phase(Phase::of(board)),
            EvalMode::Fixed(w) => *w,
        }
    }

    #[inline]
    pub fn evaluate(&self, board: &Board) -> f64 { weighted_score(board, &self.weights_for(board)) }
}

/// Heuristic value of `board`; higher is better.
///
/// Explicit `weights` override the phase-adaptive defaults.
///
/// ```
/// use expectimax_2048::engine::Board;
/// use expectimax_2048::expectimax::heuristic::{evaluate, Weights};
/// let corner = Board::from_rows(&[
///     vec![64, 32, 16, 8],
///     vec![0, 0, 0, 4],
///     vec![0, 0, 0, 0],
///     vec![0, 0, 0, 0],
/// ]).unwrap();
/// let scattered = Board::from_rows(&[
///     vec![8, 0, 16, 0],
///     vec![0, 64, 0, 4],
///     vec![32, 0, 0, 0],
///     vec![0, 0, 0, 0],
/// ]).unwrap();
/// assert!(evaluate(&corner, None) > evaluate(&scattered, None));
/// let w = Weights::FIXED_DEFAULT;
/// assert!(evaluate(&corner, Some(&w)) > evaluate(&scattered, Some(&w)));
/// ```
pub fn evaluate(board: &Board, weights: Option<&Weights>) -> f64 {
    match weights {
        Some(w) => weighted_score(board, w),
        None => EvalMode::PhaseAdaptive.evaluate(board),
    }
}

fn weighted_score(board: &Board, w: &Weights) -> f64 {
    w.empty_tiles * empty_tiles(board)
        + w.monotonicity * monotonicity(board)
        + w.smoothness * smoothness(board)
        + w.max_tile * max_tile_score(board)
        + w.corner_bonus * corner_bonus(board)
}

#[inline]
fn log2(tile: Tile) -> f64 { tile.trailing_zeros() as f64 }

/// Squared count of empty cells.
pub fn empty_tiles(board: &Board) -> f64 {
    let empty = board.empty_cell_count() as f64;
    empty * empty
}

/// Best row ordering plus best column ordering, in log2 space.
pub fn monotonicity(board: &Board) -> f64 {
    let n = board.size();
    let (mut left, mut right, mut up, mut down) = (0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        for j in 0..n - 1 {
            let (a, b) = (board.get(i, j), board.get(i, j + 1));
            if a != 0 && b != 0 {
                let (la, lb) = (log2(a), log2(b));
                if la > lb { left += la - lb } else { right += lb - la }
            }
            let (a, b) = (board.get(j, i), board.get(j + 1, i));
            if a != 0 && b != 0 {
                let (la, lb) = (log2(a), log2(b));
                if la > lb { up += la - lb } else { down += lb - la }
            }
        }
    }
    f64::max(left, right) + f64::max(up, down)
}

/// Negative total log2 gap between occupied right/bottom neighbours.
pub fn smoothness(board: &Board) -> f64 {
    let n = board.size();
    let mut smooth = 0.0;
    for i in 0..n {
        for j in 0..n {
            let v = board.get(i, j);
            if v == 0 {
                continue;
            }
            if j + 1 < n && board.get(i, j + 1) != 0 {
                smooth -= (log2(v) - log2(board.get(i, j + 1))).abs();
            }
            if i + 1 < n && board.get(i + 1, j) != 0 {
                smooth -= (log2(v) - log2(board.get(i + 1, j))).abs();
            }
        }
    }
    smooth
}

pub fn max_tile_score(board: &Board) -> f64 {
    match board.max_tile() {
        0 => 0.0,
        t => log2(t),
    }
}

/// [`CORNER_BONUS`] if the highest tile occupies a corner. An empty board
/// has no highest tile and earns nothing.
pub fn corner_bonus(board: &Board) -> f64 {
    let max = board.max_tile();
    let last = board.size() - 1;
    let corners = [board.get(0, 0), board.get(0, last), board.get(last, 0), board.get(last, last)];
    if max != 0 && corners.contains(&max) { CORNER_BONUS } else { 0.0 }
}

/// Number of equal occupied neighbour pairs. Diagnostic only; not weighted.
pub fn merge_potential(board: &Board) -> usize {
    let n = board.size();
    let mut merges = 0;
    for i in 0..n {
        for j in 0..n {
            let v = board.get(i, j);
            if v == 0 {
                continue;
            }
            if j + 1 < n && board.get(i, j + 1) == v {
                merges += 1;
            }
            if i + 1 < n && board.get(i + 1, j) == v {
                merges += 1;
            }
        }
    }
    merges
}
