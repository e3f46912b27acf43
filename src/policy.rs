//! Move-selection policies.

use rand::Rng;

use crate::engine::{Board, Move};
use crate::expectimax::heuristic::{evaluate, Weights};
use crate::expectimax::Expectimax;

/// Anything that can pick a move for a board.
///
/// `None` means no direction changes the board and the game is over.
pub trait Policy {
    fn next_move(&mut self, board: &Board) -> Option<Move>;
}

impl<R: Rng> Policy for Expectimax<R> {
    #[inline]
    fn next_move(&mut self, board: &Board) -> Option<Move> { self.best_move(board) }
}

/// One-ply baseline: merge points plus the fixed-weight heuristic of the
/// resulting board. First direction wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy {
    weights: Option<Weights>,
}

impl Greedy {
    pub fn new() -> Self { Self::default() }

    pub fn with_weights(weights: Weights) -> Self { Self { weights: Some(weights) } }
}

impl Policy for Greedy {
    fn next_move(&mut self, board: &Board) -> Option<Move> {
        let weights = self.weights.unwrap_or(Weights::FIXED_DEFAULT);
        let mut best: Option<(Move, f64)> = None;
        for dir in Move::ALL {
            let (next, outcome) = board.shifted(dir);
            if !outcome.changed {
                continue;
            }
            let score = outcome.points as f64 + evaluate(&next, Some(&weights));
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((dir, score));
            }
        }
        best.map(|(dir, _)| dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_takes_the_merge() {
        let b = Board::from_rows(&[
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![256, 256, 0, 2],
        ])
        .unwrap();
        let only_points = Weights { empty_tiles: 0.0, monotonicity: 0.0, smoothness: 0.0, max_tile: 0.0, corner_bonus: 0.0 };
        let dir = Greedy::with_weights(only_points).next_move(&b);
        // Left and Right both merge for 512; Right comes first.
        assert_eq!(dir, Some(Move::Right));
    }

    #[test]
    fn greedy_reports_game_over() {
        let b = Board::from_rows(&[vec![2, 4], vec![4, 2]]).unwrap();
        assert_eq!(Greedy::new().next_move(&b), None);
    }
}
