//! A single game lineage: a board plus the random source that feeds it spawns.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::engine::{Board, Move, MoveOutcome, Score, Tile};
use crate::error::ConfigError;
use crate::policy::Policy;

/// Final numbers of a finished (or capped) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub score: Score,
    pub max_tile: Tile,
    pub moves: u32,
}

/// Real gameplay, as opposed to search-time clones.
///
/// Every changing move is followed by exactly one spawn drawn from the
/// game's own RNG, so a seeded game replays identically.
///
/// ```
/// use expectimax_2048::engine::Move;
/// use expectimax_2048::game::Game;
/// let mut a = Game::seeded(4, 42).unwrap();
/// let mut b = Game::seeded(4, 42).unwrap();
/// for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
///     a.play(dir);
///     b.play(dir);
/// }
/// assert_eq!(a.board(), b.board());
/// ```
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    board: Board,
    rng: R,
    moves: u32,
}

impl Game<StdRng> {
    pub fn seeded(size: usize, seed: u64) -> Result<Self, ConfigError> {
        Self::new(size, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Start a game on a `size`×`size` board with two random tiles.
    pub fn new(size: usize, mut rng: R) -> Result<Self, ConfigError> {
        let board = Board::new(size, &mut rng)?;
        Ok(Self { board, rng, moves: 0 })
    }

    /// Continue a lineage from an existing board.
    pub fn from_board(board: Board, rng: R) -> Self { Self { board, rng, moves: 0 } }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }

    /// Number of changing moves played so far.
    #[inline]
    pub fn moves(&self) -> u32 { self.moves }

    #[inline]
    pub fn is_over(&self) -> bool { self.board.is_terminal() }

    /// Apply `dir`; if anything moved, spawn one tile. No-op moves never spawn.
    pub fn play(&mut self, dir: Move) -> MoveOutcome {
        let outcome = self.board.apply_move(dir);
        if outcome.changed {
            let spawned = self.board.spawn_random_tile(&mut self.rng);
            debug_assert!(spawned, "a changing move always leaves an empty cell");
            self.moves += 1;
        }
        outcome
    }

    /// Play `policy` until it reports game over or `max_moves` is reached.
    ///
    /// Also stops if the policy picks a direction that changes nothing, since
    /// it would pick the same one again on the unchanged board.
    pub fn run<P: Policy + ?Sized>(&mut self, policy: &mut P, max_moves: Option<u32>) -> GameSummary {
        while max_moves.map_or(true, |cap| self.moves < cap) {
            let Some(dir) = policy.next_move(&self.board) else { break };
            let outcome = self.play(dir);
            if !outcome.changed {
                tracing::warn!(moves = self.moves, %dir, "policy chose a move that changes nothing");
                break;
            }
            tracing::trace!(moves = self.moves, %dir, points = outcome.points, score = self.board.score(), "played");
        }
        self.summary()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary { score: self.board.score(), max_tile: self.board.max_tile(), moves: self.moves }
    }

    pub fn into_board(self) -> Board { self.board }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectimax::{Expectimax, ExpectimaxConfig};
    use crate::policy::Greedy;

    fn is_valid(board: &Board) -> bool {
        board.cells().iter().all(|&v| v == 0 || (v >= 2 && v.is_power_of_two()))
    }

    #[test]
    fn new_game_has_two_tiles() {
        let g = Game::seeded(4, 1).unwrap();
        assert_eq!(g.board().empty_cell_count(), 14);
        assert_eq!(g.moves(), 0);
        assert!(Game::seeded(1, 1).is_err());
    }

    #[test]
    fn no_op_move_does_not_spawn() {
        let board = Board::from_rows(&[
            vec![2, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        let mut g = Game::from_board(board.clone(), StdRng::seed_from_u64(3));
        let out = g.play(Move::Left);
        assert!(!out.changed);
        assert_eq!(g.board(), &board);
        assert_eq!(g.moves(), 0);
        let out = g.play(Move::Right);
        assert!(out.changed);
        assert_eq!(g.board().empty_cell_count(), 14);
        assert_eq!(g.moves(), 1);
    }

    #[test]
    fn greedy_game_runs_to_completion() {
        let mut g = Game::seeded(4, 2024).unwrap();
        let mut last_score = 0;
        let mut policy = Greedy::new();
        while let Some(dir) = policy.next_move(g.board()) {
            g.play(dir);
            assert!(g.board().score() >= last_score);
            assert!(is_valid(g.board()));
            last_score = g.board().score();
        }
        assert!(g.is_over());
        assert!(g.summary().max_tile >= 16);
    }

    #[test]
    fn expectimax_game_respects_move_cap() {
        let mut g = Game::seeded(4, 5).unwrap();
        let mut ex = Expectimax::seeded(ExpectimaxConfig::default().with_depth(2), 5).unwrap();
        let summary = g.run(&mut ex, Some(25));
        assert_eq!(summary.moves, 25);
        assert_eq!(summary.score, g.board().score());
        assert!(is_valid(g.board()));
    }

    struct AlwaysLeft;

    impl Policy for AlwaysLeft {
        fn next_move(&mut self, _board: &Board) -> Option<Move> { Some(Move::Left) }
    }

    #[test]
    fn run_stops_on_a_move_that_changes_nothing() {
        let board = Board::from_rows(&[
            vec![2, 4, 0, 0],
            vec![8, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        let mut g = Game::from_board(board.clone(), StdRng::seed_from_u64(9));
        let summary = g.run(&mut AlwaysLeft, Some(10));
        assert_eq!(summary.moves, 0);
        assert_eq!(g.board(), &board);
        let summary = g.run(&mut AlwaysLeft, None);
        assert_eq!(summary.moves, 0);
    }

    #[test]
    fn seeded_runs_replay() {
        let play = || {
            let mut g = Game::seeded(4, 77).unwrap();
            let mut ex = Expectimax::seeded(ExpectimaxConfig::default().with_depth(2), 77).unwrap();
            g.run(&mut ex, Some(40));
            g.into_board()
        };
        assert_eq!(play(), play());
    }
}
