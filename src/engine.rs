use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
}

impl Move {
    /// Canonical enumeration order used by legal-move queries and tie breaking.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Position of this direction in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Right => 1,
            Move::Down => 2,
            Move::Left => 3,
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = ConfigError;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        Move::ALL
            .get(idx as usize)
            .copied()
            .ok_or(ConfigError::InvalidDirection(idx))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Right => "right",
            Move::Down => "down",
            Move::Left => "left",
        };
        f.write_str(name)
    }
}

pub type Tile = u32;
pub type Score = u64;

/// Default board dimension.
pub const DEFAULT_SIZE: usize = 4;

/// Largest tile a `Tile` can hold. Two of these never merge.
pub const MAX_TILE: Tile = 1 << (Tile::BITS - 1);

/// Result of sliding the board in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// True iff at least one cell differs from the board before the move.
    pub changed: bool,
    /// Sum of the tiles produced by merges during this move.
    pub points: Score,
}

/// An N×N 2048 board plus the score accumulated along its lineage.
///
/// Cells are stored row-major; 0 is empty, anything else is a power of two
/// of at least 2. `Clone` is a deep copy, so a cloned board can be moved
/// freely without the original observing it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
    score: Score,
}

impl Board {
    /// An all-empty board of dimension `size`.
    pub fn empty(size: usize) -> Result<Self, ConfigError> {
        if size < 2 {
            return Err(ConfigError::InvalidBoardSize { size });
        }
        Ok(Board { size, cells: vec![0; size * size], score: 0 })
    }

    /// A fresh game board: empty grid plus two random tiles drawn from `rng`.
    ///
    /// ```
    /// use expectimax_2048::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let b = Board::new(4, &mut rng).unwrap();
    /// assert_eq!(b.empty_cell_count(), 14);
    /// assert_eq!(b.score(), 0);
    /// ```
    pub fn new<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, ConfigError> {
        let mut board = Board::empty(size)?;
        board.spawn_random_tile(rng);
        board.spawn_random_tile(rng);
        Ok(board)
    }

    /// Build a board from explicit rows. The score starts at 0.
    ///
    /// ```
    /// use expectimax_2048::engine::{Board, Move};
    /// let mut b = Board::from_rows(&[
    ///     vec![2, 2, 2, 2],
    ///     vec![0, 0, 0, 0],
    ///     vec![0, 0, 0, 0],
    ///     vec![0, 0, 0, 0],
    /// ]).unwrap();
    /// let out = b.apply_move(Move::Left);
    /// assert_eq!(out.points, 8);
    /// assert_eq!(b.row(0), &[4, 4, 0, 0]);
    /// ```
    pub fn from_rows(rows: &[Vec<Tile>]) -> Result<Self, ConfigError> {
        let size = rows.len();
        if size < 2 || rows.iter().any(|r| r.len() != size) {
            return Err(ConfigError::InvalidBoardSize { size });
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(ConfigError::InvalidTile { value, row, col });
                }
                cells.push(value);
            }
        }
        Ok(Board { size, cells, score: 0 })
    }

    /// Replace the lineage score.
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn score(&self) -> Score { self.score }

    /// Row-major view of every cell.
    #[inline]
    pub fn cells(&self) -> &[Tile] { &self.cells }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile { self.cells[row * self.size + col] }

    /// Set one cell. Panics if `value` is neither 0 nor a power of two ≥ 2.
    pub fn set(&mut self, row: usize, col: usize, value: Tile) {
        assert!(is_valid_tile(value), "tile {value} violates the power-of-two invariant");
        self.cells[row * self.size + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Tile] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ { self.cells.chunks(self.size) }

    /// Highest tile value on the board (0 when empty).
    pub fn max_tile(&self) -> Tile { self.cells.iter().copied().max().unwrap_or(0) }

    pub fn empty_cell_count(&self) -> usize { self.cells.iter().filter(|&&v| v == 0).count() }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    /// Independent deep copy.
    #[inline]
    pub fn clone_state(&self) -> Board { self.clone() }

    /// Insert a 2 (90%) or 4 (10%) into a uniformly chosen empty cell.
    ///
    /// Returns false and leaves the board alone when it is full.
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let empty: Vec<usize> = (0..self.cells.len()).filter(|&i| self.cells[i] == 0).collect();
        if empty.is_empty() {
            return false;
        }
        let idx = empty[rng.gen_range(0..empty.len())];
        self.cells[idx] = generate_random_tile(rng);
        true
    }

    /// Slide and merge every line toward `dir`, in place.
    ///
    /// The score grows by the merged points only if the grid changed.
    pub fn apply_move(&mut self, dir: Move) -> MoveOutcome {
        let before = self.cells.clone();
        let points = match dir {
            Move::Left => self.slide_rows_left(),
            Move::Right => {
                self.reverse_rows();
                let points = self.slide_rows_left();
                self.reverse_rows();
                points
            }
            Move::Up => {
                self.transpose();
                let points = self.slide_rows_left();
                self.transpose();
                points
            }
            Move::Down => {
                self.transpose();
                self.reverse_rows();
                let points = self.slide_rows_left();
                self.reverse_rows();
                self.transpose();
                points
            }
        };
        let changed = self.cells != before;
        if changed {
            self.score += points;
        }
        MoveOutcome { changed, points }
    }

    /// Like [`Board::apply_move`] but on a copy; `self` is untouched.
    pub fn shifted(&self, dir: Move) -> (Board, MoveOutcome) {
        let mut next = self.clone();
        let outcome = next.apply_move(dir);
        (next, outcome)
    }

    /// True if sliding toward `dir` would change at least one cell.
    pub fn can_move(&self, dir: Move) -> bool {
        (0..self.size).any(|line| {
            let idx: Vec<usize> = self.line_indices(dir, line).collect();
            idx.windows(2).any(|w| {
                let (lead, next) = (self.cells[w[0]], self.cells[w[1]]);
                (lead == 0 && next != 0) || (lead != 0 && lead == next && lead < MAX_TILE)
            })
        })
    }

    /// Directions that change the board, in [`Move::ALL`] order.
    pub fn legal_moves(&self) -> Vec<Move> {
        Move::ALL.into_iter().filter(|&dir| self.can_move(dir)).collect()
    }

    /// True iff no direction changes the board.
    pub fn is_terminal(&self) -> bool { !Move::ALL.into_iter().any(|dir| self.can_move(dir)) }

    // Cells of one line ordered from the edge tiles slide toward.
    fn line_indices(&self, dir: Move, line: usize) -> impl Iterator<Item = usize> {
        let n = self.size;
        (0..n).map(move |k| match dir {
            Move::Left => line * n + k,
            Move::Right => line * n + (n - 1 - k),
            Move::Up => k * n + line,
            Move::Down => (n - 1 - k) * n + line,
        })
    }

    fn slide_rows_left(&mut self) -> Score {
        self.cells.chunks_mut(self.size).map(slide_line_left).sum()
    }

    fn reverse_rows(&mut self) {
        for row in self.cells.chunks_mut(self.size) {
            row.reverse();
        }
    }

    fn transpose(&mut self) {
        let n = self.size;
        for r in 0..n {
            for c in (r + 1)..n {
                self.cells.swap(r * n + c, c * n + r);
            }
        }
    }
}

#[inline]
fn is_valid_tile(value: Tile) -> bool { value == 0 || (value >= 2 && value.is_power_of_two()) }

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

/// Compress non-zero tiles toward index 0, merging equal neighbours once.
///
/// A pair of [`MAX_TILE`]s stays unmerged. Works in place: the write
/// cursor never passes the read cursor, and a merged tile is never merged
/// again in the same slide.
fn slide_line_left(line: &mut [Tile]) -> Score {
    let mut points = 0;
    let mut write = 0;
    let mut pending: Option<Tile> = None;
    for read in 0..line.len() {
        let value = line[read];
        if value == 0 {
            continue;
        }
        debug_assert!(is_valid_tile(value), "tile {value} violates the power-of-two invariant");
        line[read] = 0;
        match pending {
            Some(held) if held == value && held < MAX_TILE => {
                line[write] = held * 2;
                points += Score::from(held * 2);
                write += 1;
                pending = None;
            }
            Some(held) => {
                line[write] = held;
                write += 1;
                pending = Some(value);
            }
            None => pending = Some(value),
        }
    }
    if let Some(held) = pending {
        line[write] = held;
    }
    points
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("score", &self.score)
            .field("rows", &self.rows().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.size * 8 + 1);
        writeln!(f, "Score: {}", self.score)?;
        writeln!(f, "{rule}")?;
        for row in self.rows() {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "       |")?;
                } else {
                    write!(f, "{val:^7}|")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "{rule}")
    }
}
