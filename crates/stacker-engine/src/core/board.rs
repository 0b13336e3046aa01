use serde::{Deserialize, Serialize};

use super::piece::{PieceKind, PieceRotation, PieceState};

/// Default number of columns.
pub const DEFAULT_COLS: usize = 10;
/// Default number of rows seen by the player.
pub const DEFAULT_VISIBLE_ROWS: usize = 20;
/// Default number of buffer rows above the visible playfield.
pub const DEFAULT_HIDDEN_ROWS: usize = 2;

/// Size of a board.
///
/// `total_rows = visible_rows + hidden_rows`. The hidden rows sit on top of
/// the visible playfield and act as a spawn/rotation buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoardDimensions {
    pub cols: usize,
    pub visible_rows: usize,
    pub hidden_rows: usize,
}

impl Default for BoardDimensions {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BoardDimensions {
    /// 10 columns, 20 visible rows, 2 hidden rows.
    pub const STANDARD: Self = Self {
        cols: DEFAULT_COLS,
        visible_rows: DEFAULT_VISIBLE_ROWS,
        hidden_rows: DEFAULT_HIDDEN_ROWS,
    };

    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.visible_rows + self.hidden_rows
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Occupied by something that is not a tetromino (garbage, test fill).
    Solid,
    /// Occupied by a locked piece of a specific type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }
}

/// One board row; always exactly `cols` cells long.
pub type Row = Vec<Block>;

/// The playfield grid, hidden buffer rows included.
///
/// Row 0 is the topmost hidden row and indices grow downward; the last
/// `visible_rows` rows are what the player sees. Operations that change the
/// board return a new `Board` and leave `self` alone.
///
/// # Example
///
/// ```
/// use stacker_engine::{Board, PieceKind, PieceRotation};
///
/// let board = Board::default();
/// assert_eq!(board.total_rows(), 22);
/// // Cells above row 0 never collide.
/// assert!(board.is_valid(PieceKind::I, PieceRotation::SPAWN, 3, -1));
/// // The floor does.
/// assert!(!board.is_valid(PieceKind::I, PieceRotation::SPAWN, 3, 21));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    dimensions: BoardDimensions,
    rows: Vec<Row>,
}

/// Unchecked wire form of a [`Board`].
#[derive(Deserialize)]
struct RawBoard {
    dimensions: BoardDimensions,
    rows: Vec<Row>,
}

/// A deserialized grid that does not match its declared dimensions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardShapeError {
    #[display("board declares {expected} rows but has {actual}")]
    RowCount { expected: usize, actual: usize },
    #[display("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardShapeError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let RawBoard { dimensions, rows } = raw;
        if rows.len() != dimensions.total_rows() {
            return Err(BoardShapeError::RowCount {
                expected: dimensions.total_rows(),
                actual: rows.len(),
            });
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != dimensions.cols)
        {
            return Err(BoardShapeError::RowWidth {
                row,
                expected: dimensions.cols,
                actual: cells.len(),
            });
        }
        Ok(Self { dimensions, rows })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardDimensions::STANDARD)
    }
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new(dimensions: BoardDimensions) -> Self {
        Self {
            dimensions,
            rows: vec![Self::empty_row(dimensions.cols); dimensions.total_rows()],
        }
    }

    pub(crate) fn empty_row(cols: usize) -> Row {
        vec![Block::Empty; cols]
    }

    /// Rebuilds a board from rows that already satisfy the width invariant.
    pub(crate) fn from_rows(dimensions: BoardDimensions, rows: Vec<Row>) -> Self {
        debug_assert_eq!(rows.len(), dimensions.total_rows());
        debug_assert!(rows.iter().all(|row| row.len() == dimensions.cols));
        Self { dimensions, rows }
    }

    #[must_use]
    pub fn dimensions(&self) -> BoardDimensions {
        self.dimensions
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.dimensions.cols
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// All rows from the top hidden row down to the floor.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The rows the player sees (the hidden buffer is skipped).
    #[must_use]
    pub fn visible_rows(&self) -> &[Row] {
        let hidden = self.total_rows() - self.dimensions.visible_rows;
        &self.rows[hidden..]
    }

    /// Returns the block at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Block> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    /// Writes a block; returns `false` when `(x, y)` is outside the grid.
    pub fn set(&mut self, x: i32, y: i32, block: Block) -> bool {
        let cell = usize::try_from(x).ok().zip(usize::try_from(y).ok()).and_then(|(x, y)| {
            self.rows.get_mut(y)?.get_mut(x)
        });
        match cell {
            Some(cell) => {
                *cell = block;
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `(x, y)` is inside the grid and not empty.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Block::is_occupied)
    }

    /// Returns `true` if every cell of row `y` is occupied.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|block| block.is_occupied()))
    }

    /// Checks whether a piece may occupy the given position.
    ///
    /// For each occupied matrix cell `(r, c)` the board cell is
    /// `(x + c, y + r)`:
    ///
    /// - a column outside `[0, cols)` is a side wall collision
    /// - a row at or past `total_rows` is a floor collision
    /// - a row above 0 is in the open spawn buffer and is skipped
    /// - otherwise the board cell must be empty
    ///
    /// A position whose cells fall outside the `i32` range is invalid.
    #[must_use]
    pub fn is_valid(&self, kind: PieceKind, rotation: PieceRotation, x: i32, y: i32) -> bool {
        kind.occupied_offsets(rotation).all(|(dx, dy)| {
            let (Some(bx), Some(by)) = (x.checked_add(dx), y.checked_add(dy)) else {
                return false;
            };
            let Ok(col) = usize::try_from(bx) else {
                return false;
            };
            if col >= self.cols() {
                return false;
            }
            let Ok(row) = usize::try_from(by) else {
                // Above the board.
                return true;
            };
            self.rows
                .get(row)
                .and_then(|cells| cells.get(col))
                .is_some_and(|cell| cell.is_empty())
        })
    }

    /// [`Self::is_valid`] for a whole [`PieceState`].
    #[must_use]
    pub fn fits(&self, piece: &PieceState) -> bool {
        self.is_valid(piece.kind(), piece.rotation(), piece.x(), piece.y())
    }

    /// [`Self::is_valid`] for untyped callers.
    ///
    /// An unknown piece name or a rotation index outside `0..=3` is reported
    /// as an invalid position rather than an error.
    #[must_use]
    pub fn is_valid_named(&self, name: &str, rotation: u8, x: i32, y: i32) -> bool {
        let (Some(kind), Some(rotation)) =
            (PieceKind::from_name(name), PieceRotation::from_index(rotation))
        else {
            return false;
        };
        self.is_valid(kind, rotation, x, y)
    }

    /// Returns a copy of the board with the piece's cells written in.
    ///
    /// Cells above row 0 are dropped; the caller decides whether locking a
    /// piece partly above the board ends the game.
    #[must_use]
    pub fn lock_piece(&self, piece: &PieceState) -> Self {
        let mut board = self.clone();
        for (x, y) in piece.occupied_cells() {
            board.set(x, y, Block::Piece(piece.kind()));
        }
        board
    }

    /// Creates a board from ASCII art for tests and fixtures.
    ///
    /// `#` is an occupied cell, `.` is empty, other characters are ignored.
    /// Rows are aligned to the bottom of the board, so a short picture
    /// describes the bottom of the stack.
    #[must_use]
    pub fn from_ascii(dimensions: BoardDimensions, art: &str) -> Self {
        let mut board = Self::new(dimensions);
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= dimensions.total_rows(),
            "Picture has {} rows, board has {}",
            lines.len(),
            dimensions.total_rows()
        );
        let top = dimensions.total_rows() - lines.len();

        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                dimensions.cols,
                "Each row must have exactly {} cells, got {} at row {}",
                dimensions.cols,
                chars.len(),
                i
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.rows[top + i][x] = Block::Solid;
                }
            }
        }
        board
    }
}
