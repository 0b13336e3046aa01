use std::borrow::Cow;

use crate::core::{Board, Row};

/// Result of [`clear_lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear<'a> {
    /// Indices of the rows that were full, top to bottom.
    pub cleared: Vec<usize>,
    /// The compacted board. Borrowed (the input itself) when nothing cleared.
    pub board: Cow<'a, Board>,
}

impl LineClear<'_> {
    /// Number of rows removed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cleared.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cleared.is_empty()
    }

    /// Takes ownership of the resulting board.
    #[must_use]
    pub fn into_board(self) -> Board {
        self.board.into_owned()
    }
}

/// Removes every full row and shifts the rows above it down.
///
/// One empty row is added at the top for each removed row, so the board
/// keeps its dimensions. Running it again on its own result clears nothing.
///
/// # Example
///
/// ```
/// use stacker_engine::{Board, BoardDimensions, clear_lines};
///
/// let board = Board::from_ascii(
///     BoardDimensions::STANDARD,
///     "
///     #.........
///     ###########
///     ",
/// );
/// let result = clear_lines(&board);
/// assert_eq!(result.cleared, vec![21]);
/// assert!(result.board.is_occupied(0, 21));
/// ```
#[must_use]
pub fn clear_lines(board: &Board) -> LineClear<'_> {
    let cleared: Vec<usize> = (0..board.total_rows())
        .filter(|&y| board.is_row_full(y))
        .collect();
    if cleared.is_empty() {
        return LineClear {
            cleared,
            board: Cow::Borrowed(board),
        };
    }

    let cols = board.cols();
    let mut rows: Vec<Row> = Vec::with_capacity(board.total_rows());
    rows.extend((0..cleared.len()).map(|_| Board::empty_row(cols)));
    rows.extend(
        board
            .rows()
            .iter()
            .enumerate()
            .filter(|(y, _)| cleared.binary_search(y).is_err())
            .map(|(_, row)| row.clone()),
    );

    tracing::debug!(rows = ?cleared, "cleared lines");
    LineClear {
        cleared,
        board: Cow::Owned(Board::from_rows(board.dimensions(), rows)),
    }
}
