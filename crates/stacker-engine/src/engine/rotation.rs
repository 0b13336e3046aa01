use crate::core::{Board, KickClass, PieceKind, PieceRotation, PieceState, RotationDirection};

/// Rotates a piece one step using the SRS kick tables.
///
/// The new rotation state is `(old + dir + 4) mod 4`. Kick candidates for
/// the transition are tried in order at `(x + dx, y - dy)`; the first one
/// the board accepts wins. When every candidate collides the result is
/// `None` and the caller keeps its current piece.
///
/// # Example
///
/// ```
/// use stacker_engine::{Board, PieceKind, PieceState, RotationDirection, try_rotate};
///
/// let board = Board::default();
/// let piece = PieceState::spawn(PieceKind::T);
/// let rotated = try_rotate(&piece, RotationDirection::Clockwise, &board).unwrap();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[must_use]
pub fn try_rotate(
    piece: &PieceState,
    direction: RotationDirection,
    board: &Board,
) -> Option<PieceState> {
    let from = piece.rotation();
    let to = from.rotated(direction);
    let kicks = KickClass::of(piece.kind()).offsets(from, to);

    let rotated = kicks
        .iter()
        .map(|&(dx, dy)| ((dx, dy), piece.with_rotation(to).shifted(dx, -dy)))
        .find(|(_, candidate)| board.fits(candidate));

    match rotated {
        Some(((0, 0), candidate)) => Some(candidate),
        Some(((dx, dy), candidate)) => {
            tracing::trace!(piece = ?piece, dx, dy, "rotation resolved by wall kick");
            Some(candidate)
        }
        None => {
            tracing::trace!(piece = ?piece, ?direction, "rotation blocked, all kicks failed");
            None
        }
    }
}

/// [`try_rotate`] for untyped callers.
///
/// Unknown piece names, rotation indices outside `0..=3` and directions
/// other than `+1`/`-1` all yield `None`.
#[must_use]
pub fn try_rotate_named(
    name: &str,
    x: i32,
    y: i32,
    rotation: u8,
    direction: i32,
    board: &Board,
) -> Option<PieceState> {
    let kind = PieceKind::from_name(name)?;
    let rotation = PieceRotation::from_index(rotation)?;
    let direction = RotationDirection::from_delta(direction)?;
    try_rotate(&PieceState::new(kind, x, y, rotation), direction, board)
}
