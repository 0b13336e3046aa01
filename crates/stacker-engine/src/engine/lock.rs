use serde::{Deserialize, Serialize};

use crate::core::{Board, PieceState};

/// Maximum number of lock-delay resets a single piece may consume.
pub const LOCK_MOVE_LIMIT: u8 = 15;

/// Returns `true` when the piece rests on the floor or the stack.
///
/// A piece must be force-locked exactly when it cannot move one row down.
/// A floating piece is never force-locked, whatever the move counter says.
#[must_use]
pub fn should_force_lock(piece: &PieceState, board: &Board) -> bool {
    !board.fits(&piece.down())
}

/// Row the piece would come to rest on if dropped straight down.
///
/// Used for the ghost preview and for hard drops.
#[must_use]
pub fn ghost_row(piece: &PieceState, board: &Board) -> i32 {
    drop_position(piece, board).y()
}

/// The piece moved down as far as the board allows.
#[must_use]
pub fn drop_position(piece: &PieceState, board: &Board) -> PieceState {
    let mut dropped = *piece;
    while board.fits(&dropped.down()) {
        dropped = dropped.down();
    }
    dropped
}

/// What the game loop should do with a piece when it consults the lock policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum LockDecision {
    /// The piece is resting and has used up its moves: lock it now.
    Lock,
    /// The piece is resting but may still be moved; let the lock-delay timer run.
    Wait,
    /// The piece is floating; gravity must keep moving it.
    KeepFalling,
}

/// Lock-delay bookkeeping owned by the game loop.
///
/// The engine never stores this; the caller threads it through its own
/// state and asks for an updated copy after every relevant event:
///
/// | Event                              | Call                      |
/// |------------------------------------|---------------------------|
/// | spawn, hold swap, lock, game over  | [`Self::reset`]           |
/// | successful player move or rotation | [`Self::register_move`]   |
/// | successful gravity step            | [`Self::clear_timer`]     |
/// | gravity blocked                    | [`Self::decide`], then [`Self::arm_timer`] if waiting |
/// | lock timer fired / limit reached   | [`Self::decide`]          |
///
/// A gravity step clears the pending timer but keeps the move counter, so
/// rotating in place over and over cannot postpone the lock forever.
///
/// # Example
///
/// ```
/// use stacker_engine::{Board, LockDecision, LockDelay, PieceKind, PieceState, drop_position};
///
/// let board = Board::default();
/// let landed = drop_position(&PieceState::spawn(PieceKind::T), &board);
///
/// let mut lock = LockDelay::new();
/// for _ in 0..15 {
///     lock = lock.register_move(&landed, &board);
/// }
/// assert!(lock.is_exhausted());
/// assert_eq!(lock.decide(&landed, &board), LockDecision::Lock);
///
/// // Gravity does not buy the piece new moves.
/// assert!(lock.clear_timer().is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LockDelay {
    moves: u8,
    move_limit: u8,
    timer_armed: bool,
}

impl Default for LockDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl LockDelay {
    /// Fresh lock state with the standard limit of [`LOCK_MOVE_LIMIT`] moves.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_limit(LOCK_MOVE_LIMIT)
    }

    #[must_use]
    pub const fn with_limit(move_limit: u8) -> Self {
        Self {
            moves: 0,
            move_limit,
            timer_armed: false,
        }
    }

    #[must_use]
    pub const fn moves(&self) -> u8 {
        self.moves
    }

    #[must_use]
    pub const fn move_limit(&self) -> u8 {
        self.move_limit
    }

    /// Whether a lock-delay timer should currently be pending.
    #[must_use]
    pub const fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.moves >= self.move_limit
    }

    /// Counter back to zero, timer cleared.
    #[must_use]
    pub const fn reset(self) -> Self {
        Self::with_limit(self.move_limit)
    }

    /// Timer cleared, counter kept.
    #[must_use]
    pub const fn clear_timer(self) -> Self {
        Self {
            timer_armed: false,
            ..self
        }
    }

    /// Timer armed, counter kept.
    ///
    /// For a piece that landed under gravity rather than by a player move.
    #[must_use]
    pub const fn arm_timer(self) -> Self {
        Self {
            timer_armed: true,
            ..self
        }
    }

    /// Records a successful player move or rotation that left `piece` where it is.
    ///
    /// Only moves that end on a surface count: the counter goes up by one
    /// (never past the limit) and the timer is (re)armed. Moves in the air
    /// leave the state untouched.
    #[must_use]
    pub fn register_move(self, piece: &PieceState, board: &Board) -> Self {
        if !should_force_lock(piece, board) {
            return self;
        }
        Self {
            moves: self.moves.saturating_add(1).min(self.move_limit),
            timer_armed: true,
            ..self
        }
    }

    /// Decides whether `piece` should be locked now.
    ///
    /// A resting piece locks once the counter is exhausted; before that it
    /// waits for its timer. A floating piece keeps falling even with an
    /// exhausted counter.
    #[must_use]
    pub fn decide(self, piece: &PieceState, board: &Board) -> LockDecision {
        if !should_force_lock(piece, board) {
            LockDecision::KeepFalling
        } else if self.is_exhausted() {
            LockDecision::Lock
        } else {
            LockDecision::Wait
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, PieceKind, PieceRotation};

    const BOTTOM: i32 = 20;

    fn t_at(x: i32, y: i32) -> PieceState {
        PieceState::new(PieceKind::T, x, y, PieceRotation::SPAWN)
    }

    fn board_with_solid_row(row: i32) -> Board {
        let mut board = Board::default();
        for x in 0..10 {
            board.set(x, row, Block::Solid);
        }
        board
    }

    #[test]
    fn test_resting_on_floor() {
        let board = Board::default();
        assert!(should_force_lock(&t_at(3, BOTTOM), &board));
        let i = PieceState::new(PieceKind::I, 3, BOTTOM, PieceRotation::SPAWN);
        assert!(should_force_lock(&i, &board));
    }

    #[test]
    fn test_resting_on_stack() {
        let board = board_with_solid_row(10);
        assert!(should_force_lock(&t_at(3, 8), &board));
        let mut board = Board::default();
        board.set(4, 8, Block::Solid);
        assert!(should_force_lock(&t_at(3, 6), &board));
    }

    #[test]
    fn test_floating() {
        let board = Board::default();
        assert!(!should_force_lock(&t_at(3, 5), &board));
        assert!(!should_force_lock(&t_at(3, 0), &board));
        assert!(!should_force_lock(&t_at(3, 12), &board_with_solid_row(15)));
        let i = PieceState::new(PieceKind::I, 3, 5, PieceRotation::SPAWN);
        assert!(!should_force_lock(&i, &board));
    }

    #[test]
    fn test_force_lock_matches_validity_below() {
        let board = board_with_solid_row(12);
        for kind in PieceKind::ALL {
            for rotation in PieceRotation::ALL {
                for y in -3..22 {
                    let piece = PieceState::new(kind, 3, y, rotation);
                    assert_eq!(
                        should_force_lock(&piece, &board),
                        !board.is_valid(kind, rotation, 3, y + 1)
                    );
                }
            }
        }
    }

    #[test]
    fn test_ghost_row() {
        let board = Board::default();
        assert_eq!(ghost_row(&t_at(3, 0), &board), BOTTOM);
        assert_eq!(ghost_row(&t_at(3, BOTTOM), &board), BOTTOM);
        let board = board_with_solid_row(15);
        assert_eq!(ghost_row(&t_at(3, 0), &board), 13);
        let landed = drop_position(&t_at(3, 0), &board);
        assert!(should_force_lock(&landed, &board));
    }

    #[test]
    fn test_register_move_counts_only_surface_moves() {
        let board = Board::default();
        let floating = LockDelay::new().register_move(&t_at(3, 5), &board);
        assert_eq!(floating, LockDelay::new());

        let landed = LockDelay::new().register_move(&t_at(3, BOTTOM), &board);
        assert_eq!(landed.moves(), 1);
        assert!(landed.timer_armed());
    }

    #[test]
    fn test_counter_is_bounded() {
        let board = Board::default();
        let piece = t_at(3, BOTTOM);
        let mut lock = LockDelay::new();
        for _ in 0..14 {
            lock = lock.register_move(&piece, &board);
        }
        assert_eq!(lock.moves(), 14);
        assert!(!lock.is_exhausted());
        assert_eq!(lock.decide(&piece, &board), LockDecision::Wait);
        for _ in 0..10 {
            lock = lock.register_move(&piece, &board);
        }
        assert_eq!(lock.moves(), LOCK_MOVE_LIMIT);
        assert_eq!(lock.decide(&piece, &board), LockDecision::Lock);
    }

    #[test]
    fn test_gravity_keeps_counter() {
        let board = board_with_solid_row(10);
        let mut lock = LockDelay::new();
        // Ten rotations on one surface...
        for _ in 0..10 {
            lock = lock.register_move(&t_at(3, 8), &board);
        }
        // ...then the stack under the piece is gone and gravity moves it.
        lock = lock.clear_timer();
        assert_eq!(lock.moves(), 10);
        assert!(!lock.timer_armed());
        // Five more on the next surface reach the limit.
        let floor = Board::default();
        for _ in 0..5 {
            lock = lock.register_move(&t_at(3, BOTTOM), &floor);
        }
        assert!(lock.is_exhausted());
        assert!(lock.decide(&t_at(3, BOTTOM), &floor).is_lock());
    }

    #[test]
    fn test_floating_piece_never_locks() {
        let board = Board::default();
        let mut lock = LockDelay::new();
        for _ in 0..LOCK_MOVE_LIMIT {
            lock = lock.register_move(&t_at(3, BOTTOM), &board);
        }
        assert!(lock.is_exhausted());
        assert!(lock.decide(&t_at(3, 5), &board).is_keep_falling());
    }

    #[test]
    fn test_reset() {
        let board = Board::default();
        let lock = LockDelay::with_limit(3)
            .register_move(&t_at(3, BOTTOM), &board)
            .register_move(&t_at(3, BOTTOM), &board)
            .reset();
        assert_eq!(lock.moves(), 0);
        assert!(!lock.timer_armed());
        assert_eq!(lock.move_limit(), 3);
    }

    #[test]
    fn test_arm_timer_keeps_counter() {
        let board = Board::default();
        let lock = LockDelay::new()
            .register_move(&t_at(3, BOTTOM), &board)
            .clear_timer()
            .arm_timer();
        assert!(lock.timer_armed());
        assert_eq!(lock.moves(), 1);
    }
}
