use std::time::Duration;

use rand_pcg::Pcg32;
use serde::Serialize;
use stacker_engine::{
    Board, EngineConfig, LockDecision, LockDelay, PieceBag, PieceKind, PieceSeed,
    PieceState, RotationDirection, ScoreState, clear_lines, drop_position, should_force_lock,
    try_rotate,
};

/// How long a resting piece may sit before it locks.
pub const LOCK_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("piece colliding at the requested position")]
    PieceCollision,
    #[display("hold already used for this piece")]
    HoldAlreadyUsed,
    #[display("game is over")]
    GameOver,
}

/// The external game loop around the rules engine.
///
/// Owns everything the engine refuses to hold: the board, the falling
/// piece, the bag and its generator, the lock-delay bookkeeping, the score
/// and both timers. Time only moves through [`Session::advance`], so a
/// session driven by the same seed and the same inputs always ends in the
/// same state.
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    board: Board,
    piece: PieceState,
    bag: PieceBag,
    rng: Pcg32,
    lock: LockDelay,
    score: ScoreState,
    held: Option<PieceKind>,
    hold_used: bool,
    state: SessionState,
    pieces_locked: u32,
    gravity_elapsed: Duration,
    lock_elapsed: Duration,
}

impl Session {
    #[must_use]
    pub fn new(config: EngineConfig, seed: PieceSeed) -> Self {
        let mut rng = seed.rng();
        let (first, bag) = PieceBag::new().draw_next(&mut rng);
        let mut session = Self {
            config,
            board: Board::new(config.board),
            piece: config.spawn_piece(first),
            bag,
            rng,
            lock: config.lock_delay(),
            score: ScoreState::new(),
            held: None,
            hold_used: false,
            state: SessionState::Playing,
            pieces_locked: 0,
            gravity_elapsed: Duration::ZERO,
            lock_elapsed: Duration::ZERO,
        };
        session.enter(first);
        session
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> &PieceState {
        &self.piece
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.upcoming()
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    #[must_use]
    pub fn lock_delay(&self) -> LockDelay {
        self.lock
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    #[must_use]
    pub fn ghost_piece(&self) -> PieceState {
        drop_position(&self.piece, &self.board)
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        if self.state.is_game_over() {
            return Err(SessionError::GameOver);
        }
        Ok(())
    }

    /// Places a new piece of `kind` at the spawn point, ending the game if it does not fit.
    fn enter(&mut self, kind: PieceKind) {
        self.piece = self.config.spawn_piece(kind);
        self.lock = self.lock.reset();
        self.gravity_elapsed = Duration::ZERO;
        self.lock_elapsed = Duration::ZERO;
        if !self.board.fits(&self.piece) {
            tracing::debug!(piece = ?self.piece, "spawn blocked");
            self.state = SessionState::GameOver;
        }
    }

    /// Draws the next piece from the bag and spawns it.
    pub fn spawn(&mut self) {
        let bag = std::mem::take(&mut self.bag);
        let (kind, bag) = bag.draw_next(&mut self.rng);
        self.bag = bag;
        self.hold_used = false;
        self.enter(kind);
    }

    /// Bookkeeping after an accepted player move or rotation.
    ///
    /// A move that leaves the piece resting consumes one lock reset. Once
    /// the resets run out the piece locks on the spot.
    fn after_player_move(&mut self) {
        self.lock = self.lock.register_move(&self.piece, &self.board);
        if self.lock.timer_armed() {
            self.lock_elapsed = Duration::ZERO;
        }
        if self.lock.decide(&self.piece, &self.board).is_lock() {
            tracing::trace!(moves = self.lock.moves(), "move limit reached");
            self.lock_piece();
        }
    }

    fn try_shift(&mut self, piece: PieceState) -> Result<(), SessionError> {
        self.ensure_playing()?;
        if !self.board.fits(&piece) {
            return Err(SessionError::PieceCollision);
        }
        self.piece = piece;
        self.after_player_move();
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), SessionError> {
        self.try_shift(self.piece.left())
    }

    pub fn try_move_right(&mut self) -> Result<(), SessionError> {
        self.try_shift(self.piece.right())
    }

    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), SessionError> {
        self.ensure_playing()?;
        let piece =
            try_rotate(&self.piece, direction, &self.board).ok_or(SessionError::PieceCollision)?;
        self.piece = piece;
        self.after_player_move();
        Ok(())
    }

    /// Moves the piece down one row; fails on a surface.
    ///
    /// Counts as a player move: landing this way uses up a lock reset and
    /// starts the lock timer.
    pub fn try_soft_drop(&mut self) -> Result<(), SessionError> {
        self.ensure_playing()?;
        let piece = self.piece.down();
        if !self.board.fits(&piece) {
            return Err(SessionError::PieceCollision);
        }
        self.piece = piece;
        self.lock = self.lock.clear_timer();
        self.gravity_elapsed = Duration::ZERO;
        self.after_player_move();
        Ok(())
    }

    /// Drops the piece to its ghost position and locks it. Returns the number of cleared lines.
    pub fn hard_drop(&mut self) -> Result<usize, SessionError> {
        self.ensure_playing()?;
        self.piece = self.ghost_piece();
        Ok(self.lock_piece())
    }

    /// Swaps the falling piece with the held one (or the next bag piece).
    ///
    /// Allowed once per spawned piece.
    pub fn try_hold(&mut self) -> Result<(), SessionError> {
        self.ensure_playing()?;
        if self.hold_used {
            return Err(SessionError::HoldAlreadyUsed);
        }
        let current = self.piece.kind();
        match self.held.replace(current) {
            Some(kind) => self.enter(kind),
            None => self.spawn(),
        }
        self.hold_used = true;
        Ok(())
    }

    /// One gravity step.
    ///
    /// A floating piece moves down and its lock timer is cleared, keeping the
    /// move counter. A resting piece with no moves left locks at once;
    /// otherwise it arms the timer if none is pending.
    pub fn gravity_tick(&mut self) {
        if self.state.is_game_over() {
            return;
        }
        let down = self.piece.down();
        if self.board.fits(&down) {
            self.piece = down;
            self.lock = self.lock.clear_timer();
            self.lock_elapsed = Duration::ZERO;
            return;
        }
        match self.lock.decide(&self.piece, &self.board) {
            LockDecision::Lock => {
                self.lock_piece();
            }
            LockDecision::Wait | LockDecision::KeepFalling => {
                if !self.lock.timer_armed() {
                    self.lock = self.lock.arm_timer();
                    self.lock_elapsed = Duration::ZERO;
                }
            }
        }
    }

    /// Advances both timers by `dt`, running every gravity step and lock that falls due.
    pub fn advance(&mut self, dt: Duration) {
        if self.state.is_game_over() {
            return;
        }

        self.gravity_elapsed += dt;
        loop {
            let interval = self.score.gravity_interval();
            if self.gravity_elapsed < interval || self.state.is_game_over() {
                break;
            }
            self.gravity_elapsed -= interval;
            self.gravity_tick();
        }

        if self.lock.timer_armed() {
            self.lock_elapsed += dt;
            if self.lock_elapsed >= LOCK_DELAY {
                self.on_lock_timer();
            }
        }
    }

    fn on_lock_timer(&mut self) {
        match self.lock.decide(&self.piece, &self.board) {
            LockDecision::KeepFalling => {
                self.lock = self.lock.clear_timer();
                self.lock_elapsed = Duration::ZERO;
            }
            LockDecision::Wait | LockDecision::Lock => {
                self.lock_piece();
            }
        }
    }

    /// Writes the falling piece into the board, clears lines, scores and spawns the next piece.
    ///
    /// Returns the number of cleared lines.
    pub fn lock_piece(&mut self) -> usize {
        debug_assert!(should_force_lock(&self.piece, &self.board));
        let locked = self.board.lock_piece(&self.piece);
        let result = clear_lines(&locked);
        let lines = result.count();
        let (score, points) = self.score.apply_clear(lines);
        self.board = result.into_board();
        self.score = score;
        self.pieces_locked += 1;
        tracing::debug!(
            piece = ?self.piece,
            lines,
            points,
            level = self.score.level,
            "piece locked"
        );
        self.spawn();
        lines
    }
}
