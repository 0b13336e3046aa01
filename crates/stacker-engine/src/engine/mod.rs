//! Rule decisions built on top of [`crate::core`].
//!
//! Every function here is pure: it takes the current board and piece by
//! reference and returns a fresh value. Time, input and the running game
//! state belong to the caller.
//!
//! - [`try_rotate`] - SRS rotation with wall kicks
//! - [`should_force_lock`], [`drop_position`], [`LockDelay`] - lock and ghost policy
//! - [`clear_lines`] - full row removal
//! - [`add_score`], [`ScoreState`], [`gravity_interval`] - scoring and leveling
//! - [`PieceBag`], [`PieceSeed`] - 7-bag randomizer
//! - [`EngineConfig`] - tunable parameters
//!
//! # Turn Flow
//!
//! A caller driving a game typically:
//!
//! 1. Draws a kind from the [`PieceBag`] and spawns it; a spawn that does not
//!    fit ends the game
//! 2. Applies player moves and [`try_rotate`], feeding each accepted move
//!    into [`LockDelay::register_move`]
//! 3. Steps gravity, calling [`LockDelay::clear_timer`] on success
//! 4. Asks [`LockDelay::decide`] when the timer fires, then locks the piece,
//!    runs [`clear_lines`] and scores the result
//!
//! # Example
//!
//! ```
//! use stacker_engine::{Board, PieceBag, PieceSeed, PieceState, ScoreState, clear_lines, drop_position};
//!
//! let mut rng = PieceSeed::from_u128(7).rng();
//! let (kind, _bag) = PieceBag::new().draw_next(&mut rng);
//!
//! let board = Board::default();
//! let piece = drop_position(&PieceState::spawn(kind), &board);
//! let board = board.lock_piece(&piece);
//!
//! let result = clear_lines(&board);
//! let (score, points) = ScoreState::default().apply_clear(result.count());
//! assert_eq!(points, 0);
//! assert_eq!(score.level, 1);
//! ```

pub use self::{config::*, line_clear::*, lock::*, piece_bag::*, rotation::*, scoring::*};

mod config;
mod line_clear;
mod lock;
mod piece_bag;
mod rotation;
mod scoring;
