//! Deterministic rules engine for a falling-block puzzle game.
//!
//! The crate answers rule questions (is this placement legal, where does a
//! rotation land, must this piece lock, which lines clear, what is the new
//! score, which piece comes next) and holds no state between calls.
//!
//! - [`core`] - piece catalog, kick tables and the board grid
//! - [`engine`] - rotation, locking, line clears, scoring and the piece bag

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
