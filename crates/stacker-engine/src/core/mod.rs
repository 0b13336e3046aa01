//! Static rule data and the board grid.
//!
//! - [`PieceKind`], [`PieceRotation`], [`PieceState`] - piece catalog, rotation states and the 4×4 matrices
//! - [`KickClass`] - SRS wall kick tables
//! - [`Board`] - the playfield grid and the placement validity check

pub use self::{board::*, kick::*, piece::*};

mod board;
mod kick;
mod piece;
