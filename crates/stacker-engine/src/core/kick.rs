//! SRS wall kick tables.
//!
//! Offsets are `(dx, dy)` with `dy` pointing **up**: a positive `dy` moves the
//! piece toward row 0, so the resolver subtracts it from the piece row.
//!
//! Only the four clockwise transitions carry kick data. Every other
//! transition falls back to the single in-place candidate `(0, 0)`.

use super::piece::{PieceKind, PieceRotation};

/// A single kick candidate `(dx, dy)`.
pub type KickOffset = (i32, i32);

const NO_KICK: [KickOffset; 1] = [(0, 0)];

/// Kick table family a piece kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickClass {
    /// The I-piece table.
    I,
    /// The table shared by O, T, S, Z, J and L.
    Standard,
}

impl KickClass {
    #[must_use]
    pub const fn of(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => KickClass::I,
            _ => KickClass::Standard,
        }
    }

    const fn table(self) -> &'static [[KickOffset; 5]; 4] {
        match self {
            KickClass::I => &I_KICKS,
            KickClass::Standard => &STANDARD_KICKS,
        }
    }

    /// Ordered candidates for the transition `from → to`.
    ///
    /// The first candidate is always `(0, 0)`.
    #[must_use]
    pub fn offsets(self, from: PieceRotation, to: PieceRotation) -> &'static [KickOffset] {
        // Table rows are "0->1", "1->2", "2->3", "3->0", indexed by `from`.
        if to == from.rotated_right() {
            &self.table()[usize::from(from.index())]
        } else {
            &NO_KICK
        }
    }
}

// 0->1, 1->2, 2->3, 3->0
const STANDARD_KICKS: [[KickOffset; 5]; 4] = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

// 0->1, 1->2, 2->3, 3->0
const I_KICKS: [[KickOffset; 5]; 4] = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_kick_is_identity() {
        for class in [KickClass::I, KickClass::Standard] {
            for from in PieceRotation::ALL {
                for to in PieceRotation::ALL {
                    assert_eq!(class.offsets(from, to)[0], (0, 0));
                }
            }
        }
    }

    #[test]
    fn test_clockwise_transitions_have_five_candidates() {
        for class in [KickClass::I, KickClass::Standard] {
            for from in PieceRotation::ALL {
                assert_eq!(class.offsets(from, from.rotated_right()).len(), 5);
            }
        }
    }

    #[test]
    fn test_counter_clockwise_transitions_stay_in_place() {
        for class in [KickClass::I, KickClass::Standard] {
            for from in PieceRotation::ALL {
                assert_eq!(class.offsets(from, from.rotated_left()), &[(0, 0)]);
            }
        }
    }

    #[test]
    fn test_class_selection() {
        assert_eq!(KickClass::of(PieceKind::I), KickClass::I);
        for kind in [
            PieceKind::O,
            PieceKind::T,
            PieceKind::S,
            PieceKind::Z,
            PieceKind::J,
            PieceKind::L,
        ] {
            assert_eq!(KickClass::of(kind), KickClass::Standard);
        }
    }

    #[test]
    fn test_known_rows() {
        let r0 = PieceRotation::SPAWN;
        let r1 = r0.rotated_right();
        assert_eq!(
            KickClass::Standard.offsets(r0, r1),
            &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]
        );
        assert_eq!(
            KickClass::I.offsets(r1.rotated_right().rotated_right(), r0),
            &[(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]
        );
    }
}
