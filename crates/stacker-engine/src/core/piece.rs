use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Column at which freshly spawned pieces place their matrix origin.
pub const SPAWN_X: i32 = 3;
/// Row at which freshly spawned pieces place their matrix origin (topmost hidden row).
pub const SPAWN_Y: i32 = 0;

/// A falling piece: kind, matrix origin and rotation state.
///
/// `PieceState` is a plain value. Every movement or rotation produces a new
/// state; nothing is ever mutated in place, so a caller that keeps the old
/// value keeps an authoritative copy when a move is rejected.
///
/// # Coordinate System
///
/// - `x` is the board column of the matrix origin (left edge of the 4×4 box)
/// - `y` is the board row of the matrix origin, row 0 being the topmost hidden row
/// - Both may be negative; cells above row 0 live in the unbounded spawn buffer
///
/// # Example
///
/// ```
/// use stacker_engine::{PieceKind, PieceState};
///
/// let piece = PieceState::spawn(PieceKind::T);
/// let moved = piece.right().down();
/// assert_eq!((moved.x(), moved.y()), (4, 1));
/// assert_eq!(piece.x(), 3); // `piece` itself is unchanged
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceState {
    kind: PieceKind,
    x: i32,
    y: i32,
    rotation: PieceRotation,
}

impl Serialize for PieceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.x,
            self.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for PieceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '#' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid piece kind: {c}")))?,
            _ => {
                return Err(serde::de::Error::custom(format!(
                    "piece kind must be single character, got '{kind_str}'"
                )));
            }
        };

        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '@' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let rotation = rotation_str
            .parse::<u8>()
            .ok()
            .and_then(PieceRotation::from_index)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("rotation must be 0-3, got '{rotation_str}'"))
            })?;

        let (x_str, y_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing ',' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let x = x_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(PieceState {
            kind,
            x,
            y,
            rotation,
        })
    }
}

impl PieceState {
    #[must_use]
    pub const fn new(kind: PieceKind, x: i32, y: i32, rotation: PieceRotation) -> Self {
        Self {
            kind,
            x,
            y,
            rotation,
        }
    }

    /// Creates a piece in its spawn orientation at ([`SPAWN_X`], [`SPAWN_Y`]).
    #[must_use]
    pub const fn spawn(kind: PieceKind) -> Self {
        Self::new(kind, SPAWN_X, SPAWN_Y, PieceRotation::SPAWN)
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Moves the origin by `(dx, dy)`, saturating at the `i32` range.
    #[must_use]
    pub const fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    #[must_use]
    pub const fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub const fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    #[must_use]
    pub const fn with_row(&self, y: i32) -> Self {
        Self { y, ..*self }
    }

    #[must_use]
    pub const fn with_rotation(&self, rotation: PieceRotation) -> Self {
        Self { rotation, ..*self }
    }

    /// Board coordinates `(x, y)` of the four occupied cells.
    ///
    /// Cells above the board (negative `y`) are included; filtering them is
    /// the board's business.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.kind
            .occupied_offsets(self.rotation)
            .map(|(dx, dy)| (self.x.saturating_add(dx), self.y.saturating_add(dy)))
            .collect()
    }
}

/// Direction of a single rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RotationDirection {
    /// One step clockwise (`+1`).
    Clockwise,
    /// One step counter-clockwise (`-1`).
    CounterClockwise,
}

impl RotationDirection {
    #[must_use]
    pub const fn delta(self) -> i8 {
        match self {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => -1,
        }
    }

    /// Maps `+1` / `-1` to a direction. Any other value is rejected.
    #[must_use]
    pub const fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            1 => Some(RotationDirection::Clockwise),
            -1 => Some(RotationDirection::CounterClockwise),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    /// Returns `None` for indices outside `0..=3`.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 4 { Some(Self(index)) } else { None }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// `(old + dir + 4) mod 4`
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        #[expect(clippy::cast_sign_loss)]
        let step = (direction.delta() + 4) as u8;
        Self((self.0 + step) % 4)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        self.rotated(RotationDirection::Clockwise)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        self.rotated(RotationDirection::CounterClockwise)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

/// Display metadata attached to a catalog entry.
///
/// The engine never inspects these values; they travel with the catalog so
/// that a renderer does not need a second lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTags {
    pub color: &'static str,
    pub shadow: &'static str,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Every kind, in catalog order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// The 4×4 occupancy matrix for the given rotation state.
    #[must_use]
    pub fn matrix(self, rotation: PieceRotation) -> &'static PieceMatrix {
        &PIECE_MATRICES[self as usize][rotation.as_usize()]
    }

    /// Returns an iterator of `(column, row)` offsets of the occupied matrix cells.
    pub fn occupied_offsets(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        self.matrix(rotation)
            .iter()
            .zip(0..)
            .flat_map(|(row, dy)| {
                row.iter()
                    .zip(0..)
                    .filter_map(move |(&cell, dx)| cell.then_some((dx, dy)))
            })
    }

    #[must_use]
    pub const fn tags(self) -> PieceTags {
        let (color, shadow) = match self {
            PieceKind::I => ("#00e5ff", "rgba(0, 229, 255, 0.3)"),
            PieceKind::O => ("#ffee00", "rgba(255, 238, 0, 0.3)"),
            PieceKind::T => ("#cc44ff", "rgba(204, 68, 255, 0.3)"),
            PieceKind::S => ("#44ff88", "rgba(68, 255, 136, 0.3)"),
            PieceKind::Z => ("#ff4444", "rgba(255, 68, 68, 0.3)"),
            PieceKind::J => ("#4466ff", "rgba(68, 102, 255, 0.3)"),
            PieceKind::L => ("#ff8800", "rgba(255, 136, 0, 0.3)"),
        };
        PieceTags { color, shadow }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacker_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacker_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Looks up a kind by its catalog name (`"I"`, `"O"`, ...).
    ///
    /// Anything that is not exactly one known name yields `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }
}

/// 4×4 occupancy grid of a piece in one rotation state, indexed `[row][column]`.
pub type PieceMatrix = [[bool; 4]; 4];

/// Generates all 4 rotation states of a piece matrix by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I)
/// * `matrix` - Initial piece matrix at 0° rotation
const fn matrix_rotations(size: usize, matrix: PieceMatrix) -> [PieceMatrix; 4] {
    let mut rotates = [matrix; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_matrix = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_matrix[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_matrix;
        i += 1;
    }
    rotates
}

// Index order follows `PieceKind` discriminants.
static PIECE_MATRICES: [[PieceMatrix; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    // O keeps the same cells in every state, so rotating it never shifts it.
    const O: PieceMatrix = [[E, C, C, E], [E, C, C, E], EEEE, EEEE];
    [
        // I-piece
        matrix_rotations(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // O-piece
        [O; 4],
        // T-piece
        matrix_rotations(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // S-piece
        matrix_rotations(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z-piece
        matrix_rotations(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // J-piece
        matrix_rotations(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        matrix_rotations(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
    ]
};
