use std::{collections::VecDeque, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::PieceKind;

/// Queue of upcoming pieces fed by the 7-bag randomizer.
///
/// # 7-Bag System
///
/// 1. A refill appends one shuffled copy of all 7 kinds to the back of the queue
/// 2. Pieces are drawn from the front
/// 3. Before a draw, the queue is refilled if it holds fewer than
///    [`REFILL_THRESHOLD`] pieces
///
/// Every 7 consecutive draws starting at a multiple of 7 therefore contain
/// each kind exactly once, and the preview always shows at least 4 pieces.
///
/// The bag never owns its random source. Operations consume the bag and
/// return the updated one, so a caller that keeps a clone keeps the old
/// queue.
///
/// # Example
///
/// ```
/// use stacker_engine::{PieceBag, PieceSeed};
///
/// let mut rng = PieceSeed::from_u128(42).rng();
/// let bag = PieceBag::new();
///
/// let (first, bag) = bag.draw_next(&mut rng);
/// assert_eq!(bag.len(), 6);
/// assert!(!bag.upcoming().any(|kind| kind == first));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceBag {
    queue: VecDeque<PieceKind>,
}

/// A draw refills the bag first when it holds fewer pieces than this.
pub const REFILL_THRESHOLD: usize = 5;

impl FromIterator<PieceKind> for PieceBag {
    fn from_iter<T: IntoIterator<Item = PieceKind>>(iter: T) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl PieceBag {
    /// An empty bag. The first draw fills it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(PieceKind::LEN * 2),
        }
    }

    /// Appends one shuffled permutation of all 7 kinds.
    ///
    /// The pieces already queued keep their order.
    #[must_use]
    pub fn refill<R>(mut self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut kinds = PieceKind::ALL;
        kinds.shuffle(rng);
        self.queue.extend(kinds);
        tracing::trace!(queued = self.queue.len(), "bag refilled");
        self
    }

    /// Draws the next piece, refilling first if fewer than [`REFILL_THRESHOLD`] remain.
    ///
    /// # Panics
    ///
    /// Never in practice: a refill always leaves at least 7 pieces queued.
    #[must_use]
    pub fn draw_next<R>(self, rng: &mut R) -> (PieceKind, Self)
    where
        R: Rng + ?Sized,
    {
        let mut bag = if self.queue.len() < REFILL_THRESHOLD {
            self.refill(rng)
        } else {
            self
        };
        let next = bag
            .queue
            .pop_front()
            .expect("piece bag should never be empty after refill");
        (next, bag)
    }

    /// The piece the next draw returns, if the queue is not empty.
    #[must_use]
    pub fn peek(&self) -> Option<PieceKind> {
        self.queue.front().copied()
    }

    /// Queued pieces, front first.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed for the [`Pcg32`] generator that drives
/// [`PieceBag`]. Using the same seed will produce the same sequence of
/// pieces, which makes simulations reproducible and lets tests assert on
/// exact permutations.
///
/// Serialized (and parsed) as a 32-character hex string.
///
/// # Example
///
/// ```
/// use stacker_engine::{PieceBag, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let (a, _) = PieceBag::new().draw_next(&mut seed.rng());
/// let (b, _) = PieceBag::new().draw_next(&mut seed.rng());
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

/// Error returned when a [`PieceSeed`] cannot be parsed from hex.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("invalid hex: expected 32 characters, got {_0}")]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid hex: {_0}")]
    InvalidDigit(#[error(not(source))] String),
}

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// A fresh generator positioned at the start of this seed's stream.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", self.as_u128())
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParsePieceSeedError::InvalidLength(hex_str.len()));
        }
        // `from_str_radix` accepts a leading sign, hex digits only here.
        if !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError::InvalidDigit(hex_str.to_owned()));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|_| ParsePieceSeedError::InvalidDigit(hex_str.to_owned()))?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom as _;

    use super::*;
    use crate::core::PieceKind::{I, O};

    fn sorted(kinds: impl IntoIterator<Item = PieceKind>) -> Vec<PieceKind> {
        let mut kinds: Vec<_> = kinds.into_iter().collect();
        kinds.sort_by_key(|kind| *kind as u8);
        kinds
    }

    fn test_rng() -> Pcg32 {
        PieceSeed::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788).rng()
    }

    #[test]
    fn test_refill_empty_bag_is_a_permutation() {
        let bag = PieceBag::new().refill(&mut test_rng());
        assert_eq!(bag.len(), 7);
        assert_eq!(sorted(bag.upcoming()), PieceKind::ALL.to_vec());
    }

    #[test]
    fn test_refill_uses_injected_randomness() {
        let mut expected = PieceKind::ALL;
        expected.shuffle(&mut test_rng());
        let bag = PieceBag::new().refill(&mut test_rng());
        assert_eq!(bag.upcoming().collect::<Vec<_>>(), expected.to_vec());
    }

    #[test]
    fn test_refill_appends_without_reordering() {
        let bag: PieceBag = [I, O].into_iter().collect();
        let refilled = bag.clone().refill(&mut test_rng());
        assert_eq!(refilled.len(), 9);
        let queue: Vec<_> = refilled.upcoming().collect();
        assert_eq!(&queue[..2], &[I, O]);
        assert_eq!(sorted(queue[2..].iter().copied()), PieceKind::ALL.to_vec());
        // The input value is untouched.
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_draw_below_threshold_refills() {
        let bag: PieceBag = [I, O, I, O].into_iter().collect();
        let (next, rest) = bag.draw_next(&mut test_rng());
        assert_eq!(next, I);
        assert_eq!(rest.len(), 10);
    }

    #[test]
    fn test_draw_at_threshold_does_not_refill() {
        let bag: PieceBag = [O, I, I, O, I].into_iter().collect();
        let (next, rest) = bag.draw_next(&mut test_rng());
        assert_eq!(next, O);
        assert_eq!(rest.len(), 4);
        assert_eq!(rest.upcoming().collect::<Vec<_>>(), vec![I, I, O, I]);
    }

    #[test]
    fn test_draws_come_in_complete_bags() {
        let mut rng = test_rng();
        let mut bag = PieceBag::new();
        let mut drawn = Vec::new();
        for _ in 0..35 {
            let (next, rest) = bag.draw_next(&mut rng);
            drawn.push(next);
            bag = rest;
            assert!(bag.len() >= REFILL_THRESHOLD - 1);
        }
        for chunk in drawn.chunks(7) {
            assert_eq!(sorted(chunk.iter().copied()), PieceKind::ALL.to_vec());
        }
    }

    #[test]
    fn test_peek_matches_next_draw() {
        let bag = PieceBag::new().refill(&mut test_rng());
        let peeked = bag.peek();
        let (next, _) = bag.draw_next(&mut test_rng());
        assert_eq!(peeked, Some(next));
        assert_eq!(PieceBag::new().peek(), None);
        assert!(PieceBag::new().is_empty());
    }

    #[test]
    fn test_bag_serialization() {
        let bag: PieceBag = [I, O].into_iter().collect();
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"["I","O"]"#);
        assert_eq!(serde_json::from_str::<PieceBag>(&json).unwrap(), bag);
    }

    mod piece_seed_serialization {
        use super::*;

        fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
            PieceSeed(bytes)
        }

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            // Big-endian: bytes appear in order as hex pairs
            let seed = seed_from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_known_value_all_zeros() {
            let seed = seed_from_bytes([0u8; 16]);
            assert_eq!(
                serde_json::to_string(&seed).unwrap(),
                "\"00000000000000000000000000000000\""
            );
            assert_eq!(PieceSeed::from_u128(0), seed);
        }

        #[test]
        fn test_parse_uppercase_hex() {
            let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(seed.as_u128(), 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        }

        #[test]
        fn test_parse_errors() {
            assert_eq!(
                "0123456789abcdef0123456789abcde".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidLength(31))
            );
            assert_eq!(
                "".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidLength(0))
            );
            assert!(matches!(
                "ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidDigit(_))
            ));
            assert!(matches!(
                "+123456789abcdef0123456789abcdef".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidDigit(_))
            ));
        }

        #[test]
        fn test_deserialize_errors_mention_hex() {
            for json in ["\"\"", "\"0123456789abcdef0123456789abcdef0\"", "\"zz\""] {
                let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex"), "{json}: {err}");
            }
        }

        #[test]
        fn test_same_seed_same_sequence() {
            let seed: PieceSeed = rand::rng().random();
            let (mut rng1, mut rng2) = (seed.rng(), seed.rng());
            let (mut bag1, mut bag2) = (PieceBag::new(), PieceBag::new());
            for _ in 0..20 {
                let (a, rest1) = bag1.draw_next(&mut rng1);
                let (b, rest2) = bag2.draw_next(&mut rng2);
                assert_eq!(a, b);
                (bag1, bag2) = (rest1, rest2);
            }
        }
    }
}
