use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base points for a clear, indexed by the number of lines removed at once.
///
/// The awarded score is the base value multiplied by the current level.
pub const LINE_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

const SLOWEST_GRAVITY_MS: u64 = 800;
const FASTEST_GRAVITY_MS: u64 = 50;
const GRAVITY_STEP_MS: u64 = 55;

/// Histogram of line clears by size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClearStats {
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub tetris: u32,
}

impl ClearStats {
    /// Total number of clears of any size.
    #[must_use]
    pub const fn total_clears(&self) -> u32 {
        self.singles + self.doubles + self.triples + self.tetris
    }

    const fn record(mut self, lines: usize) -> Self {
        match lines {
            1 => self.singles += 1,
            2 => self.doubles += 1,
            3 => self.triples += 1,
            4 => self.tetris += 1,
            _ => {}
        }
        self
    }
}

/// Result of [`add_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub points: u64,
    pub new_level: u32,
    pub new_lines: u32,
    pub new_lines_in_level: u32,
    pub stats: ClearStats,
}

/// Scores a single lock that cleared `lines_cleared` rows.
///
/// Awards `LINE_POINTS[n] × level`, bumps the matching [`ClearStats`]
/// counter and advances the level every [`LINES_PER_LEVEL`] lines, possibly
/// more than once. Zero lines leaves everything as it was. A count above 4
/// cannot come from one tetromino and is treated the same way.
///
/// # Example
///
/// ```
/// use stacker_engine::{ClearStats, add_score};
///
/// // 9 lines into level 1, then a tetris.
/// let outcome = add_score(4, 1, ClearStats::default(), 9, 9);
/// assert_eq!(outcome.points, 800);
/// assert_eq!(outcome.new_level, 2);
/// assert_eq!(outcome.new_lines, 13);
/// assert_eq!(outcome.new_lines_in_level, 3);
/// assert_eq!(outcome.stats.tetris, 1);
/// ```
#[must_use]
pub fn add_score(
    lines_cleared: usize,
    level: u32,
    stats: ClearStats,
    current_lines: u32,
    current_lines_in_level: u32,
) -> ScoreOutcome {
    let unchanged = ScoreOutcome {
        points: 0,
        new_level: level,
        new_lines: current_lines,
        new_lines_in_level: current_lines_in_level,
        stats,
    };
    let (Some(&base), Ok(added)) = (LINE_POINTS.get(lines_cleared), u32::try_from(lines_cleared))
    else {
        tracing::debug!(lines_cleared, "ignoring impossible line clear count");
        return unchanged;
    };
    if added == 0 {
        return unchanged;
    }

    let mut new_level = level;
    let mut new_lines_in_level = current_lines_in_level + added;
    while new_lines_in_level >= LINES_PER_LEVEL {
        new_lines_in_level -= LINES_PER_LEVEL;
        new_level += 1;
    }
    if new_level != level {
        tracing::debug!(from = level, to = new_level, "level up");
    }

    ScoreOutcome {
        points: u64::from(base) * u64::from(level),
        new_level,
        new_lines: current_lines + added,
        new_lines_in_level,
        stats: stats.record(lines_cleared),
    }
}

/// Running score of a game.
///
/// Every field only ever grows; `lines_in_level` wraps back below
/// [`LINES_PER_LEVEL`] as the level advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreState {
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub lines_in_level: u32,
    pub stats: ClearStats,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    /// Level 1, nothing scored.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            lines_in_level: 0,
            stats: ClearStats {
                singles: 0,
                doubles: 0,
                triples: 0,
                tetris: 0,
            },
        }
    }

    /// Applies the outcome of one lock and returns the new state with the points awarded.
    #[must_use]
    pub fn apply_clear(self, lines_cleared: usize) -> (Self, u64) {
        let outcome = add_score(
            lines_cleared,
            self.level,
            self.stats,
            self.lines,
            self.lines_in_level,
        );
        let next = Self {
            score: self.score + outcome.points,
            level: outcome.new_level,
            lines: outcome.new_lines,
            lines_in_level: outcome.new_lines_in_level,
            stats: outcome.stats,
        };
        (next, outcome.points)
    }

    /// Gravity interval for the current level.
    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        gravity_interval(self.level)
    }
}

/// Time between two gravity steps at `level`.
///
/// 800 ms at level 1, 55 ms faster per level, never below 50 ms (reached at
/// level 15). Level 0 is treated as level 1.
#[must_use]
pub fn gravity_interval(level: u32) -> Duration {
    let steps = u64::from(level.max(1) - 1);
    let ms = SLOWEST_GRAVITY_MS
        .saturating_sub(steps.saturating_mul(GRAVITY_STEP_MS))
        .max(FASTEST_GRAVITY_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(level: u32) -> u128 {
        gravity_interval(level).as_millis()
    }

    #[test]
    fn test_constants() {
        assert_eq!(LINE_POINTS, [0, 100, 300, 500, 800]);
        assert_eq!(LINES_PER_LEVEL, 10);
    }

    #[test]
    fn test_gravity_interval() {
        assert_eq!(ms(1), 800);
        assert_eq!(ms(2), 745);
        assert_eq!(ms(14), 85);
        assert_eq!(ms(15), 50);
        assert_eq!(ms(20), 50);
        assert_eq!(ms(100), 50);
        assert_eq!(ms(u32::MAX), 50);
        assert_eq!(ms(0), 800);
    }

    #[test]
    fn test_gravity_interval_is_non_increasing() {
        let mut prev = ms(1);
        for level in 2..=30 {
            let cur = ms(level);
            assert!(cur <= prev, "level {level}");
            prev = cur;
        }
    }

    #[test]
    fn test_no_lines_changes_nothing() {
        let stats = ClearStats {
            singles: 2,
            ..ClearStats::default()
        };
        let outcome = add_score(0, 3, stats, 17, 7);
        assert_eq!(
            outcome,
            ScoreOutcome {
                points: 0,
                new_level: 3,
                new_lines: 17,
                new_lines_in_level: 7,
                stats,
            }
        );
    }

    #[test]
    fn test_impossible_counts_fail_closed() {
        let outcome = add_score(5, 2, ClearStats::default(), 3, 3);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.new_level, 2);
        assert_eq!(outcome.new_lines, 3);
        assert_eq!(outcome.stats, ClearStats::default());
        assert_eq!(add_score(usize::MAX, 2, ClearStats::default(), 3, 3).points, 0);
    }

    #[test]
    fn test_points_scale_with_level() {
        let empty = ClearStats::default();
        assert_eq!(add_score(1, 1, empty, 0, 0).points, 100);
        assert_eq!(add_score(4, 1, empty, 0, 0).points, 800);
        assert_eq!(add_score(4, 5, empty, 0, 0).points, 4000);
        assert_eq!(add_score(2, 3, empty, 0, 0).points, 900);
        assert_eq!(add_score(3, 2, empty, 0, 0).points, 1000);
    }

    #[test]
    fn test_stats_counters() {
        let empty = ClearStats::default();
        assert_eq!(add_score(1, 1, empty, 0, 0).stats.singles, 1);
        assert_eq!(add_score(2, 1, empty, 0, 0).stats.doubles, 1);
        assert_eq!(add_score(3, 1, empty, 0, 0).stats.triples, 1);
        let tetris = add_score(4, 1, empty, 0, 0).stats;
        assert_eq!(
            tetris,
            ClearStats {
                tetris: 1,
                ..ClearStats::default()
            }
        );

        let existing = ClearStats {
            singles: 2,
            doubles: 1,
            ..ClearStats::default()
        };
        let stats = add_score(1, 1, existing, 0, 0).stats;
        assert_eq!((stats.singles, stats.doubles), (3, 1));
        assert_eq!(stats.total_clears(), 4);
    }

    #[test]
    fn test_level_progression() {
        let empty = ClearStats::default();

        let exact = add_score(4, 1, empty, 6, 6);
        assert_eq!((exact.new_level, exact.new_lines_in_level), (2, 0));
        assert_eq!(exact.new_lines, 10);

        let under = add_score(1, 1, empty, 0, 5);
        assert_eq!((under.new_level, under.new_lines_in_level), (1, 6));

        let over = add_score(4, 1, empty, 0, 9);
        assert_eq!((over.new_level, over.new_lines_in_level), (2, 3));

        // Points use the level before the clear.
        assert_eq!(over.points, 800);
    }

    #[test]
    fn test_level_can_advance_more_than_once() {
        // A caller restoring a save may hand in a large backlog.
        let outcome = add_score(2, 1, ClearStats::default(), 0, 28);
        assert_eq!((outcome.new_level, outcome.new_lines_in_level), (4, 0));
    }

    #[test]
    fn test_score_state_accumulates() {
        let state = ScoreState::default();
        assert_eq!(state.level, 1);
        assert_eq!(state.gravity_interval(), Duration::from_millis(800));

        let (state, points) = state.apply_clear(4);
        assert_eq!(points, 800);
        let (state, points) = state.apply_clear(0);
        assert_eq!(points, 0);
        let (state, points) = state.apply_clear(4);
        assert_eq!(points, 800);
        let (state, points) = state.apply_clear(2);
        // 10 lines reached: level 2, this clear still scored at level 1.
        assert_eq!(points, 300);
        assert_eq!(state.level, 2);
        assert_eq!(state.lines, 10);
        assert_eq!(state.lines_in_level, 0);
        assert_eq!(state.score, 1900);
        assert_eq!(state.stats.tetris, 2);
        assert_eq!(state.stats.doubles, 1);

        let (state, points) = state.apply_clear(1);
        assert_eq!(points, 200);
        assert_eq!(state.score, 2100);
    }
}
