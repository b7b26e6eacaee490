//! Leveling curve.
//!
//! A level typed into the sheet always wins. Without one, the level follows a
//! square-root curve over experience: level `n` starts at `100 * (n - 1)^2` xp.

use serde::{Deserialize, Serialize};

use super::{MAX_LEVEL, MIN_LEVEL};

const XP_SCALE: u64 = 100;

/// Where a resolved level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    /// Entered directly on the sheet.
    Manual,
    /// Derived from accumulated experience.
    Experience,
}

/// Level reached with the given experience.
pub fn level_from_xp(xp: u64) -> u32 {
    let steps = integer_sqrt(xp / XP_SCALE);
    let level = steps.saturating_add(u64::from(MIN_LEVEL));
    u32::try_from(level).unwrap_or(MAX_LEVEL).min(MAX_LEVEL)
}

/// Experience at which `level` starts.
pub fn xp_for_level(level: u32) -> u64 {
    let steps = u64::from(level.clamp(MIN_LEVEL, MAX_LEVEL) - MIN_LEVEL);
    steps * steps * XP_SCALE
}

/// Floor of the square root, exact for every `u64`.
fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Newton iteration from above converges monotonically to floor(sqrt(n)).
    let mut x = n;
    let mut y = n / 2 + n % 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sqrt_is_floor() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(99), 9);
        assert_eq!(integer_sqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn integer_sqrt_near_top_of_range() {
        let root = u64::from(u32::MAX);
        assert_eq!(integer_sqrt(root * root), root);
        assert_eq!(integer_sqrt(root * root - 1), root - 1);
        assert_eq!(integer_sqrt(u64::MAX - 1), root);
        assert_eq!(integer_sqrt(2), 1);
        assert_eq!(integer_sqrt(1 << 62), 1 << 31);
    }

    #[test]
    fn curve_thresholds() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(99), 1);
        assert_eq!(level_from_xp(100), 2);
        assert_eq!(level_from_xp(399), 2);
        assert_eq!(level_from_xp(400), 3);
        assert_eq!(level_from_xp(u64::MAX), MAX_LEVEL);
    }

    #[test]
    fn xp_for_level_inverts_curve() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            let xp = xp_for_level(level);
            assert_eq!(level_from_xp(xp), level);
            if xp > 0 {
                assert_eq!(level_from_xp(xp - 1), level - 1);
            }
        }
    }

    #[test]
    fn curve_is_monotonic() {
        let mut previous = level_from_xp(0);
        for xp in (0..200_000).step_by(37) {
            let level = level_from_xp(xp);
            assert!(level >= previous);
            previous = level;
        }
    }
}
