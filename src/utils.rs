//! Utility functions for randomized pacing and timestamp conversions.
//!
//! This module provides helpers used throughout the bot to draw random
//! delays and points, and to convert the service's millisecond timestamps.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::config::{DelayRange, PointsRange};

/// Draws a random duration within the range, bounds included.
///
/// A range with `min >= max` always yields `min`.
///
/// # Examples
///
/// ```
/// # use blumbot::{config::DelayRange, utils::random_duration};
/// let delay = random_duration(&DelayRange(30.0, 40.0));
/// assert!(delay.as_secs_f64() >= 30.0 && delay.as_secs_f64() <= 40.0);
/// ```
pub fn random_duration(range: &DelayRange) -> Duration {
    let DelayRange(min, max) = *range;
    let secs = if min >= max {
        min
    } else {
        rand::rng().random_range(min..=max)
    };
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Draws the number of points submitted for one game.
pub fn random_points(range: &PointsRange) -> u32 {
    let PointsRange(min, max) = *range;
    if min >= max {
        return min;
    }
    rand::rng().random_range(min..=max)
}

/// Converts a millisecond timestamp into seconds, rounding down.
pub fn ms_to_secs(ms: i64) -> i64 {
    ms.div_euclid(1000)
}

/// Current unix time, in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Android devices the user agent is drawn from, as `(android version, model)`.
const ANDROID_DEVICES: [(&str, &str); 8] = [
    ("10", "SM-G973F"),
    ("11", "SM-A515F"),
    ("11", "Redmi Note 9 Pro"),
    ("12", "Pixel 6"),
    ("12", "SM-S906B"),
    ("13", "Pixel 7"),
    ("13", "2201117TG"),
    ("14", "Pixel 8"),
];

/// Random Android Chrome user agent.
pub fn random_user_agent() -> String {
    let mut rng = rand::rng();
    let (android, model) = ANDROID_DEVICES[rng.random_range(0..ANDROID_DEVICES.len())];
    let chrome = rng.random_range(110..=131);
    let build = rng.random_range(5000..=6800);
    let patch = rng.random_range(50..=200);

    format!(
        "Mozilla/5.0 (Linux; Android {}; {}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Mobile Safari/537.36",
        android, model, chrome, build, patch
    )
}

/// Random username for registration, `user` followed by six hex digits.
pub fn random_username() -> String {
    format!("user{:06x}", rand::rng().random_range(0..0x0100_0000u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_duration_in_range() {
        let range = DelayRange(30.0, 40.0);
        for _ in 0..100 {
            let secs = random_duration(&range).as_secs_f64();
            assert!((30.0..=40.0).contains(&secs));
        }
    }

    #[test]
    fn test_random_duration_degenerate_range() {
        assert_eq!(
            random_duration(&DelayRange(1.0, 1.0)),
            Duration::from_secs(1)
        );
        assert_eq!(random_duration(&DelayRange(0.0, 0.0)), Duration::ZERO);
    }

    #[test]
    fn test_random_duration_out_of_bounds_does_not_panic() {
        assert_eq!(
            random_duration(&DelayRange(f64::INFINITY, f64::INFINITY)),
            Duration::MAX
        );
        assert_eq!(random_duration(&DelayRange(1e300, 1e300)), Duration::MAX);
    }

    #[test]
    fn test_random_user_agent() {
        let user_agent = random_user_agent();
        assert!(user_agent.starts_with("Mozilla/5.0 (Linux; Android "));
        assert!(user_agent.contains(" Chrome/"));
        assert!(user_agent.ends_with(" Mobile Safari/537.36"));
    }

    #[test]
    fn test_random_points_in_range() {
        let range = PointsRange(190, 230);
        for _ in 0..100 {
            let points = random_points(&range);
            assert!((190..=230).contains(&points));
        }
        assert_eq!(random_points(&PointsRange(5, 5)), 5);
    }

    #[test]
    fn test_ms_to_secs_rounds_down() {
        assert_eq!(ms_to_secs(1_700_000_000_999), 1_700_000_000);
        assert_eq!(ms_to_secs(1_000), 1);
        assert_eq!(ms_to_secs(999), 0);
        assert_eq!(ms_to_secs(0), 0);
    }

    #[test]
    fn test_random_username() {
        let username = random_username();
        assert!(username.starts_with("user"));
        assert_eq!(username.len(), 10);
        assert!(username[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
