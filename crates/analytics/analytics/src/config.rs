//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable parameters for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trailing window, in hours, within which repeat views by the same
    /// actor on the same entity are not double-counted.
    pub dedup_window_hours: i64,
    /// Number of entries in item-level leaderboards.
    pub item_leaderboard_size: usize,
    /// Number of entries in owner-rollup leaderboards.
    pub rollup_leaderboard_size: usize,
    /// Number of entries in the recent-profile-viewers list.
    pub recent_viewers_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedup_window_hours: 24,
            item_leaderboard_size: 5,
            rollup_leaderboard_size: 10,
            recent_viewers_size: 10,
        }
    }
}

impl EngineConfig {
    /// Returns the view-deduplication window as a duration.
    pub fn dedup_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.dedup_window_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.dedup_window_hours, 24);
        assert_eq!(config.item_leaderboard_size, 5);
        assert_eq!(config.rollup_leaderboard_size, 10);
        assert_eq!(config.recent_viewers_size, 10);
        assert_eq!(config.dedup_window(), chrono::Duration::hours(24));
    }
}
