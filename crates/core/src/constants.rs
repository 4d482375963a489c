/// Bonus XP credited once when a personal goal is completed
pub const GOAL_COMPLETION_BONUS_XP: u32 = 50;

/// XP reward for a milestone created without an explicit reward
pub const DEFAULT_MILESTONE_XP: u32 = 10;

/// XP earned by a log created without an explicit amount
pub const DEFAULT_LOG_XP: u32 = 5;

/// Number of logs returned in team analytics' recent activity
pub const RECENT_ACTIVITY_LIMIT: usize = 10;
