//! Aggregated goal statistics for dashboards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::goals_model::{Goal, GoalLog, GoalStatus};
use crate::constants::RECENT_ACTIVITY_LIMIT;

/// Achievement summary over every goal in a scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_xp: u64,
    pub total_milestones: usize,
    pub completed_milestones: usize,
    pub total_logs: usize,
    pub longest_streak: u32,
    pub category_breakdown: BTreeMap<String, usize>,
}

impl GoalStats {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let mut stats = GoalStats {
            total_goals: goals.len(),
            ..Default::default()
        };
        for goal in goals {
            match goal.status {
                GoalStatus::Active => stats.active_goals += 1,
                GoalStatus::Completed => stats.completed_goals += 1,
                _ => {}
            }
            stats.total_xp += u64::from(goal.total_xp);
            stats.total_milestones += goal.milestones.len();
            stats.completed_milestones += goal.completed_milestones();
            stats.total_logs += goal.logs.len();
            stats.longest_streak = stats.longest_streak.max(goal.streak_days);
            *stats
                .category_breakdown
                .entry(goal.category.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

/// A log entry together with the goal it was posted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamActivity {
    pub goal_id: String,
    pub goal_title: String,
    #[serde(flatten)]
    pub log: GoalLog,
}

/// Team dashboard figures over a team's shared goals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGoalAnalytics {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub active_goals: usize,
    pub total_xp: u64,
    /// Most recent logs across all of the team's goals, newest first.
    pub recent_activity: Vec<TeamActivity>,
}

impl TeamGoalAnalytics {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let mut recent_activity: Vec<TeamActivity> = goals
            .iter()
            .flat_map(|goal| {
                goal.logs.iter().map(move |log| TeamActivity {
                    goal_id: goal.id.clone(),
                    goal_title: goal.title.clone(),
                    log: log.clone(),
                })
            })
            .collect();
        recent_activity.sort_by(|a, b| b.log.created_at.cmp(&a.log.created_at));
        recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

        TeamGoalAnalytics {
            total_goals: goals.len(),
            completed_goals: goals
                .iter()
                .filter(|g| g.status == GoalStatus::Completed)
                .count(),
            active_goals: goals
                .iter()
                .filter(|g| g.status == GoalStatus::Active)
                .count(),
            total_xp: goals.iter().map(|g| u64::from(g.total_xp)).sum(),
            recent_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::goals_model::{
        GoalCategory, GoalPriority, GoalScope, Milestone, Mood, Visibility,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn goal(id: &str, status: GoalStatus, category: GoalCategory, xp: u32, streak: u32) -> Goal {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Goal {
            id: id.to_string(),
            scope: GoalScope::team("t-1"),
            title: format!("Goal {}", id),
            description: String::new(),
            category,
            status,
            priority: GoalPriority::Medium,
            visibility: Visibility::Private,
            tags: vec![],
            assignees: vec![],
            created_by: None,
            target_date: None,
            start_date: now,
            completed_date: None,
            milestones: vec![],
            logs: vec![],
            total_xp: xp,
            streak_days: streak,
            last_log_date: None,
            completion_bonus_awarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn log(id: &str, minutes: i64) -> GoalLog {
        GoalLog {
            id: id.to_string(),
            content: "progress".to_string(),
            xp_earned: 5,
            mood: Mood::Good,
            user_id: Some("u-1".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_stats_aggregate_every_goal() {
        let mut first = goal("a", GoalStatus::Active, GoalCategory::Health, 30, 4);
        let now = first.created_at;
        first.milestones.push(Milestone {
            id: "m-1".to_string(),
            title: "m".to_string(),
            description: String::new(),
            target_date: None,
            xp_reward: 10,
            completed: true,
            completed_at: Some(now),
            assignee: None,
            created_at: now,
            updated_at: now,
        });
        first.logs.push(log("l-1", 0));
        let second = goal("b", GoalStatus::Completed, GoalCategory::Health, 70, 9);
        let third = goal("c", GoalStatus::Paused, GoalCategory::Career, 0, 0);

        let stats = GoalStats::from_goals(&[first, second, third]);
        assert_eq!(stats.total_goals, 3);
        assert_eq!(stats.active_goals, 1);
        assert_eq!(stats.completed_goals, 1);
        assert_eq!(stats.total_xp, 100);
        assert_eq!(stats.total_milestones, 1);
        assert_eq!(stats.completed_milestones, 1);
        assert_eq!(stats.total_logs, 1);
        assert_eq!(stats.longest_streak, 9);
        assert_eq!(stats.category_breakdown.get("health"), Some(&2));
        assert_eq!(stats.category_breakdown.get("career"), Some(&1));
    }

    #[test]
    fn test_stats_of_nothing_are_zero() {
        assert_eq!(GoalStats::from_goals(&[]), GoalStats::default());
    }

    #[test]
    fn test_recent_activity_is_newest_first_and_capped() {
        let mut first = goal("a", GoalStatus::Active, GoalCategory::Research, 0, 0);
        let mut second = goal("b", GoalStatus::Completed, GoalCategory::Design, 0, 0);
        for i in 0..8 {
            first.logs.push(log(&format!("a-{}", i), i * 2));
            second.logs.push(log(&format!("b-{}", i), i * 2 + 1));
        }

        let analytics = TeamGoalAnalytics::from_goals(&[first, second]);
        assert_eq!(analytics.total_goals, 2);
        assert_eq!(analytics.active_goals, 1);
        assert_eq!(analytics.completed_goals, 1);
        assert_eq!(analytics.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(analytics.recent_activity[0].log.id, "b-7");
        assert_eq!(analytics.recent_activity[0].goal_id, "b");
        assert_eq!(analytics.recent_activity[1].log.id, "a-7");
    }
}
