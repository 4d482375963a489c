//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::goals::{Goal, GoalLog, GoalScope, Milestone};

/// Domain events emitted by the goal service after successful mutations.
///
/// These events are facts about goal data changes. Runtime adapters turn
/// them into user-facing notifications (e.g. the server's event stream).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    GoalCreated {
        scope: GoalScope,
        goal_id: String,
        title: String,
    },

    /// Any other change to the goal document.
    GoalUpdated { scope: GoalScope, goal_id: String },

    GoalDeleted { scope: GoalScope, goal_id: String },

    /// A milestone moved from open to completed and its XP was credited.
    MilestoneCompleted {
        scope: GoalScope,
        goal_id: String,
        milestone_id: String,
        title: String,
        xp_reward: u32,
    },

    /// A goal moved to `completed`.
    GoalCompleted {
        scope: GoalScope,
        goal_id: String,
        title: String,
        total_xp: u32,
    },

    LogAdded {
        scope: GoalScope,
        goal_id: String,
        log_id: String,
        xp_earned: u32,
        streak_days: u32,
    },
}

impl DomainEvent {
    pub fn goal_created(goal: &Goal) -> Self {
        Self::GoalCreated {
            scope: goal.scope.clone(),
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
        }
    }

    pub fn goal_updated(goal: &Goal) -> Self {
        Self::GoalUpdated {
            scope: goal.scope.clone(),
            goal_id: goal.id.clone(),
        }
    }

    pub fn goal_deleted(scope: &GoalScope, goal_id: &str) -> Self {
        Self::GoalDeleted {
            scope: scope.clone(),
            goal_id: goal_id.to_string(),
        }
    }

    pub fn milestone_completed(goal: &Goal, milestone: &Milestone) -> Self {
        Self::MilestoneCompleted {
            scope: goal.scope.clone(),
            goal_id: goal.id.clone(),
            milestone_id: milestone.id.clone(),
            title: milestone.title.clone(),
            xp_reward: milestone.xp_reward,
        }
    }

    pub fn goal_completed(goal: &Goal) -> Self {
        Self::GoalCompleted {
            scope: goal.scope.clone(),
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            total_xp: goal.total_xp,
        }
    }

    pub fn log_added(goal: &Goal, log: &GoalLog) -> Self {
        Self::LogAdded {
            scope: goal.scope.clone(),
            goal_id: goal.id.clone(),
            log_id: log.id.clone(),
            xp_earned: log.xp_earned,
            streak_days: goal.streak_days,
        }
    }

    /// Stable event name used by transports (e.g. the SSE `event:` field).
    pub fn name(&self) -> &'static str {
        match self {
            Self::GoalCreated { .. } => "goal:created",
            Self::GoalUpdated { .. } => "goal:updated",
            Self::GoalDeleted { .. } => "goal:deleted",
            Self::MilestoneCompleted { .. } => "goal:milestone-completed",
            Self::GoalCompleted { .. } => "goal:completed",
            Self::LogAdded { .. } => "goal:log-added",
        }
    }

    pub fn scope(&self) -> &GoalScope {
        match self {
            Self::GoalCreated { scope, .. }
            | Self::GoalUpdated { scope, .. }
            | Self::GoalDeleted { scope, .. }
            | Self::MilestoneCompleted { scope, .. }
            | Self::GoalCompleted { scope, .. }
            | Self::LogAdded { scope, .. } => scope,
        }
    }
}
