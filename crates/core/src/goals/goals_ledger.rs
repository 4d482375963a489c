//! XP, milestone and streak bookkeeping shared by personal and team goals.
//!
//! The ledger is pure: every operation mutates a loaded [`Goal`] in memory and
//! takes the current instant explicitly. Persisting the result is the caller's
//! job (see `GoalService`).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use uuid::Uuid;

use super::goals_model::{
    Goal, GoalLog, GoalScope, GoalStatus, Milestone, MilestoneUpdate, NewGoalLog, NewMilestone,
};
use crate::constants::{DEFAULT_LOG_XP, DEFAULT_MILESTONE_XP, GOAL_COMPLETION_BONUS_XP};
use crate::errors::{Error, Result};
use crate::utils::time_utils::{calendar_day_from_utc, DEFAULT_LEDGER_TZ};

/// Scope-specific ledger rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// XP credited once when the goal is completed, if any.
    pub completion_bonus_xp: Option<u32>,
}

impl LedgerPolicy {
    pub const PERSONAL: LedgerPolicy = LedgerPolicy {
        completion_bonus_xp: Some(GOAL_COMPLETION_BONUS_XP),
    };

    pub const TEAM: LedgerPolicy = LedgerPolicy {
        completion_bonus_xp: None,
    };

    pub fn for_scope(scope: &GoalScope) -> Self {
        match scope {
            GoalScope::User(_) => Self::PERSONAL,
            GoalScope::Team(_) => Self::TEAM,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GoalLedger {
    policy: LedgerPolicy,
    timezone: Tz,
}

impl GoalLedger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            policy,
            timezone: DEFAULT_LEDGER_TZ,
        }
    }

    pub fn for_scope(scope: &GoalScope) -> Self {
        Self::new(LedgerPolicy::for_scope(scope))
    }

    /// Timezone used to decide which calendar day a log falls on.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    // --- Milestones ---

    /// Appends an incomplete milestone and returns its id.
    pub fn add_milestone(
        &self,
        goal: &mut Goal,
        new_milestone: NewMilestone,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let title = new_milestone.title.trim();
        if title.is_empty() {
            return Err(Error::missing_field("title"));
        }
        let milestone = Milestone {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: new_milestone.description.unwrap_or_default().trim().to_string(),
            target_date: new_milestone.target_date,
            xp_reward: new_milestone.xp_reward.unwrap_or(DEFAULT_MILESTONE_XP),
            completed: false,
            completed_at: None,
            assignee: new_milestone.assignee,
            created_at: now,
            updated_at: now,
        };
        let id = milestone.id.clone();
        goal.milestones.push(milestone);
        goal.updated_at = now;
        Ok(id)
    }

    /// Applies a milestone patch. A `completed` flag equal to the current
    /// state is ignored; otherwise it routes to complete/reopen.
    pub fn update_milestone(
        &self,
        goal: &mut Goal,
        milestone_id: &str,
        update: MilestoneUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(Error::invalid_input("Milestone title cannot be empty"));
            }
        }

        let milestone = goal.milestone_mut(milestone_id)?;
        let was_completed = milestone.completed;
        let previous_reward = milestone.xp_reward;

        if let Some(title) = update.title {
            milestone.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            milestone.description = description.trim().to_string();
        }
        if let Some(target_date) = update.target_date {
            milestone.target_date = target_date;
        }
        if let Some(assignee) = update.assignee {
            milestone.assignee = assignee;
        }
        if let Some(xp_reward) = update.xp_reward {
            milestone.xp_reward = xp_reward;
        }
        milestone.updated_at = now;
        let new_reward = milestone.xp_reward;

        // Keep the credited amount equal to the current reward so a later
        // reopen subtracts exactly what was added.
        if was_completed && previous_reward != new_reward {
            debit(goal, previous_reward, "milestone reward change");
            credit(goal, new_reward);
        }

        match update.completed {
            Some(true) => {
                self.complete_milestone(goal, milestone_id, now)?;
            }
            Some(false) if was_completed => self.reopen_milestone(goal, milestone_id, now)?,
            _ => {}
        }
        goal.updated_at = now;
        Ok(())
    }

    /// Marks a milestone completed and credits its reward.
    ///
    /// Returns `false` without touching XP if it was already completed.
    pub fn complete_milestone(
        &self,
        goal: &mut Goal,
        milestone_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let milestone = goal.milestone_mut(milestone_id)?;
        if milestone.completed {
            debug!(
                "Milestone {} on goal {} already completed, nothing to award",
                milestone_id, goal.id
            );
            return Ok(false);
        }
        milestone.completed = true;
        milestone.completed_at = Some(now);
        milestone.updated_at = now;
        let reward = milestone.xp_reward;

        credit(goal, reward);
        goal.updated_at = now;
        Ok(true)
    }

    /// Reverts a completed milestone and takes its reward back.
    pub fn reopen_milestone(
        &self,
        goal: &mut Goal,
        milestone_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let milestone = goal.milestone_mut(milestone_id)?;
        if !milestone.completed {
            return Err(Error::invalid_state(format!(
                "Milestone '{}' is not completed",
                milestone_id
            )));
        }
        milestone.completed = false;
        milestone.completed_at = None;
        milestone.updated_at = now;
        let reward = milestone.xp_reward;

        debit(goal, reward, "milestone reopened");
        goal.updated_at = now;
        Ok(())
    }

    /// Removes a milestone, taking back its reward if it was completed.
    pub fn delete_milestone(
        &self,
        goal: &mut Goal,
        milestone_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Milestone> {
        let index = goal
            .milestones
            .iter()
            .position(|m| m.id == milestone_id)
            .ok_or_else(|| Error::not_found(format!("Milestone '{}'", milestone_id)))?;
        let removed = goal.milestones.remove(index);
        if removed.completed {
            debit(goal, removed.xp_reward, "completed milestone deleted");
        }
        goal.updated_at = now;
        Ok(removed)
    }

    // --- Logs ---

    /// Appends a progress log, credits its XP and advances the streak.
    ///
    /// Empty content fails before anything on the goal changes.
    pub fn add_log(
        &self,
        goal: &mut Goal,
        new_log: NewGoalLog,
        author: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let content = new_log.content.trim();
        if content.is_empty() {
            return Err(Error::missing_field("content"));
        }
        let log = GoalLog {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            xp_earned: new_log.xp_earned.unwrap_or(DEFAULT_LOG_XP),
            mood: new_log.mood.unwrap_or_default(),
            user_id: author,
            created_at: now,
        };
        let id = log.id.clone();

        credit(goal, log.xp_earned);
        goal.streak_days = self.next_streak(goal, now);
        goal.last_log_date = Some(now);
        goal.logs.push(log);
        goal.updated_at = now;
        Ok(id)
    }

    /// Removes a log and takes its XP back. The streak is forward-only and
    /// is not recomputed.
    pub fn delete_log(&self, goal: &mut Goal, log_id: &str, now: DateTime<Utc>) -> Result<GoalLog> {
        let index = goal
            .logs
            .iter()
            .position(|l| l.id == log_id)
            .ok_or_else(|| Error::not_found(format!("Log '{}'", log_id)))?;
        let removed = goal.logs.remove(index);
        debit(goal, removed.xp_earned, "log deleted");
        goal.updated_at = now;
        Ok(removed)
    }

    /// Streak value after logging at `now`.
    pub fn next_streak(&self, goal: &Goal, now: DateTime<Utc>) -> u32 {
        let today = calendar_day_from_utc(now, self.timezone);
        let previous = goal
            .last_log_date
            .map(|date| calendar_day_from_utc(date, self.timezone));

        match previous {
            Some(day) if day == today => goal.streak_days,
            Some(day) if today.pred_opt() == Some(day) => goal.streak_days.saturating_add(1),
            _ => 1,
        }
    }

    // --- Status ---

    pub fn complete_goal(&self, goal: &mut Goal, now: DateTime<Utc>) -> Result<bool> {
        self.transition_status(goal, GoalStatus::Completed, now)
    }

    /// Moves a completed goal back to active. Already active goals are left
    /// as they are.
    pub fn reopen_goal(&self, goal: &mut Goal, now: DateTime<Utc>) -> Result<bool> {
        match goal.status {
            GoalStatus::Completed | GoalStatus::Active => {
                self.transition_status(goal, GoalStatus::Active, now)
            }
            other => Err(Error::invalid_state(format!(
                "Only completed goals can be reopened (goal is {})",
                other
            ))),
        }
    }

    /// Applies a status change along the allowed edges:
    /// `active <-> completed`, `active <-> paused`, `active -> abandoned`.
    ///
    /// Returns `false` when the goal already has the target status.
    pub fn transition_status(
        &self,
        goal: &mut Goal,
        target: GoalStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if !target.allowed_for(&goal.scope) {
            return Err(Error::invalid_input(format!(
                "Status '{}' is not available for {} goals",
                target,
                goal.scope.kind()
            )));
        }
        if goal.status == target {
            return Ok(false);
        }

        use GoalStatus::*;
        match (goal.status, target) {
            (Active, Completed) => {
                goal.completed_date = Some(now);
                if let Some(bonus) = self.policy.completion_bonus_xp {
                    if !goal.completion_bonus_awarded {
                        credit(goal, bonus);
                        goal.completion_bonus_awarded = true;
                    }
                }
            }
            (Completed, Active) => {
                goal.completed_date = None;
                if goal.completion_bonus_awarded {
                    let bonus = self
                        .policy
                        .completion_bonus_xp
                        .unwrap_or(GOAL_COMPLETION_BONUS_XP);
                    debit(goal, bonus, "goal reopened");
                    goal.completion_bonus_awarded = false;
                }
            }
            (Active, Paused) | (Paused, Active) | (Active, Abandoned) => {}
            (from, to) => {
                return Err(Error::invalid_state(format!(
                    "Cannot move goal from '{}' to '{}'",
                    from, to
                )));
            }
        }

        debug!("Goal {} status {} -> {}", goal.id, goal.status, target);
        goal.status = target;
        goal.updated_at = now;
        Ok(true)
    }
}

fn credit(goal: &mut Goal, xp: u32) {
    goal.total_xp = goal.total_xp.saturating_add(xp);
}

/// Subtracts XP, clamping at zero. Hitting the clamp means an earlier credit
/// is missing, which is logged rather than treated as fatal.
fn debit(goal: &mut Goal, xp: u32, reason: &str) {
    if xp > goal.total_xp {
        warn!(
            "Goal {}: debit of {} XP ({}) exceeds balance of {}; clamping to 0",
            goal.id, xp, reason, goal.total_xp
        );
        goal.total_xp = 0;
    } else {
        goal.total_xp -= xp;
    }
}
