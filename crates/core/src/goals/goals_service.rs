use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::debug;
use uuid::Uuid;

use super::goal_locks::GoalLocks;
use super::goals_ledger::GoalLedger;
use super::goals_model::{
    Goal, GoalFilter, GoalScope, GoalStatus, GoalUpdate, MilestoneUpdate, NewGoal, NewGoalLog,
    NewMilestone,
};
use super::goals_stats::{GoalStats, TeamGoalAnalytics};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::utils::time_utils::{Clock, SystemClock, DEFAULT_LEDGER_TZ};

/// Service for personal and team goals.
///
/// Every mutation loads the goal, applies a ledger operation in memory and
/// writes the whole document back while holding that goal's lock.
pub struct GoalService {
    repository: Arc<dyn GoalRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    locks: GoalLocks,
}

impl GoalService {
    pub fn new(
        repository: Arc<dyn GoalRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        GoalService {
            repository,
            event_sink,
            clock: Arc::new(SystemClock),
            timezone: DEFAULT_LEDGER_TZ,
            locks: GoalLocks::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shares a lock table with other services working on the same goals.
    pub fn with_locks(mut self, locks: GoalLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Timezone that decides calendar days for streaks.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn ledger(&self, scope: &GoalScope) -> GoalLedger {
        GoalLedger::for_scope(scope).with_timezone(self.timezone)
    }

    /// Read-modify-write of one goal under its lock.
    ///
    /// `op` returns the events to emit once the write succeeded. If `op`
    /// fails nothing is persisted.
    async fn mutate<F>(&self, scope: &GoalScope, goal_id: &str, op: F) -> Result<Goal>
    where
        F: FnOnce(&GoalLedger, &mut Goal, DateTime<Utc>) -> Result<Vec<DomainEvent>> + Send,
    {
        let _guard = self.locks.acquire(goal_id).await;
        let mut goal = self.repository.get_goal(scope, goal_id)?;
        let now = self.clock.now();
        let events = op(&self.ledger(scope), &mut goal, now)?;
        let saved = self.repository.save_goal(goal).await?;
        self.event_sink.emit_batch(events);
        Ok(saved)
    }

    fn build_goal(
        &self,
        scope: &GoalScope,
        created_by: &str,
        new_goal: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        let NewGoal {
            title,
            description,
            category,
            priority,
            visibility,
            target_date,
            start_date,
            tags,
            assignees,
            milestones,
        } = new_goal;

        let mut goal = Goal {
            id: Uuid::new_v4().to_string(),
            scope: scope.clone(),
            title: title.trim().to_string(),
            description: description.unwrap_or_default().trim().to_string(),
            category: category.unwrap_or_default(),
            status: GoalStatus::Active,
            priority: priority.unwrap_or_default(),
            visibility: visibility.unwrap_or_default(),
            tags,
            assignees: if scope.is_team() { assignees } else { Vec::new() },
            created_by: Some(created_by.to_string()),
            target_date,
            start_date: start_date.unwrap_or(now),
            completed_date: None,
            milestones: Vec::new(),
            logs: Vec::new(),
            total_xp: 0,
            streak_days: 0,
            last_log_date: None,
            completion_bonus_awarded: false,
            created_at: now,
            updated_at: now,
        };

        let ledger = self.ledger(scope);
        for milestone in milestones {
            ledger.add_milestone(&mut goal, milestone, now)?;
        }
        Ok(goal)
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn list_goals(&self, scope: &GoalScope, filter: &GoalFilter) -> Result<Vec<Goal>> {
        self.repository.list_goals(scope, filter)
    }

    fn get_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal> {
        self.repository.get_goal(scope, goal_id)
    }

    async fn create_goal(
        &self,
        scope: &GoalScope,
        created_by: &str,
        new_goal: NewGoal,
    ) -> Result<Goal> {
        new_goal.validate(scope)?;
        let goal = self.build_goal(scope, created_by, new_goal, self.clock.now())?;
        debug!("Creating goal {} for {}", goal.id, scope);

        let created = self.repository.insert_goal(goal).await?;
        self.event_sink.emit(DomainEvent::goal_created(&created));
        Ok(created)
    }

    async fn update_goal(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        update: GoalUpdate,
    ) -> Result<Goal> {
        update.validate(scope)?;
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            let GoalUpdate {
                title,
                description,
                category,
                status,
                priority,
                visibility,
                target_date,
                tags,
                assignees,
            } = update;

            // The status edge is checked first so a rejected transition leaves
            // the rest of the patch unapplied.
            let completed = match status {
                Some(target) => {
                    ledger.transition_status(goal, target, now)? && target == GoalStatus::Completed
                }
                None => false,
            };

            if let Some(title) = title {
                goal.title = title.trim().to_string();
            }
            if let Some(description) = description {
                goal.description = description.trim().to_string();
            }
            if let Some(category) = category {
                goal.category = category;
            }
            if let Some(priority) = priority {
                goal.priority = priority;
            }
            if let Some(visibility) = visibility {
                goal.visibility = visibility;
            }
            if let Some(target_date) = target_date {
                goal.target_date = target_date;
            }
            if let Some(tags) = tags {
                goal.tags = tags;
            }
            if let Some(assignees) = assignees {
                if goal.scope.is_team() {
                    goal.assignees = assignees;
                }
            }
            goal.updated_at = now;

            let mut events = vec![DomainEvent::goal_updated(goal)];
            if completed {
                events.push(DomainEvent::goal_completed(goal));
            }
            Ok(events)
        })
        .await
    }

    async fn delete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(goal_id).await;
        let deleted = self.repository.delete_goal(scope, goal_id).await?;
        if deleted == 0 {
            return Err(Error::not_found(format!("Goal '{}'", goal_id)));
        }
        self.event_sink.emit(DomainEvent::goal_deleted(scope, goal_id));
        Ok(())
    }

    async fn complete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal> {
        self.mutate(scope, goal_id, |ledger, goal, now| {
            if ledger.complete_goal(goal, now)? {
                Ok(vec![DomainEvent::goal_completed(goal)])
            } else {
                Ok(Vec::new())
            }
        })
        .await
    }

    async fn reopen_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal> {
        self.mutate(scope, goal_id, |ledger, goal, now| {
            if ledger.reopen_goal(goal, now)? {
                Ok(vec![DomainEvent::goal_updated(goal)])
            } else {
                Ok(Vec::new())
            }
        })
        .await
    }

    async fn add_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone: NewMilestone,
    ) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            ledger.add_milestone(goal, milestone, now)?;
            Ok(vec![DomainEvent::goal_updated(goal)])
        })
        .await
    }

    async fn update_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
        update: MilestoneUpdate,
    ) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            let was_completed = goal.milestone(milestone_id).map(|m| m.completed);
            ledger.update_milestone(goal, milestone_id, update, now)?;

            let mut events = vec![DomainEvent::goal_updated(goal)];
            if let Some(milestone) = goal.milestone(milestone_id) {
                if was_completed == Some(false) && milestone.completed {
                    events.push(DomainEvent::milestone_completed(goal, milestone));
                }
            }
            Ok(events)
        })
        .await
    }

    async fn complete_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            if !ledger.complete_milestone(goal, milestone_id, now)? {
                return Ok(Vec::new());
            }
            let milestone = goal
                .milestone(milestone_id)
                .ok_or_else(|| Error::not_found(format!("Milestone '{}'", milestone_id)))?;
            Ok(vec![DomainEvent::milestone_completed(goal, milestone)])
        })
        .await
    }

    async fn reopen_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            ledger.reopen_milestone(goal, milestone_id, now)?;
            Ok(vec![DomainEvent::goal_updated(goal)])
        })
        .await
    }

    async fn delete_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            ledger.delete_milestone(goal, milestone_id, now)?;
            Ok(vec![DomainEvent::goal_updated(goal)])
        })
        .await
    }

    async fn add_log(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        author: &str,
        log: NewGoalLog,
    ) -> Result<Goal> {
        // Reject before taking the lock or touching storage
        if log.content.trim().is_empty() {
            return Err(Error::missing_field("content"));
        }
        let author = author.to_string();
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            let log_id = ledger.add_log(goal, log, Some(author), now)?;
            let log = goal
                .log(&log_id)
                .ok_or_else(|| Error::Unexpected("appended log is missing".to_string()))?;
            Ok(vec![DomainEvent::log_added(goal, log)])
        })
        .await
    }

    async fn delete_log(&self, scope: &GoalScope, goal_id: &str, log_id: &str) -> Result<Goal> {
        self.mutate(scope, goal_id, move |ledger, goal, now| {
            ledger.delete_log(goal, log_id, now)?;
            Ok(vec![DomainEvent::goal_updated(goal)])
        })
        .await
    }

    fn get_stats(&self, scope: &GoalScope) -> Result<GoalStats> {
        let goals = self.repository.list_goals(scope, &GoalFilter::default())?;
        Ok(GoalStats::from_goals(&goals))
    }

    fn get_team_analytics(&self, team_id: &str) -> Result<TeamGoalAnalytics> {
        let goals = self
            .repository
            .list_goals(&GoalScope::team(team_id), &GoalFilter::default())?;
        Ok(TeamGoalAnalytics::from_goals(&goals))
    }
}
