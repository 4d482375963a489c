use crate::errors::Result;
use crate::goals::goals_model::{
    Goal, GoalFilter, GoalScope, GoalUpdate, MilestoneUpdate, NewGoal, NewGoalLog, NewMilestone,
};
use crate::goals::goals_stats::{GoalStats, TeamGoalAnalytics};
use async_trait::async_trait;

/// Trait for goal repository operations.
///
/// Goals are stored as whole documents: milestones and logs live inside the
/// goal and are written back together.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    /// Goals owned by `scope`, newest first.
    fn list_goals(&self, scope: &GoalScope, filter: &GoalFilter) -> Result<Vec<Goal>>;
    /// Fails with `Error::NotFound` if the goal is absent or owned by another scope.
    fn get_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal>;
    async fn insert_goal(&self, goal: Goal) -> Result<Goal>;
    /// Replaces the stored document (last writer wins).
    async fn save_goal(&self, goal: Goal) -> Result<Goal>;
    async fn delete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn list_goals(&self, scope: &GoalScope, filter: &GoalFilter) -> Result<Vec<Goal>>;
    fn get_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal>;
    async fn create_goal(
        &self,
        scope: &GoalScope,
        created_by: &str,
        new_goal: NewGoal,
    ) -> Result<Goal>;
    async fn update_goal(&self, scope: &GoalScope, goal_id: &str, update: GoalUpdate)
        -> Result<Goal>;
    async fn delete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<()>;

    async fn complete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal>;
    async fn reopen_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal>;

    async fn add_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone: NewMilestone,
    ) -> Result<Goal>;
    async fn update_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
        update: MilestoneUpdate,
    ) -> Result<Goal>;
    async fn complete_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal>;
    async fn reopen_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal>;
    async fn delete_milestone(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<Goal>;

    async fn add_log(
        &self,
        scope: &GoalScope,
        goal_id: &str,
        author: &str,
        log: NewGoalLog,
    ) -> Result<Goal>;
    async fn delete_log(&self, scope: &GoalScope, goal_id: &str, log_id: &str) -> Result<Goal>;

    fn get_stats(&self, scope: &GoalScope) -> Result<GoalStats>;
    fn get_team_analytics(&self, team_id: &str) -> Result<TeamGoalAnalytics>;
}
