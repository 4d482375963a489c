//! Goals module - domain models, the XP ledger, services, and traits.

mod goal_locks;
mod goals_ledger;
mod goals_model;
mod goals_service;
mod goals_stats;
mod goals_traits;


pub use goal_locks::{GoalLockGuard, GoalLocks};
pub use goals_ledger::{GoalLedger, LedgerPolicy};
pub use goals_model::{
    Goal, GoalCategory, GoalFilter, GoalLog, GoalPriority, GoalScope, GoalStatus, GoalUpdate,
    Milestone, MilestoneUpdate, Mood, NewGoal, NewGoalLog, NewMilestone, Visibility,
};
pub use goals_service::GoalService;
pub use goals_stats::{GoalStats, TeamActivity, TeamGoalAnalytics};
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
