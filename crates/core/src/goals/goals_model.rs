//! Goals domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Declares a string-backed enumeration whose wire values must stay stable
/// because they are persisted and exchanged with the web client.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(Error::invalid_input(format!(
                        "'{}' is not a valid {}",
                        other,
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Lifecycle status of a goal.
    pub enum GoalStatus {
        Active => "active",
        Paused => "paused",
        Completed => "completed",
        Abandoned => "abandoned",
    }
    default = Active;
}

string_enum! {
    /// Goal category. Personal and team goals draw from different subsets.
    pub enum GoalCategory {
        Health => "health",
        Career => "career",
        Learning => "learning",
        Personal => "personal",
        Financial => "financial",
        Social => "social",
        Development => "development",
        Design => "design",
        Marketing => "marketing",
        Research => "research",
        Other => "other",
    }
    default = Other;
}

string_enum! {
    /// Goal priority. `critical` is personal only, `urgent` is team only.
    pub enum GoalPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
        Urgent => "urgent",
    }
    default = Medium;
}

string_enum! {
    pub enum Visibility {
        Private => "private",
        Public => "public",
        Friends => "friends",
    }
    default = Private;
}

string_enum! {
    /// How the author felt when writing a progress log.
    pub enum Mood {
        Excellent => "excellent",
        Good => "good",
        Neutral => "neutral",
        Bad => "bad",
        Terrible => "terrible",
    }
    default = Neutral;
}

/// Ownership scope of a goal. Every lookup is filtered by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum GoalScope {
    User(String),
    Team(String),
}

impl GoalScope {
    pub fn user(id: impl Into<String>) -> Self {
        GoalScope::User(id.into())
    }

    pub fn team(id: impl Into<String>) -> Self {
        GoalScope::Team(id.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GoalScope::User(_) => "user",
            GoalScope::Team(_) => "team",
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            GoalScope::User(id) | GoalScope::Team(id) => id,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, GoalScope::Team(_))
    }

    /// Rebuilds a scope from its stored `(kind, owner_id)` pair.
    pub fn from_parts(kind: &str, owner_id: impl Into<String>) -> Result<Self> {
        match kind {
            "user" => Ok(GoalScope::User(owner_id.into())),
            "team" => Ok(GoalScope::Team(owner_id.into())),
            other => Err(Error::invalid_input(format!(
                "'{}' is not a valid goal scope",
                other
            ))),
        }
    }
}

impl fmt::Display for GoalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.owner_id())
    }
}

impl GoalStatus {
    pub fn allowed_for(&self, scope: &GoalScope) -> bool {
        !(scope.is_team() && *self == GoalStatus::Abandoned)
    }
}

impl GoalCategory {
    pub fn allowed_for(&self, scope: &GoalScope) -> bool {
        use GoalCategory::*;
        match self {
            Other => true,
            Health | Career | Learning | Personal | Financial | Social => !scope.is_team(),
            Development | Design | Marketing | Research => scope.is_team(),
        }
    }
}

impl GoalPriority {
    pub fn allowed_for(&self, scope: &GoalScope) -> bool {
        match self {
            GoalPriority::Critical => !scope.is_team(),
            GoalPriority::Urgent => scope.is_team(),
            _ => true,
        }
    }
}

/// A sub-objective of a goal awarding fixed XP on completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target_date: Option<DateTime<Utc>>,
    pub xp_reward: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Team member responsible for the milestone (team goals)
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A free-text progress entry on a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalLog {
    pub id: String,
    pub content: String,
    pub xp_earned: u32,
    pub mood: Mood,
    /// Author of the log (team goals record who posted it)
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Domain model representing a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub scope: GoalScope,
    pub title: String,
    pub description: String,
    pub category: GoalCategory,
    pub status: GoalStatus,
    pub priority: GoalPriority,
    pub visibility: Visibility,
    pub tags: Vec<String>,
    pub assignees: Vec<String>,
    pub created_by: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub start_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub milestones: Vec<Milestone>,
    pub logs: Vec<GoalLog>,
    pub total_xp: u32,
    pub streak_days: u32,
    pub last_log_date: Option<DateTime<Utc>>,
    pub completion_bonus_awarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Result<&mut Milestone> {
        self.milestones
            .iter_mut()
            .find(|m| m.id == milestone_id)
            .ok_or_else(|| Error::not_found(format!("Milestone '{}'", milestone_id)))
    }

    pub fn log(&self, log_id: &str) -> Option<&GoalLog> {
        self.logs.iter().find(|l| l.id == log_id)
    }

    pub fn completed_milestones(&self) -> usize {
        self.milestones.iter().filter(|m| m.completed).count()
    }
}

/// Input model for creating a new milestone
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMilestone {
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub xp_reward: Option<u32>,
    pub assignee: Option<String>,
}

impl NewMilestone {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_xp_reward(mut self, xp_reward: u32) -> Self {
        self.xp_reward = Some(xp_reward);
        self
    }
}

/// Patch for an existing milestone. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MilestoneUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub xp_reward: Option<u32>,
    pub completed: Option<bool>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub assignee: Option<Option<String>>,
}

/// Input model for appending a progress log
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGoalLog {
    pub content: String,
    pub xp_earned: Option<u32>,
    pub mood: Option<Mood>,
}

impl NewGoalLog {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_xp(mut self, xp_earned: u32) -> Self {
        self.xp_earned = Some(xp_earned);
        self
    }
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<GoalCategory>,
    pub priority: Option<GoalPriority>,
    pub visibility: Option<Visibility>,
    pub target_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub assignees: Vec<String>,
    pub milestones: Vec<NewMilestone>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, scope: &GoalScope) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::missing_field("title"));
        }
        validate_enumerations(scope, self.category, self.priority, None)?;
        for milestone in &self.milestones {
            if milestone.title.trim().is_empty() {
                return Err(Error::missing_field("milestones.title"));
            }
        }
        Ok(())
    }
}

/// Patch for an existing goal. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<GoalCategory>,
    pub status: Option<GoalStatus>,
    pub priority: Option<GoalPriority>,
    pub visibility: Option<Visibility>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
}

impl GoalUpdate {
    pub fn validate(&self, scope: &GoalScope) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::invalid_input("Goal title cannot be empty"));
            }
        }
        validate_enumerations(scope, self.category, self.priority, self.status)
    }
}

fn validate_enumerations(
    scope: &GoalScope,
    category: Option<GoalCategory>,
    priority: Option<GoalPriority>,
    status: Option<GoalStatus>,
) -> Result<()> {
    if let Some(category) = category {
        if !category.allowed_for(scope) {
            return Err(Error::invalid_input(format!(
                "Category '{}' is not available for {} goals",
                category,
                scope.kind()
            )));
        }
    }
    if let Some(priority) = priority {
        if !priority.allowed_for(scope) {
            return Err(Error::invalid_input(format!(
                "Priority '{}' is not available for {} goals",
                priority,
                scope.kind()
            )));
        }
    }
    if let Some(status) = status {
        if !status.allowed_for(scope) {
            return Err(Error::invalid_input(format!(
                "Status '{}' is not available for {} goals",
                status,
                scope.kind()
            )));
        }
    }
    Ok(())
}

/// Optional filters for listing goals
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalFilter {
    pub status: Option<GoalStatus>,
    pub category: Option<GoalCategory>,
}

impl GoalFilter {
    pub fn matches(&self, goal: &Goal) -> bool {
        self.status.map_or(true, |s| goal.status == s)
            && self.category.map_or(true, |c| goal.category == c)
    }
}
