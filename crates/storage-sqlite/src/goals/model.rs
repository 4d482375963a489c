//! Database models for goals.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use novanest_core::errors::{DatabaseError, Error, Result};
use novanest_core::goals::{Goal, GoalScope};

use crate::errors::StorageError;

/// Database row for a goal. Milestones and logs live in JSON columns so
/// the whole aggregate is read and written as one row.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct GoalDB {
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub priority: String,
    pub visibility: String,
    pub tags: String,
    pub assignees: String,
    pub created_by: Option<String>,
    pub target_date: Option<NaiveDateTime>,
    pub start_date: NaiveDateTime,
    pub completed_date: Option<NaiveDateTime>,
    pub milestones: String,
    pub logs: String,
    pub total_xp: i64,
    pub streak_days: i64,
    pub last_log_date: Option<NaiveDateTime>,
    pub completion_bonus_awarded: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| StorageError::from(e).into())
}

fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        Error::Database(DatabaseError::CorruptDocument(format!(
            "column '{}': {}",
            column, e
        )))
    })
}

fn parse_column<T: FromStr>(column: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        Error::Database(DatabaseError::CorruptDocument(format!(
            "column '{}' holds unknown value '{}'",
            column, raw
        )))
    })
}

fn counter(column: &str, raw: i64) -> Result<u32> {
    u32::try_from(raw).map_err(|_| {
        Error::Database(DatabaseError::CorruptDocument(format!(
            "column '{}' is out of range: {}",
            column, raw
        )))
    })
}

fn utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

impl TryFrom<&Goal> for GoalDB {
    type Error = Error;

    fn try_from(goal: &Goal) -> Result<Self> {
        Ok(GoalDB {
            id: goal.id.clone(),
            owner_kind: goal.scope.kind().to_string(),
            owner_id: goal.scope.owner_id().to_string(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            category: goal.category.as_str().to_string(),
            status: goal.status.as_str().to_string(),
            priority: goal.priority.as_str().to_string(),
            visibility: goal.visibility.as_str().to_string(),
            tags: to_json(&goal.tags)?,
            assignees: to_json(&goal.assignees)?,
            created_by: goal.created_by.clone(),
            target_date: goal.target_date.map(|d| d.naive_utc()),
            start_date: goal.start_date.naive_utc(),
            completed_date: goal.completed_date.map(|d| d.naive_utc()),
            milestones: to_json(&goal.milestones)?,
            logs: to_json(&goal.logs)?,
            total_xp: i64::from(goal.total_xp),
            streak_days: i64::from(goal.streak_days),
            last_log_date: goal.last_log_date.map(|d| d.naive_utc()),
            completion_bonus_awarded: goal.completion_bonus_awarded,
            created_at: goal.created_at.naive_utc(),
            updated_at: goal.updated_at.naive_utc(),
        })
    }
}

impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self> {
        Ok(Goal {
            scope: GoalScope::from_parts(&db.owner_kind, db.owner_id.clone())
                .map_err(|_| {
                    Error::Database(DatabaseError::CorruptDocument(format!(
                        "goal '{}' has unknown owner kind '{}'",
                        db.id, db.owner_kind
                    )))
                })?,
            category: parse_column("category", &db.category)?,
            status: parse_column("status", &db.status)?,
            priority: parse_column("priority", &db.priority)?,
            visibility: parse_column("visibility", &db.visibility)?,
            tags: from_json("tags", &db.tags)?,
            assignees: from_json("assignees", &db.assignees)?,
            milestones: from_json("milestones", &db.milestones)?,
            logs: from_json("logs", &db.logs)?,
            total_xp: counter("total_xp", db.total_xp)?,
            streak_days: counter("streak_days", db.streak_days)?,
            target_date: db.target_date.map(utc),
            start_date: utc(db.start_date),
            completed_date: db.completed_date.map(utc),
            last_log_date: db.last_log_date.map(utc),
            created_at: utc(db.created_at),
            updated_at: utc(db.updated_at),
            completion_bonus_awarded: db.completion_bonus_awarded,
            created_by: db.created_by,
            title: db.title,
            description: db.description,
            id: db.id,
        })
    }
}
