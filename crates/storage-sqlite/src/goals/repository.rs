use novanest_core::errors::{Error, Result};
use novanest_core::goals::{Goal, GoalFilter, GoalRepositoryTrait, GoalScope};

use super::model::GoalDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use std::sync::Arc;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

fn goal_not_found(goal_id: &str) -> Error {
    Error::not_found(format!("Goal '{}'", goal_id))
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }

    fn load_goal(conn: &mut SqliteConnection, scope: &GoalScope, goal_id: &str) -> Result<Goal> {
        let row = goals::table
            .filter(goals::id.eq(goal_id))
            .filter(goals::owner_kind.eq(scope.kind()))
            .filter(goals::owner_id.eq(scope.owner_id()))
            .select(GoalDB::as_select())
            .first::<GoalDB>(conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| goal_not_found(goal_id))?;
        Goal::try_from(row)
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn list_goals(&self, scope: &GoalScope, filter: &GoalFilter) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = goals::table
            .filter(goals::owner_kind.eq(scope.kind()))
            .filter(goals::owner_id.eq(scope.owner_id()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(goals::status.eq(status.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(goals::category.eq(category.as_str()));
        }

        let rows = query
            .order((goals::created_at.desc(), goals::id.asc()))
            .select(GoalDB::as_select())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(Goal::try_from).collect()
    }

    fn get_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_goal(&mut conn, scope, goal_id)
    }

    async fn insert_goal(&self, goal: Goal) -> Result<Goal> {
        let row = GoalDB::try_from(&goal)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let inserted = diesel::insert_into(goals::table)
                    .values(&row)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Goal::try_from(inserted)
            })
            .await
    }

    async fn save_goal(&self, goal: Goal) -> Result<Goal> {
        let row = GoalDB::try_from(&goal)?;
        let scope = goal.scope.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let affected = diesel::update(
                    goals::table
                        .filter(goals::id.eq(&row.id))
                        .filter(goals::owner_kind.eq(scope.kind()))
                        .filter(goals::owner_id.eq(scope.owner_id())),
                )
                .set(&row)
                .execute(conn)
                .map_err(StorageError::from)?;

                if affected == 0 {
                    return Err(goal_not_found(&row.id));
                }
                debug!("Saved goal {} (xp {})", row.id, row.total_xp);
                Self::load_goal(conn, &scope, &row.id)
            })
            .await
    }

    async fn delete_goal(&self, scope: &GoalScope, goal_id: &str) -> Result<usize> {
        let scope = scope.clone();
        let goal_id_owned = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let affected = diesel::delete(
                    goals::table
                        .filter(goals::id.eq(&goal_id_owned))
                        .filter(goals::owner_kind.eq(scope.kind()))
                        .filter(goals::owner_id.eq(scope.owner_id())),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(affected)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::{Duration, TimeZone, Utc};
    use novanest_core::goals::{
        GoalCategory, GoalLog, GoalPriority, GoalStatus, Milestone, Mood, Visibility,
    };
    use tempfile::tempdir;

    async fn create_test_repository() -> (GoalRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (GoalRepository::new(pool, writer), temp_dir)
    }

    fn test_goal(id: &str, scope: GoalScope, minutes: i64) -> Goal {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        Goal {
            id: id.to_string(),
            scope,
            title: format!("Goal {}", id),
            description: String::new(),
            category: GoalCategory::Other,
            status: GoalStatus::Active,
            priority: GoalPriority::Medium,
            visibility: Visibility::Private,
            tags: vec![],
            assignees: vec![],
            created_by: Some("u-1".to_string()),
            target_date: Some(now + Duration::days(30)),
            start_date: now,
            completed_date: None,
            milestones: vec![],
            logs: vec![],
            total_xp: 0,
            streak_days: 0,
            last_log_date: None,
            completion_bonus_awarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_goal() {
        let (repo, _temp_dir) = create_test_repository().await;
        let goal = test_goal("g-1", GoalScope::user("u-1"), 0);

        let inserted = repo.insert_goal(goal.clone()).await.unwrap();
        assert_eq!(inserted, goal);

        let loaded = repo.get_goal(&GoalScope::user("u-1"), "g-1").unwrap();
        assert_eq!(loaded, goal);
    }

    #[tokio::test]
    async fn test_goals_are_scoped_to_owner() {
        let (repo, _temp_dir) = create_test_repository().await;
        repo.insert_goal(test_goal("g-1", GoalScope::user("u-1"), 0))
            .await
            .unwrap();
        repo.insert_goal(test_goal("g-2", GoalScope::team("u-1"), 1))
            .await
            .unwrap();

        assert!(matches!(
            repo.get_goal(&GoalScope::user("u-2"), "g-1"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            repo.get_goal(&GoalScope::team("u-1"), "g-1"),
            Err(Error::NotFound(_))
        ));
        let personal = repo
            .list_goals(&GoalScope::user("u-1"), &GoalFilter::default())
            .unwrap();
        assert_eq!(personal.len(), 1);
        assert_eq!(personal[0].id, "g-1");

        let deleted = repo.delete_goal(&GoalScope::user("u-2"), "g-1").await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let (repo, _temp_dir) = create_test_repository().await;
        let scope = GoalScope::user("u-1");
        for (i, id) in ["old", "mid", "new"].iter().enumerate() {
            let mut goal = test_goal(id, scope.clone(), i as i64);
            if *id == "mid" {
                goal.status = GoalStatus::Completed;
                goal.category = GoalCategory::Health;
            }
            repo.insert_goal(goal).await.unwrap();
        }

        let all = repo.list_goals(&scope, &GoalFilter::default()).unwrap();
        let ids: Vec<&str> = all.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let completed = repo
            .list_goals(
                &scope,
                &GoalFilter {
                    status: Some(GoalStatus::Completed),
                    category: None,
                },
            )
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, "mid");

        let health = repo
            .list_goals(
                &scope,
                &GoalFilter {
                    status: None,
                    category: Some(GoalCategory::Health),
                },
            )
            .unwrap();
        assert_eq!(health.len(), 1);
    }

    #[tokio::test]
    async fn test_save_goal_replaces_embedded_documents() {
        let (repo, _temp_dir) = create_test_repository().await;
        let scope = GoalScope::user("u-1");
        let mut goal = repo
            .insert_goal(test_goal("g-1", scope.clone(), 0))
            .await
            .unwrap();

        let now = goal.created_at + Duration::hours(2);
        goal.milestones.push(Milestone {
            id: "m-1".to_string(),
            title: "First".to_string(),
            description: String::new(),
            target_date: None,
            xp_reward: 10,
            completed: true,
            completed_at: Some(now),
            assignee: None,
            created_at: now,
            updated_at: now,
        });
        goal.logs.push(GoalLog {
            id: "l-1".to_string(),
            content: "did it".to_string(),
            xp_earned: 5,
            mood: Mood::Good,
            user_id: Some("u-1".to_string()),
            created_at: now,
        });
        goal.total_xp = 15;
        goal.streak_days = 1;
        goal.last_log_date = Some(now);
        goal.target_date = None;
        goal.updated_at = now;

        let saved = repo.save_goal(goal.clone()).await.unwrap();
        assert_eq!(saved, goal);
        assert_eq!(repo.get_goal(&scope, "g-1").unwrap().target_date, None);
    }

    #[tokio::test]
    async fn test_save_and_delete_missing_goal() {
        let (repo, _temp_dir) = create_test_repository().await;
        let goal = test_goal("ghost", GoalScope::user("u-1"), 0);

        let err = repo.save_goal(goal).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        repo.insert_goal(test_goal("g-1", GoalScope::user("u-1"), 0))
            .await
            .unwrap();
        assert_eq!(
            repo.delete_goal(&GoalScope::user("u-1"), "g-1").await.unwrap(),
            1
        );
        assert_eq!(
            repo.delete_goal(&GoalScope::user("u-1"), "g-1").await.unwrap(),
            0
        );
    }
}
