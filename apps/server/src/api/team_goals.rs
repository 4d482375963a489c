//! Shared team goals. The team id comes from the path; the caller is still
//! required and recorded as creator or log author.

use std::sync::Arc;

use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiQuery},
    main_lib::AppState,
    scope::CallerId,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use novanest_core::goals::{
    Goal, GoalFilter, GoalScope, GoalUpdate, MilestoneUpdate, NewGoal, NewGoalLog, NewMilestone,
    TeamGoalAnalytics,
};

async fn list_goals(
    _caller: CallerId,
    Path(team_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<GoalFilter>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state
        .goal_service
        .list_goals(&GoalScope::team(team_id), &filter)?;
    Ok(Json(goals))
}

async fn create_goal(
    caller: CallerId,
    Path(team_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(new_goal): ApiJson<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .create_goal(&GoalScope::team(team_id), caller.as_str(), new_goal)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .get_goal(&GoalScope::team(team_id), &goal_id)?;
    Ok(Json(goal))
}

async fn update_goal(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    ApiJson(update): ApiJson<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .update_goal(&GoalScope::team(team_id), &goal_id, update)
        .await?;
    Ok(Json(goal))
}

async fn delete_goal(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state
        .goal_service
        .delete_goal(&GoalScope::team(team_id), &goal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_goal(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .complete_goal(&GoalScope::team(team_id), &goal_id)
        .await?;
    Ok(Json(goal))
}

async fn reopen_goal(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .reopen_goal(&GoalScope::team(team_id), &goal_id)
        .await?;
    Ok(Json(goal))
}

async fn add_milestone(
    _caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    ApiJson(milestone): ApiJson<NewMilestone>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .add_milestone(&GoalScope::team(team_id), &goal_id, milestone)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn update_milestone(
    _caller: CallerId,
    Path((team_id, goal_id, milestone_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
    ApiJson(update): ApiJson<MilestoneUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .update_milestone(&GoalScope::team(team_id), &goal_id, &milestone_id, update)
        .await?;
    Ok(Json(goal))
}

async fn delete_milestone(
    _caller: CallerId,
    Path((team_id, goal_id, milestone_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .delete_milestone(&GoalScope::team(team_id), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn complete_milestone(
    _caller: CallerId,
    Path((team_id, goal_id, milestone_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .complete_milestone(&GoalScope::team(team_id), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn reopen_milestone(
    _caller: CallerId,
    Path((team_id, goal_id, milestone_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .reopen_milestone(&GoalScope::team(team_id), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn add_log(
    caller: CallerId,
    Path((team_id, goal_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    ApiJson(log): ApiJson<NewGoalLog>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .add_log(&GoalScope::team(team_id), &goal_id, caller.as_str(), log)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn delete_log(
    _caller: CallerId,
    Path((team_id, goal_id, log_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .delete_log(&GoalScope::team(team_id), &goal_id, &log_id)
        .await?;
    Ok(Json(goal))
}

async fn get_analytics(
    _caller: CallerId,
    Path(team_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TeamGoalAnalytics>> {
    let analytics = state.goal_service.get_team_analytics(&team_id)?;
    Ok(Json(analytics))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/teamsync/teams/{team_id}/goals",
            get(list_goals).post(create_goal),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/complete",
            post(complete_goal),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/reopen",
            post(reopen_goal),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/milestones",
            post(add_milestone),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/milestones/{milestone_id}",
            put(update_milestone).delete(delete_milestone),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/milestones/{milestone_id}/complete",
            post(complete_milestone),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/milestones/{milestone_id}/reopen",
            post(reopen_milestone),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/logs",
            post(add_log),
        )
        .route(
            "/teamsync/teams/{team_id}/goals/{goal_id}/logs/{log_id}",
            delete(delete_log),
        )
        .route("/teamsync/teams/{team_id}/analytics", get(get_analytics))
}
