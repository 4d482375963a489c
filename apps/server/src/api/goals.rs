//! Personal goals. Every route is scoped to the calling user.

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
    Goal, GoalFilter, GoalScope, GoalStats, GoalUpdate, MilestoneUpdate, NewGoal, NewGoalLog,
    NewMilestone,
};

fn personal(caller: &CallerId) -> GoalScope {
    GoalScope::user(caller.as_str())
}

async fn list_goals(
    caller: CallerId,
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<GoalFilter>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.list_goals(&personal(&caller), &filter)?;
    Ok(Json(goals))
}

async fn create_goal(
    caller: CallerId,
    State(state): State<Arc<AppState>>,
    ApiJson(new_goal): ApiJson<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .create_goal(&personal(&caller), caller.as_str(), new_goal)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state.goal_service.get_goal(&personal(&caller), &goal_id)?;
    Ok(Json(goal))
}

async fn update_goal(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(update): ApiJson<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .update_goal(&personal(&caller), &goal_id, update)
        .await?;
    Ok(Json(goal))
}

async fn delete_goal(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state
        .goal_service
        .delete_goal(&personal(&caller), &goal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_goal(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .complete_goal(&personal(&caller), &goal_id)
        .await?;
    Ok(Json(goal))
}

async fn reopen_goal(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .reopen_goal(&personal(&caller), &goal_id)
        .await?;
    Ok(Json(goal))
}

async fn add_milestone(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(milestone): ApiJson<NewMilestone>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .add_milestone(&personal(&caller), &goal_id, milestone)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn update_milestone(
    caller: CallerId,
    Path((goal_id, milestone_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    ApiJson(update): ApiJson<MilestoneUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .update_milestone(&personal(&caller), &goal_id, &milestone_id, update)
        .await?;
    Ok(Json(goal))
}

async fn delete_milestone(
    caller: CallerId,
    Path((goal_id, milestone_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .delete_milestone(&personal(&caller), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn complete_milestone(
    caller: CallerId,
    Path((goal_id, milestone_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .complete_milestone(&personal(&caller), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn reopen_milestone(
    caller: CallerId,
    Path((goal_id, milestone_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .reopen_milestone(&personal(&caller), &goal_id, &milestone_id)
        .await?;
    Ok(Json(goal))
}

async fn add_log(
    caller: CallerId,
    Path(goal_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(log): ApiJson<NewGoalLog>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .add_log(&personal(&caller), &goal_id, caller.as_str(), log)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn delete_log(
    caller: CallerId,
    Path((goal_id, log_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .goal_service
        .delete_log(&personal(&caller), &goal_id, &log_id)
        .await?;
    Ok(Json(goal))
}

async fn get_stats(
    caller: CallerId,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GoalStats>> {
    let stats = state.goal_service.get_stats(&personal(&caller))?;
    Ok(Json(stats))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/achievify/goals", get(list_goals).post(create_goal))
        .route(
            "/achievify/goals/{goal_id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/achievify/goals/{goal_id}/complete", post(complete_goal))
        .route("/achievify/goals/{goal_id}/reopen", post(reopen_goal))
        .route("/achievify/goals/{goal_id}/milestones", post(add_milestone))
        .route(
            "/achievify/goals/{goal_id}/milestones/{milestone_id}",
            put(update_milestone).delete(delete_milestone),
        )
        .route(
            "/achievify/goals/{goal_id}/milestones/{milestone_id}/complete",
            post(complete_milestone),
        )
        .route(
            "/achievify/goals/{goal_id}/milestones/{milestone_id}/reopen",
            post(reopen_milestone),
        )
        .route("/achievify/goals/{goal_id}/logs", post(add_log))
        .route(
            "/achievify/goals/{goal_id}/logs/{log_id}",
            delete(delete_log),
        )
        .route("/achievify/stats", get(get_stats))
}
