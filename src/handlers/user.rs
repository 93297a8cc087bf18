use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::database::models::{NewUser, UpdateUser};
use crate::error::ApiError;
use crate::handlers::AppState;

/// POST /api/users - Create a user; uid is allocated server-side
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = state.users.create(state.deadline(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": user })),
    ))
}

/// GET /api/users - List all users; empty store yields an empty array
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.users.find_all(state.deadline()).await?;
    Ok(Json(json!({ "success": true, "data": users })))
}

/// GET /api/users/:uid - Get a single user by uid
pub async fn get(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let user = state.users.find_by_uid(state.deadline(), uid).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// PUT /api/users/:uid - Whole-record replace; uid in the payload is ignored
pub async fn update(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<Value>, ApiError> {
    state.users.update(state.deadline(), payload, uid).await?;
    let user = state.users.find_by_uid(state.deadline(), uid).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// DELETE /api/users/:uid - Remove a user by uid
pub async fn remove(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.users.delete(state.deadline(), uid).await?;
    Ok(Json(json!({ "success": true, "data": { "uid": uid } })))
}
