use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::database::models::FriendRequest;
use crate::error::ApiError;
use crate::handlers::AppState;

/// POST /api/friends - Link two users both ways
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<FriendRequest>,
) -> Result<Json<Value>, ApiError> {
    let (source, target) = state.friends.make_friend(state.deadline(), req).await?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "source": source,
            "target": target,
            "message": format!("{} and {} are now friends", target.name, source.name)
        }
    })))
}

/// GET /api/users/:uid/friends - Friend names resolved at read time
pub async fn list(
    State(state): State<AppState>,
    Path(uid): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let friends = state.friends.friends_of(state.deadline(), uid).await?;
    Ok(Json(json!({ "success": true, "data": friends })))
}
