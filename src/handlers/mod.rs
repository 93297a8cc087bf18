pub mod friend;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::friends::FriendGraph;
use crate::database::repository::UserRepository;
use crate::database::{Deadline, UserStore};

/// Per-process state injected into every handler: the store handle wired into
/// the repository and graph components at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub users: UserRepository,
    pub friends: FriendGraph,
    request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, request_timeout: Option<Duration>) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            friends: FriendGraph::new(store.clone()),
            store,
            request_timeout,
        }
    }

    /// Fresh deadline for one inbound request.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/users", post(user::create).get(user::list))
        .route(
            "/api/users/:uid",
            get(user::get).put(user::update).delete(user::remove),
        )
        .route("/api/users/:uid/friends", get(friend::list))
        .route("/api/friends", post(friend::create))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Roster API",
            "version": version,
            "description": "User directory service with symmetric friend links",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "users": "/api/users[/:uid]",
                "friends": "/api/friends, /api/users/:uid/friends",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
