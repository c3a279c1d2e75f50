//! HTTP surface of the admin console: login plus list/delete endpoints for
//! users, photos and comments, all behind an admin-only session token.

pub mod auth;
pub mod comments;
pub mod convert;
pub mod error;
pub mod middleware;
pub mod photos;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tracing::error;

use darkroom_db::{Database, DbResult};

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
}

/// Build every console route. Transport layers (tracing, CORS, static
/// assets) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", delete(users::delete_user))
        .route("/photos", get(photos::list_photos))
        .route("/photos/{id}", delete(photos::delete_photo))
        .route("/comments", get(comments::list_comments))
        .route("/comments/{id}", delete(comments::delete_comment))
        .layer(from_fn_with_state(state.clone(), middleware::require_admin))
        .with_state(state);

    Router::new().merge(public_routes).merge(admin_routes)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run a blocking database call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("database task failed".into())
        })?
        .map_err(ApiError::from)
}
