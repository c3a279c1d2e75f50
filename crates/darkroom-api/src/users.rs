use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use darkroom_types::api::{CascadeDeleteResponse, Claims};
use darkroom_types::models::User;

use crate::error::ApiResult;
use crate::{AppState, convert, run_db};

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let rows = run_db(&state, |db| db.list_users()).await?;
    Ok(Json(rows.into_iter().map(convert::user).collect()))
}

/// Delete an account and everything that hangs off it.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<CascadeDeleteResponse>> {
    let summary = run_db(&state, move |db| db.delete_user(user_id)).await?;
    info!("Admin {} deleted user {}", claims.sub, user_id);

    Ok(Json(CascadeDeleteResponse {
        deleted: convert::deleted_rows(summary),
    }))
}
