use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use darkroom_types::api::{Claims, CommentDeleteResponse};
use darkroom_types::models::Comment;

use crate::error::ApiResult;
use crate::{AppState, convert, run_db};

pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<Comment>>> {
    let rows = run_db(&state, |db| db.list_comments()).await?;
    Ok(Json(rows.into_iter().map(convert::comment).collect()))
}

/// Deleting a comment that is already gone succeeds with `deleted: 0`.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<CommentDeleteResponse>> {
    let deleted = run_db(&state, move |db| db.delete_comment(comment_id)).await?;
    if deleted > 0 {
        info!("Admin {} deleted comment {}", claims.sub, comment_id);
    }

    Ok(Json(CommentDeleteResponse { deleted }))
}
