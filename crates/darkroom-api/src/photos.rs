use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use darkroom_types::api::{CascadeDeleteResponse, Claims};
use darkroom_types::models::Photo;

use crate::error::ApiResult;
use crate::{AppState, convert, run_db};

pub async fn list_photos(State(state): State<AppState>) -> ApiResult<Json<Vec<Photo>>> {
    let rows = run_db(&state, |db| db.list_photos()).await?;
    Ok(Json(rows.into_iter().map(convert::photo).collect()))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<CascadeDeleteResponse>> {
    let summary = run_db(&state, move |db| db.delete_photo(photo_id)).await?;
    info!("Admin {} deleted photo {}", claims.sub, photo_id);

    Ok(Json(CascadeDeleteResponse {
        deleted: convert::deleted_rows(summary),
    }))
}
