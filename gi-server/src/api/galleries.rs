//! Gallery endpoints

use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};
use gi_common::validation::is_uuid;
use gi_common::Gallery;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /galleries/:gallery_id
pub async fn get_gallery(
    State(state): State<AppState>,
    Path(gallery_id): Path<String>,
    uri: Uri,
) -> ApiResult<Json<Gallery>> {
    if !is_uuid(&gallery_id) {
        return Err(ApiError::NotFound(uri.path().to_string()));
    }

    let gallery = state.repos.galleries.get(&gallery_id).await?;
    Ok(Json(gallery))
}
