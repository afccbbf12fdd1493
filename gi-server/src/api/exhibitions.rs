//! Exhibition endpoints

use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};
use gi_common::validation::is_uuid;
use gi_common::{DateLayout, DateRange, Exhibition};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Search results envelope
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
}

/// GET /galleries/:gallery_id/exhibitions/:exhibition_id
///
/// The gallery segment only matches UUIDs, in either case.
pub async fn get_exhibition(
    State(state): State<AppState>,
    Path((gallery_id, exhibition_id)): Path<(String, String)>,
    uri: Uri,
) -> ApiResult<Json<Exhibition>> {
    if !is_uuid(&gallery_id) {
        return Err(ApiError::NotFound(uri.path().to_string()));
    }

    let exhibition = state
        .repos
        .exhibitions
        .get(&gallery_id, &exhibition_id)
        .await?;
    Ok(Json(exhibition))
}

/// GET /exhibitions/:date
///
/// Exhibitions running on `date` (`YYYY-MM-DD`), earliest end first.
pub async fn find_exhibitions_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    uri: Uri,
) -> ApiResult<Json<ListResponse<Exhibition>>> {
    // Only zero-padded dates match the route
    let date = Some(date.as_str())
        .filter(|d| d.len() == 10)
        .and_then(|d| DateLayout::Iso.parse_date(d))
        .ok_or_else(|| ApiError::NotFound(uri.path().to_string()))?;

    let results = state
        .repos
        .exhibitions
        .search_by_date_range_overlap(&DateRange::single(date))
        .await?;
    Ok(Json(ListResponse { results }))
}
