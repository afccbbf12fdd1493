//! gi-server library - HTTP surface of galleryinfo
//!
//! Read-only JSON endpoints over the gallery and exhibition repositories.

use axum::http::{header, HeaderValue};
use axum::Router;
use gi_common::db::Repositories;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Gallery and exhibition repositories over the shared pool
    pub repos: Repositories,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route(
            "/galleries/:gallery_id/exhibitions/:exhibition_id",
            get(api::get_exhibition),
        )
        .route("/galleries/:gallery_id", get(api::get_gallery))
        .route("/exhibitions/:date", get(api::find_exhibitions_by_date))
        .merge(api::health_routes())
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
