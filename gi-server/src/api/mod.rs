//! HTTP API handlers for gi-server

pub mod exhibitions;
pub mod galleries;
pub mod health;

pub use exhibitions::{find_exhibitions_by_date, get_exhibition, ListResponse};
pub use galleries::get_gallery;
pub use health::health_routes;
