//! # galleryinfo common library
//!
//! Shared code for the galleryinfo service:
//! - Gallery and exhibition models
//! - Exhibition identity codec (hash id, date code, byte id)
//! - Date ranges and their JSON/storage forms
//! - Validation and the common error type
//! - Database bootstrap and repositories
//! - CSV/JSON fixture import
//! - Configuration resolution

pub mod config;
pub mod date_range;
pub mod db;
pub mod error;
pub mod identity;
pub mod import;
pub mod models;
pub mod validation;

pub use date_range::{DateLayout, DateRange};
pub use error::{Error, Result};
pub use models::{Exhibition, Gallery};
pub use validation::ValidationError;
