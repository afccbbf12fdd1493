//! Database bootstrap and repositories

pub mod exhibitions;
pub mod galleries;
pub mod init;

pub use exhibitions::{ExhibitionRepository, SEARCH_LIMIT};
pub use galleries::GalleryRepository;
pub use init::{create_schema, init_database, open_in_memory};

use sqlx::SqlitePool;

/// Both repositories over one shared pool
#[derive(Debug, Clone)]
pub struct Repositories {
    pub galleries: GalleryRepository,
    pub exhibitions: ExhibitionRepository,
}

impl Repositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            galleries: GalleryRepository::new(pool.clone()),
            exhibitions: ExhibitionRepository::new(pool),
        }
    }
}
