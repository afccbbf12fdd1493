//! Gallery repository
//!
//! Galleries are keyed directly by their UUID; the `id` column compares
//! case-insensitively.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::models::Gallery;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct GalleryRepository {
    pool: SqlitePool,
}

impl GalleryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new gallery; a duplicate id is a uniqueness violation
    pub async fn create(&self, gallery: &Gallery) -> Result<()> {
        gallery.validate().into_result()?;

        sqlx::query("INSERT INTO gallery (id, name, meta, about) VALUES (?, ?, ?, ?)")
            .bind(&gallery.id)
            .bind(&gallery.name)
            .bind(Json(&gallery.meta))
            .bind(&gallery.about)
            .execute(&self.pool)
            .await?;

        debug!(id = %gallery.id, "Created gallery");
        Ok(())
    }

    /// Overwrite name, meta and about. `Error::NotFound` if the id is unknown.
    pub async fn update(&self, gallery: &Gallery) -> Result<()> {
        gallery.validate().into_result()?;

        let result = sqlx::query("UPDATE gallery SET name = ?, meta = ?, about = ? WHERE id = ?")
            .bind(&gallery.name)
            .bind(Json(&gallery.meta))
            .bind(&gallery.about)
            .bind(&gallery.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("gallery {}", gallery.id)));
        }

        debug!(id = %gallery.id, "Updated gallery");
        Ok(())
    }

    /// Create the gallery or overwrite its mutable fields, atomically
    pub async fn sync(&self, gallery: &Gallery) -> Result<()> {
        gallery.validate().into_result()?;

        sqlx::query(
            r#"
            INSERT INTO gallery (id, name, meta, about)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                meta = excluded.meta,
                about = excluded.about
            "#,
        )
        .bind(&gallery.id)
        .bind(&gallery.name)
        .bind(Json(&gallery.meta))
        .bind(&gallery.about)
        .execute(&self.pool)
        .await?;

        debug!(id = %gallery.id, "Synced gallery");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Gallery> {
        let row = sqlx::query("SELECT id, name, meta, about FROM gallery WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("gallery {}", id)))?;

        let Json(meta): Json<Value> = row.try_get("meta")?;
        Ok(Gallery {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            meta,
            about: row.try_get("about")?,
        })
    }
}
