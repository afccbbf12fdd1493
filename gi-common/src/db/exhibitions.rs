//! Exhibition repository
//!
//! Rows are found through the identity hash stored in `_byteid[4..32]`
//! (`substr(_byteid, 5)` in SQL, 1-based). The leading date code is
//! refreshed on every write but never used in a lookup predicate.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::date_range::DateRange;
use crate::identity;
use crate::models::{validate_key, Exhibition};
use crate::{Error, Result};

/// Maximum number of exhibitions returned by a date search
pub const SEARCH_LIMIT: i64 = 100;

const SELECT_COLUMNS: &str =
    "SELECT id, gallery_id, title, description, date_start, date_end FROM exhibition";

#[derive(Debug, Clone)]
pub struct ExhibitionRepository {
    pool: SqlitePool,
}

impl ExhibitionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new exhibition.
    ///
    /// An existing row with the same (gallery_id, id) is a uniqueness
    /// violation, reported as `Error::Database` (see [`Error::is_conflict`]).
    pub async fn create(&self, exhibition: &Exhibition) -> Result<()> {
        exhibition.validate().into_result()?;
        let byte_id = exhibition.byte_id();
        let (lower, upper) = exhibition.date_range.storage_bounds()?;

        sqlx::query(
            r#"
            INSERT INTO exhibition
                (id, _byteid, gallery_id, title, description, date_start, date_end)
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&exhibition.id)
        .bind(byte_id.as_slice())
        .bind(&exhibition.gallery_id)
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(lower)
        .bind(upper)
        .execute(&self.pool)
        .await?;

        debug!(
            gallery_id = %exhibition.gallery_id,
            id = %exhibition.id,
            "Created exhibition"
        );
        Ok(())
    }

    /// Refresh byte id, title, description and dates of an existing row.
    ///
    /// The gallery id is never rewritten. Returns `Error::NotFound` when no
    /// row carries this identity.
    pub async fn update(&self, exhibition: &Exhibition) -> Result<()> {
        exhibition.validate().into_result()?;
        let hash_id = exhibition.hash_id();
        let byte_id = exhibition.byte_id();
        let (lower, upper) = exhibition.date_range.storage_bounds()?;

        let result = sqlx::query(
            r#"
            UPDATE exhibition
            SET _byteid = ?, title = ?, description = ?, date_start = ?, date_end = ?
            WHERE substr(_byteid, 5) = ?
            "#,
        )
        .bind(byte_id.as_slice())
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(lower)
        .bind(upper)
        .bind(hash_id.as_slice())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "exhibition {}/{}",
                exhibition.gallery_id, exhibition.id
            )));
        }

        debug!(
            gallery_id = %exhibition.gallery_id,
            id = %exhibition.id,
            "Updated exhibition"
        );
        Ok(())
    }

    /// Create the exhibition, or update it if its identity already exists.
    ///
    /// A single upsert statement, so concurrent syncs of one identity
    /// converge on one row (last write wins).
    pub async fn create_or_update(&self, exhibition: &Exhibition) -> Result<()> {
        exhibition.validate().into_result()?;
        let byte_id = exhibition.byte_id();
        let (lower, upper) = exhibition.date_range.storage_bounds()?;

        sqlx::query(
            r#"
            INSERT INTO exhibition
                (id, _byteid, gallery_id, title, description, date_start, date_end)
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (substr(_byteid, 5)) DO UPDATE SET
                _byteid = excluded._byteid,
                title = excluded.title,
                description = excluded.description,
                date_start = excluded.date_start,
                date_end = excluded.date_end
            "#,
        )
        .bind(&exhibition.id)
        .bind(byte_id.as_slice())
        .bind(&exhibition.gallery_id)
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(lower)
        .bind(upper)
        .execute(&self.pool)
        .await?;

        debug!(
            gallery_id = %exhibition.gallery_id,
            id = %exhibition.id,
            date_range = %exhibition.date_range,
            "Synced exhibition"
        );
        Ok(())
    }

    /// Whether an exhibition with this identity is stored
    pub async fn exists(&self, gallery_id: &str, id: &str) -> Result<bool> {
        validate_key(gallery_id, id).into_result()?;
        let hash_id = identity::hash_id(gallery_id, id);

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM exhibition WHERE substr(_byteid, 5) = ?)",
        )
        .bind(hash_id.as_slice())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Fetch one exhibition; the gallery id is matched case-insensitively
    pub async fn get(&self, gallery_id: &str, id: &str) -> Result<Exhibition> {
        validate_key(gallery_id, id).into_result()?;
        let hash_id = identity::hash_id(gallery_id, id);

        let row = sqlx::query(&format!("{} WHERE substr(_byteid, 5) = ?", SELECT_COLUMNS))
            .bind(hash_id.as_slice())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("exhibition {}/{}", gallery_id, id)))?;

        exhibition_from_row(&row)
    }

    /// Exhibitions whose dates overlap `range`, earliest end first.
    ///
    /// Both sides are compared in half-open form. Ties on the end date keep
    /// storage order. At most [`SEARCH_LIMIT`] rows are returned.
    pub async fn search_by_date_range_overlap(&self, range: &DateRange) -> Result<Vec<Exhibition>> {
        let (lower, upper) = range.storage_bounds()?;
        debug!(predicate = %range.to_storage_predicate(), "Searching exhibitions by date range");

        let rows = sqlx::query(&format!(
            "{} WHERE date_start < ? AND ? < date_end ORDER BY date_end, rowid LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(upper)
        .bind(lower)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(exhibition_from_row).collect()
    }
}

fn exhibition_from_row(row: &SqliteRow) -> Result<Exhibition> {
    let lower: NaiveDate = row.try_get("date_start")?;
    let upper: NaiveDate = row.try_get("date_end")?;

    Ok(Exhibition {
        id: row.try_get("id")?,
        gallery_id: row.try_get("gallery_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date_range: DateRange::from_storage(lower, upper),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    const GALLERY_ID: &str = "54b818d3-22f0-4f8b-6a04-170405fdb840";

    async fn setup() -> (SqlitePool, ExhibitionRepository) {
        let pool = open_in_memory().await.unwrap();
        (pool.clone(), ExhibitionRepository::new(pool))
    }

    fn sample(id: &str) -> Exhibition {
        Exhibition {
            id: id.to_string(),
            gallery_id: GALLERY_ID.to_string(),
            title: format!("Exhibition-Title-{}", id),
            description: format!("Description for {}", id),
            date_range: DateRange::parse_iso("2014-05-10", "2014-05-24").unwrap(),
        }
    }

    async fn row_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM exhibition")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let (_pool, repo) = setup().await;
        let e = sample("ID:1");

        repo.create(&e).await.unwrap();
        assert_eq!(repo.get(GALLERY_ID, "ID:1").await.unwrap(), e);
    }

    #[tokio::test]
    async fn test_stored_range_is_half_open() {
        let (pool, repo) = setup().await;
        repo.create(&sample("ID:1")).await.unwrap();

        let (start, end): (String, String) =
            sqlx::query_as("SELECT date_start, date_end FROM exhibition")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(start, "2014-05-10");
        assert_eq!(end, "2014-05-25");
    }

    #[tokio::test]
    async fn test_stored_byte_id_layout() {
        let (pool, repo) = setup().await;
        let e = sample("ID:1");
        repo.create(&e).await.unwrap();

        let stored: Vec<u8> = sqlx::query_scalar("SELECT _byteid FROM exhibition")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, e.byte_id().to_vec());
    }

    #[tokio::test]
    async fn test_get_gallery_id_case_insensitive() {
        let (_pool, repo) = setup().await;
        let e = sample("ID:1");
        repo.create(&e).await.unwrap();

        let found = repo.get(&GALLERY_ID.to_uppercase(), "ID:1").await.unwrap();
        assert_eq!(found, e);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_pool, repo) = setup().await;
        let err = repo.get(GALLERY_ID, "missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_validates_before_query() {
        let (_pool, repo) = setup().await;
        let err = repo.get("invalid-gallery-id", "").await.unwrap_err();
        match err {
            Error::Validation(v) => assert_eq!(v.messages().len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let (pool, repo) = setup().await;
        let e = sample("ID:1");
        repo.create(&e).await.unwrap();

        let mut same_identity = e.clone();
        same_identity.gallery_id = GALLERY_ID.to_uppercase();
        let err = repo.create(&same_identity).await.unwrap_err();
        assert!(err.is_conflict(), "expected uniqueness violation, got {:?}", err);
        assert_eq!(row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_fields_and_dates() {
        let (_pool, repo) = setup().await;
        let mut e = sample("ID:1");
        repo.create(&e).await.unwrap();

        e.title = "Updated Title".to_string();
        e.description = "Updated Description".to_string();
        e.date_range = DateRange::parse_iso("2014-04-10", "2014-06-24").unwrap();
        repo.update(&e).await.unwrap();

        assert_eq!(repo.get(GALLERY_ID, "ID:1").await.unwrap(), e);
    }

    #[tokio::test]
    async fn test_update_keeps_gallery_id() {
        let (_pool, repo) = setup().await;
        let e = sample("ID:1");
        repo.create(&e).await.unwrap();

        let mut shouting = e.clone();
        shouting.gallery_id = GALLERY_ID.to_uppercase();
        shouting.title = "Loud".to_string();
        repo.update(&shouting).await.unwrap();

        let stored = repo.get(GALLERY_ID, "ID:1").await.unwrap();
        assert_eq!(stored.gallery_id, GALLERY_ID);
        assert_eq!(stored.title, "Loud");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (pool, repo) = setup().await;
        let err = repo.update(&sample("ID:1")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(row_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_create_or_update_idempotent() {
        let (pool, repo) = setup().await;
        let mut e = sample("ID:1");
        repo.create_or_update(&e).await.unwrap();
        assert!(repo.exists(GALLERY_ID, "ID:1").await.unwrap());

        e.title = "Second".to_string();
        e.date_range = DateRange::parse_iso("2014-06-01", "2014-06-02").unwrap();
        repo.create_or_update(&e).await.unwrap();

        assert_eq!(row_count(&pool).await, 1);
        assert_eq!(repo.get(GALLERY_ID, "ID:1").await.unwrap(), e);
    }

    #[tokio::test]
    async fn test_create_or_update_rejects_invalid() {
        let (pool, repo) = setup().await;
        let mut e = sample("");
        e.gallery_id = "nope".to_string();

        let err = repo.create_or_update(&e).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(row_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_inverted_range_is_stored_but_never_found_by_day() {
        let (_pool, repo) = setup().await;
        let mut e = sample("ID:1");
        e.date_range = DateRange::parse_iso("2014-05-20", "2014-05-10").unwrap();
        repo.create_or_update(&e).await.unwrap();

        assert_eq!(repo.get(GALLERY_ID, "ID:1").await.unwrap(), e);

        let mut day = NaiveDate::from_ymd_opt(2014, 5, 8).unwrap();
        let last = NaiveDate::from_ymd_opt(2014, 5, 22).unwrap();
        while day <= last {
            let found = repo
                .search_by_date_range_overlap(&DateRange::single(day))
                .await
                .unwrap();
            assert!(found.is_empty(), "{} matched an inverted range", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[tokio::test]
    async fn test_exists() {
        let (_pool, repo) = setup().await;
        assert!(!repo.exists(GALLERY_ID, "ID:1").await.unwrap());
        repo.create(&sample("ID:1")).await.unwrap();
        assert!(repo.exists(&GALLERY_ID.to_uppercase(), "ID:1").await.unwrap());
        assert!(!repo.exists(GALLERY_ID, "id:1").await.unwrap());
    }
}
