//! Gallery fixture import
//!
//! A fixture is a JSON gallery descriptor that references one or more CSV
//! exhibition feeds by file name, relative to the descriptor:
//!
//! ```json
//! {"id": "...", "name": "...", "exhibitions": ["2013.csv", "2014.csv"]}
//! ```
//!
//! Feed headers are matched by suffix, so localized headers such as
//! `開始日:start` bind to the canonical `start` column.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::date_range::DateRange;
use crate::db::Repositories;
use crate::models::{Exhibition, Gallery};
use crate::{Error, Result};

/// Top-level schema of a gallery descriptor
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GalleryDescriptor {
    id: String,
    name: String,
    about: String,
    address: String,
    open_at: String,
    close_at: String,
    close_on: String,
    exhibitions: Vec<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

/// Parse a gallery descriptor into a gallery and its feed file names.
///
/// `address`, `open_at`, `close_at` and `close_on` are packed into the
/// gallery's `meta` object.
pub fn parse_gallery_descriptor(data: &[u8]) -> Result<(Gallery, Vec<String>)> {
    let input: GalleryDescriptor = serde_json::from_slice(data)
        .map_err(|e| Error::Parse(format!("gallery descriptor: {}", e)))?;

    for key in input.unknown.keys() {
        warn!(gallery_id = %input.id, attribute = %key, "Ignoring unknown gallery attribute");
    }

    let meta = json!({
        "address": input.address,
        "open_at": input.open_at,
        "close_at": input.close_at,
        "close_on": input.close_on,
    });

    let gallery = Gallery {
        id: input.id,
        name: input.name,
        meta,
        about: input.about,
    };

    Ok((gallery, input.exhibitions))
}

/// Canonical feed columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Title,
    Description,
    Start,
    End,
    // accepted but not stored yet
    Alerts,
    Notes,
}

impl Column {
    /// Matching order for header cells
    const ALL: [Column; 7] = [
        Column::Id,
        Column::Title,
        Column::Description,
        Column::Start,
        Column::End,
        Column::Alerts,
        Column::Notes,
    ];

    fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Description => "description",
            Column::Start => "start",
            Column::End => "end",
            Column::Alerts => "alerts",
            Column::Notes => "notes",
        }
    }

    fn is_required(self) -> bool {
        !matches!(self, Column::Alerts | Column::Notes)
    }
}

/// Bind each header cell to the first canonical column it ends with
fn bind_columns(header: &csv::StringRecord) -> Vec<Option<Column>> {
    header
        .iter()
        .map(|cell| {
            Column::ALL
                .iter()
                .copied()
                .find(|column| cell.ends_with(column.name()))
        })
        .collect()
}

/// Parse a CSV exhibition feed for one gallery.
///
/// The first row is the header; every following row becomes one
/// exhibition. `start`/`end` cells use the `YYYY/MM/DD` layout. Header
/// cells matching no canonical column are ignored. Fails with
/// `Error::NoContent` when there is no header or no data row.
pub fn parse_exhibition_feed<R: Read>(gallery_id: &str, reader: R) -> Result<Vec<Exhibition>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Err(Error::NoContent),
    };
    let columns = bind_columns(&header);

    for column in Column::ALL.iter().filter(|c| c.is_required()) {
        if !columns.contains(&Some(*column)) {
            warn!(gallery_id, column = column.name(), "Feed header has no required column");
        }
    }

    let mut exhibitions = Vec::new();
    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let (mut id, mut title, mut description) = ("", "", "");
        let (mut start, mut end) = ("", "");

        for (cell, column) in record.iter().zip(&columns) {
            match column {
                Some(Column::Id) => id = cell,
                Some(Column::Title) => title = cell,
                Some(Column::Description) => description = cell,
                Some(Column::Start) => start = cell,
                Some(Column::End) => end = cell,
                Some(Column::Alerts) | Some(Column::Notes) | None => {}
            }
        }

        let date_range = DateRange::parse_slash(start, end).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("line {}: {}", line, msg)),
            other => other,
        })?;

        let exhibition = Exhibition {
            id: id.to_string(),
            gallery_id: gallery_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            date_range,
        };
        exhibitions.push(exhibition);
    }

    if exhibitions.is_empty() {
        return Err(Error::NoContent);
    }

    Ok(exhibitions)
}

/// Outcome of a successful fixture import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub gallery_id: String,
    pub feeds: usize,
    pub exhibitions: usize,
}

/// Import a gallery descriptor and every feed it references.
///
/// All referenced feeds must exist before anything is written. The
/// gallery and its exhibitions are synced, so re-importing a fixture
/// updates rows in place.
pub async fn import_fixture(repos: &Repositories, path: &Path) -> Result<ImportSummary> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(Error::Parse(format!(
            "{}: only JSON gallery descriptors are supported",
            path.display()
        )));
    }

    let data = tokio::fs::read(path).await?;
    let (gallery, feed_names) = parse_gallery_descriptor(&data)?;
    gallery.validate().into_result()?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut feeds: Vec<PathBuf> = Vec::with_capacity(feed_names.len());
    for name in &feed_names {
        let feed = dir.join(name);
        if !is_file(&feed).await? {
            return Err(Error::NotFound(format!(
                "No such file as {}. File {} does not exist",
                feed.display(),
                name
            )));
        }
        feeds.push(feed);
    }

    repos.galleries.sync(&gallery).await?;
    info!(gallery_id = %gallery.id, name = %gallery.name, "Synced gallery");

    let mut total = 0;
    for feed in &feeds {
        let data = tokio::fs::read(feed).await?;
        let exhibitions = parse_exhibition_feed(&gallery.id, data.as_slice())?;
        for exhibition in &exhibitions {
            repos.exhibitions.create_or_update(exhibition).await?;
        }
        info!(
            feed = %feed.display(),
            count = exhibitions.len(),
            "Imported exhibition feed"
        );
        total += exhibitions.len();
    }

    Ok(ImportSummary {
        gallery_id: gallery.id,
        feeds: feeds.len(),
        exhibitions: total,
    })
}

async fn is_file(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GALLERY_ID: &str = "B9FE1506-30C4-4CFF-B73E-99D859199A6D";

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse_iso(start, end).unwrap()
    }

    #[test]
    fn test_parse_gallery_descriptor() {
        let data = r#"{
            "id": "B9FE1506-30C4-4CFF-B73E-99D859199A6D",
            "name": "ヒラマ画廊",
            "address": "070-0032 旭川市２条通８丁目",
            "about": "Test",
            "open_at": "10:00",
            "close_at": "18:00",
            "close_on": "",
            "exhibitions": [
                "2013.csv",
                "2014.csv"
            ]
        }"#;

        let (gallery, exhibitions) = parse_gallery_descriptor(data.as_bytes()).unwrap();

        assert_eq!(gallery.id, GALLERY_ID);
        assert_eq!(gallery.name, "ヒラマ画廊");
        assert_eq!(gallery.about, "Test");
        assert_eq!(
            gallery.meta,
            json!({
                "open_at": "10:00",
                "close_at": "18:00",
                "close_on": "",
                "address": "070-0032 旭川市２条通８丁目",
            })
        );
        assert_eq!(exhibitions, vec!["2013.csv", "2014.csv"]);
    }

    #[test]
    fn test_parse_gallery_descriptor_defaults_and_unknown_keys() {
        let data = br#"{"id": "b9fe1506-30c4-4cff-b73e-99d859199a6d", "phone": "0166"}"#;
        let (gallery, exhibitions) = parse_gallery_descriptor(data).unwrap();

        assert_eq!(gallery.name, "");
        assert_eq!(gallery.meta["address"], "");
        assert!(gallery.meta.get("phone").is_none());
        assert!(exhibitions.is_empty());
    }

    #[test]
    fn test_parse_gallery_descriptor_malformed() {
        let err = parse_gallery_descriptor(b"{\"id\": ").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = parse_gallery_descriptor(br#"{"exhibitions": "2014.csv"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_exhibition_feed() {
        let data = "id,タイトル:title,説明:description,開始日:start,最終日:end
2014-1,新年おめでとう展【後期】,,2014/01/05,2014/01/13
2014-2,新春彫刻展,,2014/01/14,2014/01/20
2014-3,光彩画廊コレクション展,,2014/01/21,2014/01/27
2014-4,森清行・河原潤 二人展 二重星,,2014/01/28,2014/02/03";

        let exhibitions = parse_exhibition_feed(GALLERY_ID, data.as_bytes()).unwrap();

        let expected = [
            ("2014-1", "新年おめでとう展【後期】", range("2014-01-05", "2014-01-13")),
            ("2014-2", "新春彫刻展", range("2014-01-14", "2014-01-20")),
            ("2014-3", "光彩画廊コレクション展", range("2014-01-21", "2014-01-27")),
            ("2014-4", "森清行・河原潤 二人展 二重星", range("2014-01-28", "2014-02-03")),
        ];
        assert_eq!(exhibitions.len(), expected.len());
        for (e, (id, title, date_range)) in exhibitions.iter().zip(expected) {
            assert_eq!(
                e,
                &Exhibition {
                    id: id.to_string(),
                    gallery_id: GALLERY_ID.to_string(),
                    title: title.to_string(),
                    description: String::new(),
                    date_range,
                }
            );
        }
    }

    #[test]
    fn test_feed_column_order_and_extra_columns() {
        let data = "memo,最終日:end,notes,開始日:start,id,title,alerts,description
x,2014/03/02,n,2014/03/01,a-1,Title,al,Desc
";
        let exhibitions = parse_exhibition_feed(GALLERY_ID, data.as_bytes()).unwrap();

        assert_eq!(exhibitions.len(), 1);
        let e = &exhibitions[0];
        assert_eq!(e.id, "a-1");
        assert_eq!(e.title, "Title");
        assert_eq!(e.description, "Desc");
        assert_eq!(e.date_range, range("2014-03-01", "2014-03-02"));
    }

    #[test]
    fn test_feed_missing_optional_columns_is_lenient() {
        // no description column; the field stays empty
        let data = "id,title,start,end\nx,T,2014/03/01,2014/03/02\n";
        let exhibitions = parse_exhibition_feed(GALLERY_ID, data.as_bytes()).unwrap();
        assert_eq!(exhibitions[0].description, "");
    }

    #[test]
    fn test_feed_no_content() {
        let err = parse_exhibition_feed(GALLERY_ID, &b""[..]).unwrap_err();
        assert!(matches!(err, Error::NoContent));

        let header_only = "id,タイトル:title,説明:description,開始日:start,最終日:end";
        let err = parse_exhibition_feed(GALLERY_ID, header_only.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::NoContent));

        let err = parse_exhibition_feed(GALLERY_ID, format!("{}\n", header_only).as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::NoContent));
    }

    #[test]
    fn test_feed_bad_date_is_parse_error() {
        let data = "id,title,description,start,end\n2014-1,T,,2014-01-05,2014/01/13\n";
        let err = parse_exhibition_feed(GALLERY_ID, data.as_bytes()).unwrap_err();
        match err {
            Error::Parse(msg) => {
                assert!(msg.starts_with("line 2:"), "{}", msg);
                assert!(msg.contains("Invalid Date Start 2014-01-05"), "{}", msg);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_feed_ragged_row_is_csv_error() {
        let data = "id,title,description,start,end\n2014-1,T,2014/01/05,2014/01/13\n";
        let err = parse_exhibition_feed(GALLERY_ID, data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }
}
