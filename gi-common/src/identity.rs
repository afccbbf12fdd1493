//! Exhibition identity codec
//!
//! An exhibition's natural key is the variable-length pair
//! (gallery id, exhibition id). Storage uses a fixed 32-byte surrogate:
//!
//! ```text
//! bytes 0..4   date code of the range start (clustering prefix)
//! bytes 4..32  SHA-224 of lower(gallery id) ++ exhibition id
//! ```
//!
//! Identity equality is defined by the hash part alone. Lookups match
//! `substr(_byteid, 5)` and never look at the date prefix.

use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha224};

/// Length of the SHA-224 identity hash
pub const HASH_ID_LEN: usize = 28;

/// Length of the big-endian date code prefix
pub const DATE_CODE_LEN: usize = 4;

/// Length of the composite storage key
pub const BYTE_ID_LEN: usize = DATE_CODE_LEN + HASH_ID_LEN;

/// Identity fingerprint of an exhibition.
///
/// The gallery id is lowercased (UUIDs compare case-insensitively); the
/// exhibition id is hashed verbatim.
pub fn hash_id(gallery_id: &str, exhibition_id: &str) -> [u8; HASH_ID_LEN] {
    let mut hasher = Sha224::new();
    hasher.update(gallery_id.to_lowercase().as_bytes());
    hasher.update(exhibition_id.as_bytes());
    hasher.finalize().into()
}

/// Packs a date as `day + month*32 + year*512`, big-endian.
///
/// Not a calendar encoding; only used to cluster keys by start date.
pub fn date_code(date: NaiveDate) -> [u8; DATE_CODE_LEN] {
    let n = date.day() as i64 + date.month() as i64 * 32 + date.year() as i64 * 32 * 16;
    (n as u32).to_be_bytes()
}

/// Composite storage key: date code of `start` followed by the hash id
pub fn byte_id(gallery_id: &str, exhibition_id: &str, start: NaiveDate) -> [u8; BYTE_ID_LEN] {
    let mut key = [0u8; BYTE_ID_LEN];
    key[..DATE_CODE_LEN].copy_from_slice(&date_code(start));
    key[DATE_CODE_LEN..].copy_from_slice(&hash_id(gallery_id, exhibition_id));
    key
}
