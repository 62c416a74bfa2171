//! Represents an object (file) listed from the gateway's bucket.

use crate::store::RawObjectEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const LARGEST_SIZE_UNIT: &str = "PB";

/// A listing entry that does not have the shape the gateway expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEntryError {
    #[error("listing entry is missing `{0}`")]
    MissingField(&'static str),
    #[error("listing entry `{key}` has a negative size ({size})")]
    NegativeSize { key: String, size: i64 },
}

/// A single object within the bucket, normalized from a raw listing entry.
///
/// Records are rebuilt on every listing and never persisted. Display-only
/// fields (`url`, human-readable size) are derived in [`ObjectRecord::to_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Timestamp assigned by the store when the object was last written.
    pub last_modified: DateTime<Utc>,

    /// Content fingerprint with the store's surrounding quotes removed.
    pub etag: String,

    /// Size in bytes.
    pub size_bytes: u64,

    /// Storage tier label (e.g., STANDARD). Opaque to the gateway.
    pub storage_class: String,
}

/// Wire form of an [`ObjectRecord`], including its derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectResponse {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    /// Human-readable size, e.g. `2.0 KB`.
    pub size: String,
    pub size_bytes: u64,
    pub storage_class: String,
    pub url: String,
}

impl ObjectRecord {
    /// Validate and normalize one raw listing entry.
    pub fn parse(entry: RawObjectEntry) -> Result<Self, MalformedEntryError> {
        let key = entry
            .key
            .filter(|key| !key.is_empty())
            .ok_or(MalformedEntryError::MissingField("key"))?;
        let last_modified = entry
            .last_modified
            .ok_or(MalformedEntryError::MissingField("last_modified"))?;
        let etag = entry
            .etag
            .ok_or(MalformedEntryError::MissingField("etag"))?;
        let size = entry
            .size
            .ok_or(MalformedEntryError::MissingField("size"))?;
        let size_bytes = u64::try_from(size).map_err(|_| MalformedEntryError::NegativeSize {
            key: key.clone(),
            size,
        })?;
        let storage_class = entry
            .storage_class
            .ok_or(MalformedEntryError::MissingField("storage_class"))?;

        Ok(Self {
            etag: strip_quotes(&etag).to_string(),
            key,
            last_modified,
            size_bytes,
            storage_class,
        })
    }

    /// Serializable view with `url` and display size computed fresh.
    pub fn to_response(&self, public_url: &str) -> ObjectResponse {
        ObjectResponse {
            key: self.key.clone(),
            last_modified: self.last_modified,
            etag: self.etag.clone(),
            size: format_size(self.size_bytes),
            size_bytes: self.size_bytes,
            storage_class: self.storage_class.clone(),
            url: object_url(public_url, &self.key),
        }
    }
}

/// Remove the quote characters the store wraps around ETags.
///
/// Only boundary quotes are removed; interior quotes are kept. Stripping runs
/// until no boundary quote remains, so applying it twice changes nothing.
pub fn strip_quotes(etag: &str) -> &str {
    etag.trim_matches('"')
}

/// Render a byte count with 1024-based units and one decimal place.
///
/// Sizes of 1024 PB and beyond stay in PB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} {LARGEST_SIZE_UNIT}")
}

/// Public URL of `key`. The key is not escaped; keys are expected to be URL-safe.
pub fn object_url(public_url: &str, key: &str) -> String {
    format!("{public_url}/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entry() -> RawObjectEntry {
        RawObjectEntry {
            key: Some("a.txt".into()),
            last_modified: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            etag: Some("\"abc123\"".into()),
            size: Some(2048),
            storage_class: Some("STANDARD".into()),
        }
    }

    #[test]
    fn parses_listing_entry_and_derives_fields() {
        let record = ObjectRecord::parse(sample_entry()).unwrap();
        assert_eq!(record.etag, "abc123");
        assert_eq!(record.size_bytes, 2048);

        let response = record.to_response("https://cdn.example.com");
        assert_eq!(response.size, "2.0 KB");
        assert_eq!(response.url, "https://cdn.example.com/a.txt");
        assert_eq!(response.etag, "abc123");
    }

    #[test]
    fn serializes_derived_fields() {
        let record = ObjectRecord::parse(sample_entry()).unwrap();
        let json = serde_json::to_value(record.to_response("https://cdn.example.com")).unwrap();
        assert_eq!(json["key"], "a.txt");
        assert_eq!(json["last_modified"], "2024-01-01T00:00:00Z");
        assert_eq!(json["size"], "2.0 KB");
        assert_eq!(json["size_bytes"], 2048);
        assert_eq!(json["storage_class"], "STANDARD");
        assert_eq!(json["url"], "https://cdn.example.com/a.txt");
    }

    #[test]
    fn rejects_entries_missing_required_fields() {
        let cases: [(fn(&mut RawObjectEntry), &str); 5] = [
            (|e| e.key = None, "key"),
            (|e| e.last_modified = None, "last_modified"),
            (|e| e.etag = None, "etag"),
            (|e| e.size = None, "size"),
            (|e| e.storage_class = None, "storage_class"),
        ];
        for (mutate, field) in cases {
            let mut entry = sample_entry();
            mutate(&mut entry);
            assert_eq!(
                ObjectRecord::parse(entry),
                Err(MalformedEntryError::MissingField(field))
            );
        }
    }

    #[test]
    fn rejects_empty_key_and_negative_size() {
        let mut entry = sample_entry();
        entry.key = Some(String::new());
        assert_eq!(
            ObjectRecord::parse(entry),
            Err(MalformedEntryError::MissingField("key"))
        );

        let mut entry = sample_entry();
        entry.size = Some(-1);
        assert!(matches!(
            ObjectRecord::parse(entry),
            Err(MalformedEntryError::NegativeSize { size: -1, .. })
        ));
    }

    #[test]
    fn strip_quotes_only_touches_boundaries() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("abc"), "abc");
        assert_eq!(strip_quotes("\"a\"b\""), "a\"b");
        assert_eq!(strip_quotes("\"abc"), "abc");
        assert_eq!(strip_quotes("\""), "");
        assert_eq!(strip_quotes(""), "");
        assert_eq!(strip_quotes("\"\"x\"\""), "x");
    }

    #[test]
    fn strip_quotes_is_idempotent() {
        for etag in ["\"abc\"", "abc", "\"\"x\"\"", "\"", "\"\"", "a\"b", "\"\"\""] {
            let once = strip_quotes(etag);
            assert_eq!(strip_quotes(once), once, "etag {etag:?}");
            assert!(!once.starts_with('"') && !once.ends_with('"'), "etag {etag:?}");
        }
    }

    #[test]
    fn format_size_picks_smallest_unit_below_1024() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024u64.pow(3)), "3.0 GB");
        assert_eq!(format_size(7 * 1024u64.pow(4)), "7.0 TB");
        assert_eq!(format_size(2 * 1024u64.pow(5)), "2.0 PB");
        assert_eq!(format_size(2048 * 1024u64.pow(5)), "2048.0 PB");
    }

    #[test]
    fn format_size_stays_within_rounding_tolerance() {
        let units = ["B", "KB", "MB", "GB", "TB", "PB"];
        let mut samples = vec![0u64, 1, 999, 1023, 1024, 1025, u64::MAX];
        let mut n = 7u64;
        while n < u64::MAX / 13 {
            samples.push(n);
            n = n * 13 + 5;
        }

        for bytes in samples {
            let rendered = format_size(bytes);
            let (number, unit) = rendered.split_once(' ').unwrap();
            let decimals = number.split_once('.').unwrap().1;
            assert_eq!(decimals.len(), 1, "{rendered}");

            let power = units.iter().position(|u| *u == unit).unwrap() as i32;
            let scale = 1024f64.powi(power);
            let value: f64 = number.parse().unwrap();
            let exact = bytes as f64 / scale;
            // One decimal place means the rendered value is within 0.05 units.
            assert!((value - exact).abs() <= 0.05 + f64::EPSILON * exact, "{rendered}");
            if unit != "PB" {
                assert!(exact < 1024.0, "{rendered}");
            }
            if power > 0 {
                assert!(bytes as f64 / 1024f64.powi(power - 1) >= 1024.0, "{rendered}");
            }
        }
    }

    #[test]
    fn object_url_does_not_escape_key() {
        assert_eq!(
            object_url("https://cdn.example.com", "photos/a b.jpg"),
            "https://cdn.example.com/photos/a b.jpg"
        );
    }
}
