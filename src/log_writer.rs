//! Per-source durable event logs: append-only CSV with identity-key dedup.
//!
//! Each backend family owns one CSV file with columns
//! `url,title,ts_unix,browser,profile`. Appending first scans the existing
//! file into a key set (logs are append-only and bounded by historical
//! volume, so a one-time scan per run is fine) and writes only candidates
//! whose identity key is absent, in the order given. Nothing in the file is
//! ever rewritten.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

use crate::models::VisitEvent;

/// On-disk row shape. `ts_unix` stays a string on both read and write so the
/// identity key compares exactly what the file stores.
#[derive(Debug, Serialize, Deserialize)]
struct LogRecord {
    url: String,
    title: String,
    ts_unix: String,
    browser: String,
    profile: String,
}

/// Append `events` to the log at `out_csv`, skipping rows whose identity key
/// already exists. Returns the number of rows actually written.
///
/// The file is created (with header) when absent or empty; an existing
/// header is preserved. With no genuinely new candidates the file's contents
/// are left byte-for-byte unchanged.
pub fn append_events(out_csv: &Path, events: &[VisitEvent]) -> Result<u64> {
    let existing = read_existing_keys(out_csv);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(out_csv)
        .with_context(|| format!("cannot open {}", out_csv.display()))?;
    let need_header = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if need_header {
        writer.write_record(["url", "title", "ts_unix", "browser", "profile"])?;
    }

    let mut new_written = 0u64;
    for event in events {
        if existing.contains(&event.identity_key()) {
            continue;
        }
        writer.serialize(LogRecord {
            url: event.url.clone(),
            title: event.title.clone(),
            ts_unix: event.ts_key(),
            browser: event.browser.clone(),
            profile: event.profile.clone(),
        })?;
        new_written += 1;
    }
    writer.flush()?;
    Ok(new_written)
}

/// Identity keys of every row already in the log. Tolerates a missing or
/// header-only file; unreadable rows are skipped with a warning.
fn read_existing_keys(path: &Path) -> HashSet<(String, String, String)> {
    let mut keys = HashSet::new();
    if !path.exists() {
        return keys;
    }

    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("[warn] cannot read existing CSV {}: {}", path.display(), e);
            return keys;
        }
    };
    for record in reader.deserialize::<LogRecord>() {
        match record {
            Ok(row) => {
                keys.insert((row.url, row.ts_unix, row.profile));
            }
            Err(e) => eprintln!("[warn] malformed row in {}: {}", path.display(), e),
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event(url: &str, ts: f64) -> VisitEvent {
        VisitEvent {
            url: url.to_string(),
            title: "t".to_string(),
            ts_unix: ts,
            browser: "firefox".to_string(),
            profile: "default".to_string(),
        }
    }

    #[test]
    fn creates_file_with_header_and_appends() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_firefox.csv");

        let n = append_events(&csv_path, &[event("https://a", 1.0), event("https://b", 2.0)]).unwrap();
        assert_eq!(n, 2);

        let text = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("url,title,ts_unix,browser,profile"));
        assert_eq!(lines.clone().count(), 2);
    }

    #[test]
    fn dedup_appends_only_unseen_keys() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_firefox.csv");

        append_events(&csv_path, &[event("https://u1", 1.0), event("https://u2", 2.0)]).unwrap();
        // (u1, t1) is already present; only (u3, t3) is new.
        let n = append_events(&csv_path, &[event("https://u1", 1.0), event("https://u3", 3.0)]).unwrap();
        assert_eq!(n, 1);

        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text.lines().count(), 4); // header + 3 rows
        assert_eq!(text.matches("https://u1").count(), 1);
        assert!(text.contains("https://u3"));
    }

    #[test]
    fn same_url_different_timestamp_is_a_new_row() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_chrome.csv");

        append_events(&csv_path, &[event("https://a", 1.0)]).unwrap();
        let n = append_events(&csv_path, &[event("https://a", 1.001)]).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn no_new_candidates_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_edge.csv");

        append_events(&csv_path, &[event("https://a", 1.0)]).unwrap();
        let before = std::fs::read(&csv_path).unwrap();

        let n = append_events(&csv_path, &[event("https://a", 1.0)]).unwrap();
        assert_eq!(n, 0);
        assert_eq!(std::fs::read(&csv_path).unwrap(), before);
    }

    #[test]
    fn header_only_file_accepts_appends() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_safari.csv");
        std::fs::write(&csv_path, "url,title,ts_unix,browser,profile\n").unwrap();

        let n = append_events(&csv_path, &[event("https://a", 1.0)]).unwrap();
        assert_eq!(n, 1);

        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.lines().next(), Some("url,title,ts_unix,browser,profile"));
    }

    #[test]
    fn empty_candidate_list_creates_header_only_log() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("history_firefox.csv");

        let n = append_events(&csv_path, &[]).unwrap();
        assert_eq!(n, 0);
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text, "url,title,ts_unix,browser,profile\n");
    }
}
