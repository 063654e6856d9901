use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::collector::{Collector, SourceBatch};
use crate::db;
use crate::epoch;
use crate::models::VisitEvent;
use crate::snapshot;

const VISITS_QUERY: &str = r#"
SELECT p.url, p.title, v.visit_date
FROM moz_historyvisits v
JOIN moz_places p ON p.id = v.place_id
WHERE p.url LIKE 'http%' AND v.visit_date > ?
"#;

/// Firefox keeps one `places.sqlite` per profile directory; visit times are
/// microseconds since the Unix epoch.
pub struct FirefoxCollector {
    roots: Vec<PathBuf>,
}

impl FirefoxCollector {
    pub fn new(roots: Option<Vec<PathBuf>>) -> Self {
        Self {
            roots: roots.unwrap_or_else(default_roots),
        }
    }

    async fn collect_profile(
        &self,
        db_path: &Path,
        profile: &str,
        floor_us: i64,
        batch: &mut SourceBatch,
    ) -> Result<()> {
        let mut conn = db::open_readonly(db_path).await?;
        let rows: Vec<(String, Option<String>, Option<i64>)> = sqlx::query_as(VISITS_QUERY)
            .bind(floor_us)
            .fetch_all(&mut conn)
            .await?;

        for (url, title, visit_date) in rows {
            let ts = epoch::round_ms(epoch::firefox_us_to_unix(visit_date.unwrap_or(0)));
            if ts <= 0.0 {
                continue;
            }
            batch.events.push(VisitEvent {
                url,
                title: title.unwrap_or_default(),
                ts_unix: ts,
                browser: "firefox".to_string(),
                profile: profile.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for FirefoxCollector {
    fn name(&self) -> &str {
        "firefox"
    }

    fn description(&self) -> &str {
        "Firefox profiles (places.sqlite, microseconds since 1970)"
    }

    fn probe_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    async fn collect(&self, watermark: f64) -> Result<SourceBatch> {
        let floor_us = epoch::unix_to_firefox_us(watermark);
        let mut batch = SourceBatch::default();

        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let db_path = entry.path().join("places.sqlite");
                if !db_path.is_file() {
                    continue;
                }
                let profile = entry.file_name().to_string_lossy().to_string();

                let snap = match snapshot::acquire(&db_path) {
                    Ok(snap) => snap,
                    Err(e) => {
                        eprintln!("[skip] cannot copy {}: {:#}", db_path.display(), e);
                        continue;
                    }
                };
                if let Err(e) = self
                    .collect_profile(snap.path(), &profile, floor_us, &mut batch)
                    .await
                {
                    eprintln!("[skip] query error (firefox {}): {:#}", profile, e);
                }
            }
        }
        Ok(batch)
    }
}

fn default_roots() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "macos" => dirs::home_dir()
            .map(|h| vec![h.join("Library/Application Support/Firefox/Profiles")])
            .unwrap_or_default(),
        "linux" => dirs::home_dir()
            .map(|h| vec![h.join(".mozilla/firefox")])
            .unwrap_or_default(),
        "windows" => std::env::var_os("APPDATA")
            .map(|d| vec![PathBuf::from(d).join("Mozilla/Firefox/Profiles")])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
