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
SELECT urls.url, urls.title, visits.visit_time
FROM visits
JOIN urls ON urls.id = visits.url
WHERE urls.url LIKE 'http%' AND visits.visit_time > ?
"#;

/// Chrome and Edge share the Chromium schema and its 1601-epoch microsecond
/// clock; one collector parameterized by family key covers both. Each child
/// of a probe root holding a `History` file is one profile.
pub struct ChromiumCollector {
    family: &'static str,
    description: &'static str,
    roots: Vec<PathBuf>,
}

impl ChromiumCollector {
    pub fn chrome(roots: Option<Vec<PathBuf>>) -> Self {
        Self {
            family: "chrome",
            description: "Chrome/Chromium profiles (History, microseconds since 1601)",
            roots: roots.unwrap_or_else(default_chrome_roots),
        }
    }

    pub fn edge(roots: Option<Vec<PathBuf>>) -> Self {
        Self {
            family: "edge",
            description: "Microsoft Edge profiles (History, microseconds since 1601)",
            roots: roots.unwrap_or_else(default_edge_roots),
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

        for (url, title, visit_time) in rows {
            let ts = epoch::round_ms(epoch::chromium_us_to_unix(visit_time.unwrap_or(0)));
            if ts <= 0.0 {
                continue;
            }
            batch.events.push(VisitEvent {
                url,
                title: title.unwrap_or_default(),
                ts_unix: ts,
                browser: self.family.to_string(),
                profile: profile.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for ChromiumCollector {
    fn name(&self) -> &str {
        self.family
    }

    fn description(&self) -> &str {
        self.description
    }

    fn probe_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    async fn collect(&self, watermark: f64) -> Result<SourceBatch> {
        let floor_us = epoch::unix_to_chromium_us(watermark);
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
                let db_path = entry.path().join("History");
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
                    eprintln!("[skip] query error ({} {}): {:#}", self.family, profile, e);
                }
            }
        }
        Ok(batch)
    }
}

fn default_chrome_roots() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "macos" => dirs::home_dir()
            .map(|h| vec![h.join("Library/Application Support/Google/Chrome")])
            .unwrap_or_default(),
        "linux" => dirs::home_dir()
            .map(|h| vec![h.join(".config/google-chrome"), h.join(".config/chromium")])
            .unwrap_or_default(),
        "windows" => std::env::var_os("LOCALAPPDATA")
            .map(|d| vec![PathBuf::from(d).join("Google/Chrome/User Data")])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn default_edge_roots() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "macos" => dirs::home_dir()
            .map(|h| vec![h.join("Library/Application Support/Microsoft Edge")])
            .unwrap_or_default(),
        "linux" => dirs::home_dir()
            .map(|h| vec![h.join(".config/microsoft-edge")])
            .unwrap_or_default(),
        "windows" => std::env::var_os("LOCALAPPDATA")
            .map(|d| vec![PathBuf::from(d).join("Microsoft/Edge/User Data")])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
