use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::collector::{Collector, SourceBatch};
use crate::db;
use crate::epoch;
use crate::models::VisitEvent;
use crate::snapshot;

const VISITS_QUERY: &str = r#"
SELECT hi.url, hi.title, hv.visit_time
FROM history_visits hv
JOIN history_items hi ON hi.id = hv.history_item
WHERE hi.url LIKE 'http%' AND hv.visit_time > ?
"#;

/// Safari keeps a single `History.db` per user; visit times are fractional
/// seconds since 2001-01-01 UTC. The probe roots are candidate database
/// files rather than profile directories, and are empty off macOS, so the
/// source simply reports as unavailable elsewhere.
pub struct SafariCollector {
    roots: Vec<PathBuf>,
}

impl SafariCollector {
    pub fn new(roots: Option<Vec<PathBuf>>) -> Self {
        Self {
            roots: roots.unwrap_or_else(default_roots),
        }
    }

    async fn collect_db(&self, db_path: &Path, floor_s: f64, batch: &mut SourceBatch) -> Result<()> {
        let mut conn = db::open_readonly(db_path).await?;
        let rows: Vec<(String, Option<String>, Option<f64>)> = sqlx::query_as(VISITS_QUERY)
            .bind(floor_s)
            .fetch_all(&mut conn)
            .await?;

        for (url, title, visit_time) in rows {
            let ts = epoch::round_ms(epoch::safari_s_to_unix(visit_time.unwrap_or(0.0)));
            if ts <= 0.0 {
                continue;
            }
            batch.events.push(VisitEvent {
                url,
                title: title.unwrap_or_default(),
                ts_unix: ts,
                browser: "safari".to_string(),
                profile: "default".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for SafariCollector {
    fn name(&self) -> &str {
        "safari"
    }

    fn description(&self) -> &str {
        "Safari history (History.db, seconds since 2001, macOS only)"
    }

    fn probe_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    async fn collect(&self, watermark: f64) -> Result<SourceBatch> {
        let floor_s = epoch::unix_to_safari_s(watermark);
        let mut batch = SourceBatch::default();

        for db_path in &self.roots {
            if !db_path.is_file() {
                continue;
            }
            let snap = match snapshot::acquire(db_path) {
                Ok(snap) => snap,
                Err(e) => {
                    eprintln!("[skip] cannot copy {}: {:#}", db_path.display(), e);
                    continue;
                }
            };
            if let Err(e) = self.collect_db(snap.path(), floor_s, &mut batch).await {
                eprintln!("[skip] query error (safari): {:#}", e);
            }
        }
        Ok(batch)
    }
}

fn default_roots() -> Vec<PathBuf> {
    if std::env::consts::OS != "macos" {
        return Vec::new();
    }
    dirs::home_dir()
        .map(|h| vec![h.join("Library/Safari/History.db")])
        .unwrap_or_default()
}
