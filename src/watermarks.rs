//! Per-source collection watermarks, persisted across runs.
//!
//! The store is a plain `source → highest collected canonical timestamp`
//! mapping kept in a JSON file. It is loaded once at run start, mutated only
//! by the coordinator, and persisted exactly once at run end. A missing file
//! means a first run; a corrupt file falls back to an empty mapping with a
//! warning instead of failing the run.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct WatermarkStore {
    path: PathBuf,
    marks: BTreeMap<String, f64>,
}

impl WatermarkStore {
    /// Load the store from `path`.
    pub fn load(path: &Path) -> Self {
        let marks = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
            {
                Ok(marks) => marks,
                Err(e) => {
                    eprintln!(
                        "[warn] cannot parse state file {}: {}, starting fresh",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Self {
            path: path.to_path_buf(),
            marks,
        }
    }

    /// Watermark for one source; `0.0` means never collected.
    pub fn get(&self, source: &str) -> f64 {
        self.marks.get(source).copied().unwrap_or(0.0)
    }

    /// Raise a source's watermark. Never decreases it.
    pub fn observe(&mut self, source: &str, ts: f64) {
        if ts > self.get(source) {
            self.marks.insert(source.to_string(), ts);
        }
    }

    /// Write the mapping back to disk.
    ///
    /// Callers treat failure as a warning; the previous on-disk mapping is
    /// left intact for the next run.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.marks)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("cannot write state file {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marks(&self) -> &BTreeMap<String, f64> {
        &self.marks
    }
}
