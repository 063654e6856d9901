//! The collector abstraction over backend families.
//!
//! Each backend family (distinct history schema + timestamp encoding) is one
//! [`Collector`] implementation. The coordinator is backend-agnostic: it asks
//! the registry for every collector, hands each its watermark, and gets back
//! a [`SourceBatch`] of normalized events. Collectors never touch shared
//! state; watermark updates and log appends happen in the coordinator after
//! a collector has fully returned.

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend_chromium::ChromiumCollector;
use crate::backend_firefox::FirefoxCollector;
use crate::backend_safari::SafariCollector;
use crate::config::Config;
use crate::models::VisitEvent;

/// Everything one backend family produced in one run.
#[derive(Debug, Default)]
pub struct SourceBatch {
    /// Normalized events, in the order the backend query returned them.
    pub events: Vec<VisitEvent>,
}

impl SourceBatch {
    /// Highest canonical timestamp observed this run, if any events.
    pub fn max_ts(&self) -> Option<f64> {
        self.events
            .iter()
            .map(|e| e.ts_unix)
            .fold(None, |max, ts| match max {
                Some(m) if m >= ts => Some(m),
                _ => Some(ts),
            })
    }
}

/// A backend family that can produce normalized new-since-watermark events.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Backend family key (`"firefox"`, `"chrome"`, `"edge"`, `"safari"`).
    /// Also the watermark key and the event-log file suffix.
    fn name(&self) -> &str;

    /// One-line description for `hist sources` output.
    fn description(&self) -> &str;

    /// Candidate locations probed for profile databases.
    fn probe_roots(&self) -> &[PathBuf];

    /// Collect events strictly newer than `watermark` (canonical seconds)
    /// across every profile found under the probe roots.
    ///
    /// A profile that cannot be read is skipped with a warning; an `Err`
    /// from this method is isolated at the coordinator boundary and turns
    /// into a zero-result, unchanged-watermark outcome for this source.
    async fn collect(&self, watermark: f64) -> Result<SourceBatch>;
}

/// Registry of collectors, in stable summary order.
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            collectors: Vec::new(),
        }
    }

    /// Create a registry with all four built-in backend families, applying
    /// probe-root overrides from the config.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FirefoxCollector::new(
            config.sources.firefox.roots.clone(),
        )));
        registry.register(Arc::new(ChromiumCollector::chrome(
            config.sources.chrome.roots.clone(),
        )));
        registry.register(Arc::new(ChromiumCollector::edge(
            config.sources.edge.roots.clone(),
        )));
        registry.register(Arc::new(SafariCollector::new(
            config.sources.safari.roots.clone(),
        )));
        registry
    }

    /// Register a collector.
    pub fn register(&mut self, collector: Arc<dyn Collector>) {
        self.collectors.push(collector);
    }

    /// All registered collectors.
    pub fn collectors(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    /// Find a collector by family key.
    pub fn find(&self, name: &str) -> Option<&dyn Collector> {
        self.collectors
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
