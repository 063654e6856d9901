//! Run orchestration.
//!
//! Drives one collection run end to end: load the watermark store, run every
//! collector in an isolated worker task, merge results, append to the
//! per-source logs, persist the watermark mapping exactly once, and build the
//! run summary.
//!
//! Fault policy: a fault in one source must not abort the run. Errors,
//! panics, and timeouts become a `failed`/`timed_out` status
//! with zero rows and an unchanged watermark; warnings go to stderr so
//! stdout stays machine-readable. The watermark mapping is written once,
//! after every source has been processed, so a crash mid-run leaves the
//! previous run's mapping intact rather than a partially updated one.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::collector::{CollectorRegistry, SourceBatch};
use crate::config::Config;
use crate::log_writer;
use crate::models::{RunSummary, SourceReport, SourceStatus, VisitEvent};
use crate::watermarks::WatermarkStore;

enum Outcome {
    Collected(SourceBatch),
    Failed(String),
    TimedOut,
}

/// Execute one collection run with the built-in backend families.
pub async fn run(config: &Config) -> Result<RunSummary> {
    run_with_registry(config, CollectorRegistry::from_config(config)).await
}

/// Execute one collection run over an explicit registry.
///
/// Split out from [`run`] so tests (and embedders) can inject their own
/// collectors.
pub async fn run_with_registry(
    config: &Config,
    registry: CollectorRegistry,
) -> Result<RunSummary> {
    std::fs::create_dir_all(&config.output.dir).with_context(|| {
        format!(
            "cannot create output directory {}",
            config.output.dir.display()
        )
    })?;

    let mut store = WatermarkStore::load(&config.state.path);

    let pool = Arc::new(Semaphore::new(config.run.max_parallel));
    let per_source_timeout = Duration::from_secs(config.run.source_timeout_secs);

    let mut tasks: JoinSet<(usize, Outcome)> = JoinSet::new();
    for (idx, collector) in registry.collectors().iter().enumerate() {
        let collector = Arc::clone(collector);
        let pool = Arc::clone(&pool);
        let watermark = store.get(collector.name());
        tasks.spawn(async move {
            let _permit = match pool.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (idx, Outcome::Failed("worker pool closed".to_string())),
            };
            match timeout(per_source_timeout, collector.collect(watermark)).await {
                Ok(Ok(batch)) => (idx, Outcome::Collected(batch)),
                Ok(Err(e)) => (idx, Outcome::Failed(format!("{:#}", e))),
                Err(_) => (idx, Outcome::TimedOut),
            }
        });
    }

    // A panicked task never reports its index; the slot stays empty and is
    // treated as a failure below.
    let mut outcomes: Vec<Option<Outcome>> = Vec::new();
    outcomes.resize_with(registry.len(), || None);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
            Err(e) => eprintln!("[skip] collector task crashed: {}", e),
        }
    }

    let dev_dir = config.output.dir.join("dev");
    if config.output.dev_json {
        if let Err(e) = std::fs::create_dir_all(&dev_dir) {
            eprintln!("[warn] cannot create dev dir {}: {}", dev_dir.display(), e);
        }
    }

    let mut per_source = Vec::with_capacity(registry.len());
    let mut all_events: Vec<VisitEvent> = Vec::new();
    let mut total_new = 0u64;

    for (idx, collector) in registry.collectors().iter().enumerate() {
        let name = collector.name().to_string();
        let prev = store.get(&name);

        let outcome = outcomes[idx]
            .take()
            .unwrap_or_else(|| Outcome::Failed("collector task panicked".to_string()));
        let (status, events) = match outcome {
            Outcome::Collected(batch) => {
                if let Some(max_ts) = batch.max_ts() {
                    store.observe(&name, max_ts);
                }
                (SourceStatus::Ok, batch.events)
            }
            Outcome::Failed(reason) => {
                eprintln!("[skip] collector failed ({}): {}", name, reason);
                (SourceStatus::Failed, Vec::new())
            }
            Outcome::TimedOut => {
                eprintln!("[skip] collector timed out ({})", name);
                (SourceStatus::TimedOut, Vec::new())
            }
        };

        if config.output.dev_json {
            write_dev_json(&dev_dir.join(format!("{}_diff.json", name)), &events);
        }

        let out_csv = config.output.dir.join(format!("history_{}.csv", name));
        let new_rows = match log_writer::append_events(&out_csv, &events) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("[warn] cannot write log {}: {:#}", out_csv.display(), e);
                0
            }
        };
        total_new += new_rows;

        per_source.push(SourceReport {
            source: name.clone(),
            status,
            new_rows,
            prev_last_ts: prev,
            new_last_ts: store.get(&name),
        });

        if config.output.dev_json {
            all_events.extend(events);
        }
    }

    if let Err(e) = store.save() {
        eprintln!(
            "[warn] cannot save state {}: {:#}",
            store.path().display(),
            e
        );
    }

    let summary = RunSummary {
        os: std::env::consts::OS.to_string(),
        run_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        total_new,
        state_file: store.path().display().to_string(),
        per_source,
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(text) => {
            let path = config.output.dir.join("summary.json");
            if let Err(e) = std::fs::write(&path, &text) {
                eprintln!("[warn] cannot write {}: {}", path.display(), e);
            }
            if config.output.dev_json {
                let path = dev_dir.join("summary.dev.json");
                if let Err(e) = std::fs::write(&path, &text) {
                    eprintln!("[warn] cannot write {}: {}", path.display(), e);
                }
            }
        }
        Err(e) => eprintln!("[warn] cannot serialize summary: {}", e),
    }
    if config.output.dev_json {
        write_dev_json(&dev_dir.join("all_findings.json"), &all_events);
    }

    Ok(summary)
}

fn write_dev_json(path: &std::path::Path, events: &[VisitEvent]) {
    match serde_json::to_string_pretty(events) {
        Ok(text) => {
            if let Err(e) = std::fs::write(path, text) {
                eprintln!("[warn] cannot write dev json {}: {}", path.display(), e);
            }
        }
        Err(e) => eprintln!("[warn] cannot serialize dev json {}: {}", path.display(), e),
    }
}
