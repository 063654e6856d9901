//! Core data types used throughout History Harness.
//!
//! These types represent the visit events that flow from the backend
//! collectors to the per-source logs, and the run summary produced at the
//! end of every collection run.

use serde::Serialize;

/// One browsing-visit record, normalized to canonical time.
///
/// `ts_unix` is seconds since the Unix epoch (UTC), rounded to millisecond
/// precision at normalization time so that the identity key is stable across
/// runs and float formatting.
#[derive(Debug, Clone, Serialize)]
pub struct VisitEvent {
    pub url: String,
    pub title: String,
    pub ts_unix: f64,
    pub browser: String,
    pub profile: String,
}

impl VisitEvent {
    /// The timestamp as a fixed-precision string (three decimal places),
    /// exactly as it is written to the event log.
    pub fn ts_key(&self) -> String {
        format!("{:.3}", self.ts_unix)
    }

    /// Identity key for dedup within one backend family's log.
    pub fn identity_key(&self) -> (String, String, String) {
        (self.url.clone(), self.ts_key(), self.profile.clone())
    }
}

/// Terminal outcome of one source's collection, as reported in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// The collector returned, possibly with zero events.
    Ok,
    /// The collector returned an error or its task panicked.
    Failed,
    /// The collector did not return within the per-source timeout.
    TimedOut,
}

/// Per-source entry of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub status: SourceStatus,
    pub new_rows: u64,
    pub prev_last_ts: f64,
    pub new_last_ts: f64,
}

/// Machine-readable result of one collection run.
///
/// Emitted as JSON on stdout and written (best-effort) to
/// `<out>/summary.json`. Reflects only successfully completed work;
/// warnings go to stderr.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub os: String,
    pub run_utc: String,
    pub total_new: u64,
    pub state_file: String,
    pub per_source: Vec<SourceReport>,
}
