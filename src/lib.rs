//! # History Harness
//!
//! Incremental, fault-isolated collection of browsing history from local
//! browser databases.
//!
//! History Harness harvests visit events from four backend families
//! (Firefox, Chrome, Edge, Safari), each with its own schema and timestamp
//! encoding, and appends them, deduplicated, to one durable CSV log per
//! family. A persisted per-source watermark makes re-runs incremental and
//! idempotent: only visits strictly newer than the watermark are collected,
//! and collecting nothing new changes nothing on disk.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌────────────┐
//! │  Collectors   │──▶│ Normalize │──▶│ Dedup +    │
//! │ FF/Chrome/    │   │ to Unix   │   │ append CSV │
//! │ Edge/Safari   │   │ seconds   │   │ per source │
//! └──────┬───────┘   └───────────┘   └─────┬──────┘
//!        │ snapshot of locked db            │
//!        ▼                                  ▼
//! ┌──────────────┐                   ┌────────────┐
//! │ Watermarks    │◀──── max(ts) ────│ Coordinator │──▶ summary.json
//! │ (state file)  │                   └────────────┘    + stdout JSON
//! └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`epoch`] | Native timestamp ↔ Unix seconds conversions |
//! | [`snapshot`] | Private copies of locked database files |
//! | [`watermarks`] | Persisted per-source watermark store |
//! | [`collector`] | Collector trait and registry |
//! | [`backend_firefox`] | Firefox collector |
//! | [`backend_chromium`] | Chrome/Edge collector |
//! | [`backend_safari`] | Safari collector |
//! | [`log_writer`] | Dedup-append CSV event logs |
//! | [`coordinator`] | Run orchestration and summary |
//! | [`db`] | Read-only SQLite connections |

pub mod backend_chromium;
pub mod backend_firefox;
pub mod backend_safari;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod epoch;
pub mod log_writer;
pub mod models;
pub mod snapshot;
pub mod sources;
pub mod watermarks;
