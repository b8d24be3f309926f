//! `GET /health` payload and server-wide request statistics.
//!
//! [`Stats`] is shared between the axum fallback (which records every
//! response) and the API (which reports it). [`report`] assembles the
//! [`HealthResponse`] JSON body: version, uptime, directory sizes and
//! cumulative request counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::directory::repository::Directory;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub directory: DirectoryHealth,
    pub stats: StatsResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryHealth {
    pub employees: usize,
    pub managers: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_handled: u64,
    pub requests_failed: u64,
}

#[derive(Debug)]
pub struct Stats {
    pub handled: AtomicU64,
    pub failed: AtomicU64,
    started: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handled: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Count one finished request. Server errors also count as failed.
    pub fn record(&self, status: StatusCode) {
        self.handled.fetch_add(1, Ordering::Relaxed);
        if status.is_server_error() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl HealthResponse {
    /// Human-readable summary printed by `roster health`.
    #[must_use]
    pub fn summary(&self, url: &str) -> String {
        format!(
            "\u{2713} roster is {} ({url})\n  \
             version:    {}\n  \
             uptime:     {}\n  \
             directory:  {} employees, {} managers\n  \
             requests:   {} handled, {} failed\n",
            self.status,
            self.version,
            format_uptime(self.uptime_seconds),
            self.directory.employees,
            self.directory.managers,
            self.stats.requests_handled,
            self.stats.requests_failed,
        )
    }
}

fn format_uptime(seconds: u64) -> String {
    match (seconds / 3600, seconds % 3600 / 60, seconds % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}

pub async fn report(directory: &Directory, stats: &Stats) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: stats.uptime_seconds(),
        directory: DirectoryHealth {
            employees: directory.employees.count().await,
            managers: directory.managers.count().await,
        },
        stats: StatsResponse {
            requests_handled: stats.handled.load(Ordering::Relaxed),
            requests_failed: stats.failed.load(Ordering::Relaxed),
        },
    }
}
