//! Request timing and the health endpoint payload.

use std::time::Instant;
use tracing::{debug, info};

/// Times one named operation from construction to `finish`.
///
/// Handlers wrap their expensive section in a tracker so slow requests show
/// up in the logs without any sampling infrastructure. Anything over a second
/// is promoted to info level.
pub struct LatencyTracker {
    name: String,
    start: Instant,
}

impl LatencyTracker {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Log the elapsed time and consume the tracker.
    pub fn finish(self) {
        let elapsed_ms = self.start.elapsed().as_millis();
        if elapsed_ms > 1000 {
            info!(operation = %self.name, elapsed_ms, "slow operation");
        } else {
            debug!(operation = %self.name, elapsed_ms, "operation complete");
        }
    }
}

/// Body of `GET /api/v1/health`.
///
/// `status` is "ok" while the database answers a ping, "degraded" otherwise.
/// The process stays up either way so the proxy can report the distinction.
#[derive(Debug, serde::Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub db_ok: bool,
}

impl HealthStatus {
    pub fn ok(uptime_secs: u64, db_ok: bool) -> Self {
        Self {
            status: if db_ok { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs,
            db_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_database_reports_ok() {
        let h = HealthStatus::ok(300, true);
        assert_eq!(h.status, "ok");
        assert!(h.db_ok);
    }

    #[test]
    fn failed_ping_reports_degraded() {
        let h = HealthStatus::ok(300, false);
        assert_eq!(h.status, "degraded");
    }
}
