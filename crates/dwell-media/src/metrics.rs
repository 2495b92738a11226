//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder. Without a recorder these calls are no-ops.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    pub const FRAMES_PROCESSED_TOTAL: &str = "dwell_frames_processed_total";
    pub const SAMPLES_TOTAL: &str = "dwell_samples_total";
    pub const VIOLATIONS_TOTAL: &str = "dwell_violations_total";
    pub const SESSIONS_TOTAL: &str = "dwell_sessions_total";
    pub const ORACLE_LATENCY_SECONDS: &str = "dwell_oracle_latency_seconds";
    pub const SESSION_DURATION_SECONDS: &str = "dwell_session_duration_seconds";
}

pub fn record_frame() {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
}

/// Record one oracle query and how long it took.
pub fn record_sample(latency_secs: f64) {
    counter!(names::SAMPLES_TOTAL).increment(1);
    histogram!(names::ORACLE_LATENCY_SECONDS).record(latency_secs);
}

pub fn record_violations(count: usize) {
    if count > 0 {
        counter!(names::VIOLATIONS_TOTAL).increment(count as u64);
    }
}

/// Record a finished session. `outcome` is `completed` or an error kind.
pub fn record_session(outcome: &str, duration_secs: f64) {
    counter!(names::SESSIONS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::SESSION_DURATION_SECONDS).record(duration_secs);
}
