//! Counters of what the controller did during a session.
//!
//! Only outcomes are counted; touch coordinates are never retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Activity counters for the current session.
#[derive(Debug)]
pub struct ActivityLog {
    /// Touch events received by the overlay
    touches: AtomicU64,
    /// Single taps dispatched
    single_taps: AtomicU64,
    /// Double taps dispatched
    double_taps: AtomicU64,
    /// Long presses that fired
    long_presses: AtomicU64,
    /// Torch requests accepted by the camera service
    torch_requests: AtomicU64,
    /// Torch requests that failed
    torch_failures: AtomicU64,
    /// Overlay relayouts
    relayouts: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            touches: AtomicU64::new(0),
            single_taps: AtomicU64::new(0),
            double_taps: AtomicU64::new(0),
            long_presses: AtomicU64::new(0),
            torch_requests: AtomicU64::new(0),
            torch_failures: AtomicU64::new(0),
            relayouts: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_touch(&self) {
        self.touches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_single_tap(&self) {
        self.single_taps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_double_tap(&self) {
        self.double_taps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_long_press(&self) {
        self.long_presses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_torch_request(&self) {
        self.torch_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_torch_failure(&self) {
        self.torch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relayout(&self) {
        self.relayouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ActivityStats {
        ActivityStats {
            touches: self.touches.load(Ordering::Relaxed),
            single_taps: self.single_taps.load(Ordering::Relaxed),
            double_taps: self.double_taps.load(Ordering::Relaxed),
            long_presses: self.long_presses.load(Ordering::Relaxed),
            torch_requests: self.torch_requests.load(Ordering::Relaxed),
            torch_failures: self.torch_failures.load(Ordering::Relaxed),
            relayouts: self.relayouts.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Activity:\n\
             - Touch events: {}\n\
             - Single taps (volume UI): {}\n\
             - Double taps (lock screen): {}\n\
             - Long presses: {}\n\
             - Torch requests: {} ({} failed)\n\
             - Overlay relayouts: {}\n\
             - Session duration: {} seconds",
            stats.touches,
            stats.single_taps,
            stats.double_taps,
            stats.long_presses,
            stats.torch_requests,
            stats.torch_failures,
            stats.relayouts,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.touches,
            &self.single_taps,
            &self.double_taps,
            &self.long_presses,
            &self.torch_requests,
            &self.torch_failures,
            &self.relayouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of activity statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStats {
    pub touches: u64,
    pub single_taps: u64,
    pub double_taps: u64,
    pub long_presses: u64,
    pub torch_requests: u64,
    pub torch_failures: u64,
    pub relayouts: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Shared activity log.
pub type SharedActivityLog = Arc<ActivityLog>;

/// Create a new shared activity log.
pub fn create_shared_log() -> SharedActivityLog {
    Arc::new(ActivityLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_counting() {
        let log = ActivityLog::new();

        log.record_touch();
        log.record_touch();
        log.record_double_tap();
        log.record_torch_failure();

        let stats = log.stats();
        assert_eq!(stats.touches, 2);
        assert_eq!(stats.double_taps, 1);
        assert_eq!(stats.torch_failures, 1);
        assert_eq!(stats.single_taps, 0);
    }

    #[test]
    fn test_activity_reset() {
        let log = ActivityLog::new();
        log.record_relayout();
        log.record_long_press();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.relayouts, 0);
        assert_eq!(stats.long_presses, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = ActivityLog::new();
        let summary = log.summary();

        assert!(summary.contains("Touch events"));
        assert!(summary.contains("lock screen"));
        assert!(summary.contains("Torch requests"));
    }
}
