//! Cumulative wager/payout tracking.
//!
//! The long-run ratio `total_paid_out / total_wagered` is the measured
//! RTP, the property the tier tables are tuned against. Fed by the
//! orchestrator after every settlement; free spins add to payout but not
//! to wagered, which is exactly how they affect the real return.

use crate::engine::types::Amount;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RtpSnapshot {
    pub total_wagered: Amount,
    pub total_paid_out: Amount,
    pub spin_count: u64,
    pub free_spin_count: u64,
    pub bonus_count: u64,
    pub jackpot_count: u64,
}

impl RtpSnapshot {
    /// Measured return-to-player; zero before any wagered spin.
    pub fn measured_rtp(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        self.total_paid_out as f64 / self.total_wagered as f64
    }

    /// House edge, the complement of the measured RTP.
    pub fn house_edge(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        1.0 - self.measured_rtp()
    }
}

/// Thread-safe cumulative tracker.
#[derive(Debug, Default)]
pub struct RtpTracker {
    inner: RwLock<RtpSnapshot>,
}

impl RtpTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spin(&self, wagered: Amount, paid_out: Amount, free_spin: bool) {
        let mut snapshot = self.inner.write().expect("stats lock poisoned");
        snapshot.total_wagered += wagered;
        snapshot.total_paid_out += paid_out;
        snapshot.spin_count += 1;
        if free_spin {
            snapshot.free_spin_count += 1;
        }
    }

    pub fn record_bonus(&self) {
        self.inner.write().expect("stats lock poisoned").bonus_count += 1;
    }

    pub fn record_jackpot(&self) {
        self.inner
            .write()
            .expect("stats lock poisoned")
            .jackpot_count += 1;
    }

    pub fn snapshot(&self) -> RtpSnapshot {
        *self.inner.read().expect("stats lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_rtp() {
        let tracker = RtpTracker::new();
        tracker.record_spin(100, 90, false);
        tracker.record_spin(100, 90, false);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.spin_count, 2);
        assert!((snapshot.measured_rtp() - 0.9).abs() < 1e-12);
        assert!((snapshot.house_edge() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_free_spins_count_payout_only() {
        let tracker = RtpTracker::new();
        tracker.record_spin(100, 0, false);
        tracker.record_spin(0, 50, true);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_wagered, 100);
        assert_eq!(snapshot.total_paid_out, 50);
        assert_eq!(snapshot.free_spin_count, 1);
        assert!((snapshot.measured_rtp() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_tracker_reports_zero() {
        let tracker = RtpTracker::new();
        assert_eq!(tracker.snapshot().measured_rtp(), 0.0);
        assert_eq!(tracker.snapshot().house_edge(), 0.0);
    }
}
