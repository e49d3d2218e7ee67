//! Observability for the depth view
//!
//! Counters plus a bounded latency window for the recompute hot path,
//! exported as a sorted map for scraping. One instance per view.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Core metrics for one depth view instance.
pub struct ViewMetrics {
    /// Book change notifications received while bound.
    pub notifications_received: AtomicU64,
    /// Snapshots rebuilt (published or pulled).
    pub snapshots_built: AtomicU64,
    /// Snapshots pushed to the sink.
    pub snapshots_published: AtomicU64,
    /// Aggregation step changes that actually took effect.
    pub step_changes: AtomicU64,
    /// Recompute latency samples in nanoseconds.
    pub recompute_ns: Mutex<LatencyTracker>,
}

impl ViewMetrics {
    pub fn new() -> Self {
        Self {
            notifications_received: AtomicU64::new(0),
            snapshots_built: AtomicU64::new(0),
            snapshots_published: AtomicU64::new(0),
            step_changes: AtomicU64::new(0),
            recompute_ns: Mutex::new(LatencyTracker::new(1000)),
        }
    }

    /// Record a book change notification.
    pub fn record_notification(&self) {
        self.notifications_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a snapshot rebuild and its latency.
    pub fn record_recompute(&self, latency_ns: u64) {
        self.snapshots_built.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tracker) = self.recompute_ns.lock() {
            tracker.record(latency_ns);
        }
    }

    /// Record a snapshot pushed to the sink.
    pub fn record_publish(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an effective aggregation step change.
    pub fn record_step_change(&self) {
        self.step_changes.fetch_add(1, Ordering::Relaxed);
    }

    /// p99 recompute latency in nanoseconds, if any samples exist.
    pub fn recompute_p99_ns(&self) -> Option<u64> {
        self.recompute_ns.lock().ok()?.percentile(99)
    }

    /// Export counters as a sorted map for exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert(
            "notifications_received".to_string(),
            self.notifications_received.load(Ordering::Relaxed),
        );
        m.insert(
            "snapshots_built".to_string(),
            self.snapshots_built.load(Ordering::Relaxed),
        );
        m.insert(
            "snapshots_published".to_string(),
            self.snapshots_published.load(Ordering::Relaxed),
        );
        m.insert(
            "step_changes".to_string(),
            self.step_changes.load(Ordering::Relaxed),
        );
        m
    }
}

impl Default for ViewMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks latency samples in a bounded window for percentile calculation.
pub struct LatencyTracker {
    samples: Vec<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a latency sample, evicting the oldest past the window.
    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(value);
    }

    /// Get a percentile value (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let idx = (p as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    /// Average latency across the window.
    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as u64)
    }

    /// Number of samples recorded.
    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_recording() {
        let metrics = ViewMetrics::new();

        metrics.record_notification();
        metrics.record_recompute(500);
        metrics.record_recompute(800);
        metrics.record_publish();
        metrics.record_step_change();

        let exported = metrics.export();
        assert_eq!(exported["notifications_received"], 1);
        assert_eq!(exported["snapshots_built"], 2);
        assert_eq!(exported["snapshots_published"], 1);
        assert_eq!(exported["step_changes"], 1);
    }

    #[test]
    fn test_latency_percentile() {
        let mut tracker = LatencyTracker::new(100);
        for i in 1..=100 {
            tracker.record(i);
        }

        let p50 = tracker.percentile(50).unwrap();
        assert!((49..=51).contains(&p50));

        let p99 = tracker.percentile(99).unwrap();
        assert!((98..=100).contains(&p99));
    }

    #[test]
    fn test_latency_average() {
        let mut tracker = LatencyTracker::new(10);
        tracker.record(100);
        tracker.record(200);
        tracker.record(300);
        assert_eq!(tracker.average().unwrap(), 200);
    }

    #[test]
    fn test_latency_window_eviction() {
        let mut tracker = LatencyTracker::new(3);
        tracker.record(10);
        tracker.record(20);
        tracker.record(30);
        tracker.record(40); // evicts 10

        assert_eq!(tracker.count(), 3);
        assert_eq!(tracker.average().unwrap(), 30);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = LatencyTracker::new(10);
        assert!(tracker.percentile(99).is_none());
        assert!(tracker.average().is_none());
    }

    #[test]
    fn test_p99_via_metrics() {
        let metrics = ViewMetrics::new();
        assert!(metrics.recompute_p99_ns().is_none());

        metrics.record_recompute(1000);
        assert_eq!(metrics.recompute_p99_ns(), Some(1000));
    }
}
