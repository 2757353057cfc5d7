//! Per-session counters for the layout tracker.
//!
//! Plain counters plus latency aggregates; the session owns them and resets
//! them with the rest of its state.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricCounter {
    pub total: u64,
    pub avg_ms: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricSnapshot {
    pub add: MetricCounter,
    pub update: MetricCounter,
    pub rejected_adds: u64,
    pub ignored_updates: u64,
    pub removes: u64,
    pub drained: u64,
}

#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    add_total: u64,
    add_lat_ns: u64,
    update_total: u64,
    update_lat_ns: u64,
    rejected_adds: u64,
    ignored_updates: u64,
    removes: u64,
    drained: u64,
}

impl LayoutMetrics {
    pub fn record_add(&mut self, duration: Duration) {
        self.add_total += 1;
        self.add_lat_ns = self.add_lat_ns.saturating_add(duration_to_nanos(duration));
    }

    pub fn record_rejected_add(&mut self) {
        self.rejected_adds += 1;
    }

    pub fn record_update(&mut self, duration: Duration) {
        self.update_total += 1;
        self.update_lat_ns = self
            .update_lat_ns
            .saturating_add(duration_to_nanos(duration));
    }

    pub fn record_ignored_update(&mut self) {
        self.ignored_updates += 1;
    }

    pub fn record_remove(&mut self) {
        self.removes += 1;
    }

    pub fn record_drain(&mut self, count: usize) {
        self.drained += count as u64;
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            add: make_counter(self.add_total, self.add_lat_ns),
            update: make_counter(self.update_total, self.update_lat_ns),
            rejected_adds: self.rejected_adds,
            ignored_updates: self.ignored_updates,
            removes: self.removes,
            drained: self.drained,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn make_counter(total: u64, nanos: u64) -> MetricCounter {
    let avg_ms = if total == 0 {
        0.0
    } else {
        (nanos as f64 / total as f64) / 1_000_000.0
    };
    MetricCounter { total, avg_ms }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    let nanos = duration.as_nanos();
    if nanos > u64::MAX as u128 {
        u64::MAX
    } else {
        nanos as u64
    }
}
