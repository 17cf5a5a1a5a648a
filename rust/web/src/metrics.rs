use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lightweight process counters exposed at `/api/metrics`.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    total_connections: AtomicU64,
    active_players: AtomicU64,
    calls_emitted: AtomicU64,
    claims_accepted: AtomicU64,
    claims_rejected: AtomicU64,
    rounds_completed: AtomicU64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_connections: u64,
    pub active_players: u64,
    pub calls_emitted: u64,
    pub claims_accepted: u64,
    pub claims_rejected: u64,
    pub rounds_completed: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connection(&self) {
        self.inner.total_connections.fetch_add(1, Ordering::Relaxed);
        self.inner.active_players.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disconnection(&self) {
        // Saturating decrement; the gauge must not wrap if a disconnect is
        // reported twice.
        let _ = self
            .inner
            .active_players
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                v.checked_sub(1)
            });
    }

    pub fn record_call(&self) {
        self.inner.calls_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim_accepted(&self) {
        self.inner.claims_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim_rejected(&self) {
        self.inner.claims_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_round_completed(&self) {
        self.inner.rounds_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.inner.total_connections.load(Ordering::Relaxed),
            active_players: self.inner.active_players.load(Ordering::Relaxed),
            calls_emitted: self.inner.calls_emitted.load(Ordering::Relaxed),
            claims_accepted: self.inner.claims_accepted.load(Ordering::Relaxed),
            claims_rejected: self.inner.claims_rejected.load(Ordering::Relaxed),
            rounds_completed: self.inner.rounds_completed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsCollector::new();
        metrics.record_connection();
        metrics.record_connection();
        metrics.record_call();
        metrics.record_claim_accepted();
        metrics.record_claim_rejected();
        metrics.record_round_completed();

        let snap = metrics.snapshot();
        assert_eq!(snap.total_connections, 2);
        assert_eq!(snap.active_players, 2);
        assert_eq!(snap.calls_emitted, 1);
        assert_eq!(snap.claims_accepted, 1);
        assert_eq!(snap.claims_rejected, 1);
        assert_eq!(snap.rounds_completed, 1);
    }

    #[test]
    fn active_players_gauge_never_wraps() {
        let metrics = MetricsCollector::new();
        metrics.record_connection();
        metrics.record_disconnection();
        metrics.record_disconnection();

        let snap = metrics.snapshot();
        assert_eq!(snap.active_players, 0);
        assert_eq!(snap.total_connections, 1);
    }

    #[test]
    fn clones_share_state() {
        let metrics = MetricsCollector::new();
        let other = metrics.clone();
        other.record_call();
        assert_eq!(metrics.snapshot().calls_emitted, 1);
    }
}
