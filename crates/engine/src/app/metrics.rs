use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::sim::TickReport;

static POISON_WARNED: AtomicBool = AtomicBool::new(false);

/// Per-interval loop statistics, published once per metrics interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub worst_frame_ms: f32,
    pub map_switches: u32,
    pub wander_commits: u32,
}

/// Shared read side for the latest snapshot. A poisoned lock is recovered
/// rather than propagated.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        let guard = self.latest.read().unwrap_or_else(|poisoned| {
            warn_poison_once("read");
            poisoned.into_inner()
        });
        *guard
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        let mut guard = self.latest.write().unwrap_or_else(|poisoned| {
            warn_poison_once("write");
            poisoned.into_inner()
        });
        *guard = snapshot;
    }
}

fn warn_poison_once(operation: &'static str) {
    if !POISON_WARNED.swap(true, Ordering::Relaxed) {
        warn!(operation, "metrics_lock_poisoned");
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    started: Instant,
    frames: u32,
    ticks: u32,
    frame_time_total: Duration,
    worst_frame: Duration,
    map_switches: u32,
    wander_commits: u32,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    fn starting_at(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            started,
            frames: 0,
            ticks: 0,
            frame_time_total: Duration::ZERO,
            worst_frame: Duration::ZERO,
            map_switches: 0,
            wander_commits: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, report: &TickReport) {
        self.ticks = self.ticks.saturating_add(1);
        if report.map_switch.is_some() {
            self.map_switches = self.map_switches.saturating_add(1);
        }
        let commits = u32::try_from(report.wander_commits).unwrap_or(u32::MAX);
        self.wander_commits = self.wander_commits.saturating_add(commits);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            worst_frame_ms: self.worst_frame.as_secs_f32() * 1000.0,
            map_switches: self.map_switches,
            wander_commits: self.wander_commits,
        };
        *self = Self::starting_at(self.interval, now);
        Some(snapshot)
    }
}
