//! Engine statistics
//!
//! Lock-free counters bumped from the tap and tick paths, plus a
//! serializable snapshot for logging at shutdown.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Engine counters
#[derive(Debug)]
pub struct EngineStats {
    /// Raw scroll events delivered by the tap
    pub events_seen: AtomicU64,
    /// Raw events suppressed in favour of smoothed output
    pub events_consumed: AtomicU64,
    /// Raw events handed back to the OS
    pub events_passed: AtomicU64,
    /// Emission ticks processed while running
    pub ticks: AtomicU64,
    /// Synthetic events successfully emitted
    pub events_emitted: AtomicU64,
    /// Synthetic events the sink rejected
    pub emit_failures: AtomicU64,
    /// Gestures that ran to completion
    pub gestures_completed: AtomicU64,
    /// Gestures cut short by a click or target change
    pub interrupts: AtomicU64,
    /// Taps brought back by the watchdog
    pub reattachments: AtomicU64,
    start_time: Instant,
}

impl EngineStats {
    /// Fresh counters, shared between the engine and the watchdog
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events_seen: AtomicU64::new(0),
            events_consumed: AtomicU64::new(0),
            events_passed: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            emit_failures: AtomicU64::new(0),
            gestures_completed: AtomicU64::new(0),
            interrupts: AtomicU64::new(0),
            reattachments: AtomicU64::new(0),
            start_time: Instant::now(),
        })
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.start_time.elapsed(),
            events_seen: self.events_seen.load(Ordering::Relaxed),
            events_consumed: self.events_consumed.load(Ordering::Relaxed),
            events_passed: self.events_passed.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            emit_failures: self.emit_failures.load(Ordering::Relaxed),
            gestures_completed: self.gestures_completed.load(Ordering::Relaxed),
            interrupts: self.interrupts.load(Ordering::Relaxed),
            reattachments: self.reattachments.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`EngineStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Time since the engine was created
    pub uptime: Duration,
    /// Raw scroll events delivered by the tap
    pub events_seen: u64,
    /// Raw events suppressed
    pub events_consumed: u64,
    /// Raw events passed through
    pub events_passed: u64,
    /// Emission ticks processed
    pub ticks: u64,
    /// Synthetic events emitted
    pub events_emitted: u64,
    /// Synthetic events rejected by the sink
    pub emit_failures: u64,
    /// Completed gestures
    pub gestures_completed: u64,
    /// Interrupted gestures
    pub interrupts: u64,
    /// Watchdog reattachments
    pub reattachments: u64,
}
