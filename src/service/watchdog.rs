//! Tap watchdog
//!
//! The OS silently disables an event tap whose callback was too slow. There
//! is no notification, so the watchdog polls each tap's liveness on a fixed
//! interval and re-enables any that have dropped out.

use crate::engine::EngineStats;
use crate::error::ScrollError;
use crate::platform::EventTap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default liveness check interval
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(5);

/// Periodic tap liveness check
pub struct Watchdog {
    taps: Vec<Arc<dyn EventTap>>,
    interval: Duration,
    stats: Arc<EngineStats>,
}

impl Watchdog {
    /// Watch `taps`, checking every `interval`
    pub fn new(taps: Vec<Arc<dyn EventTap>>, interval: Duration, stats: Arc<EngineStats>) -> Self {
        Self {
            taps,
            interval,
            stats,
        }
    }

    /// Check interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One liveness pass; returns how many taps were brought back
    pub fn check(&self) -> usize {
        let mut reattached = 0;

        for tap in &self.taps {
            if tap.is_enabled() {
                continue;
            }

            match tap.enable() {
                Ok(()) => {
                    info!("Event tap '{}' was disabled by the system, reattached", tap.name());
                    EngineStats::bump(&self.stats.reattachments);
                    reattached += 1;
                }
                Err(e) => {
                    let error = ScrollError::TapReattachFailed {
                        name: tap.name().to_string(),
                        reason: e.to_string(),
                    };
                    warn!("{}", error);
                }
            }
        }

        reattached
    }

    /// Check on every interval until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        // The first tick completes immediately; taps were just attached
        interval.tick().await;

        debug!("Watchdog checking {} taps every {:?}", self.taps.len(), self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.check();
                }
            }
        }

        debug!("Watchdog stopped");
    }
}
