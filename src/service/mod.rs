//! Lifecycle service
//!
//! [`ScrollService`] is the handle the application holds: it attaches the
//! input taps, spawns the display clock driver and the [`Watchdog`] on the
//! tokio runtime, and tears all of it down again.
//!
//! ```text
//! start() ──> taps.enable() ──> spawn clock.drive(engine.on_tick)
//!                          └──> spawn watchdog.run()
//! stop()  ──> cancel token ──> engine.pause() ──> taps.disable()
//! check() ──> one watchdog pass, now
//! ```

pub mod watchdog;

pub use watchdog::{Watchdog, DEFAULT_WATCHDOG_INTERVAL};

use crate::engine::{IntervalClock, ScrollEngine};
use crate::error::{Result, ScrollError};
use crate::platform::EventTap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Tasks owned by a running service
struct Running {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Start/stop/check handle for the smoothing pipeline
pub struct ScrollService {
    engine: Arc<ScrollEngine>,
    clock: Option<Arc<IntervalClock>>,
    taps: Vec<Arc<dyn EventTap>>,
    watchdog: Arc<Watchdog>,
    running: Mutex<Option<Running>>,
}

impl ScrollService {
    /// Create a stopped service
    ///
    /// `clock` is the same tick source the engine was built with, or `None`
    /// when the engine runs in pass-through mode.
    pub fn new(
        engine: Arc<ScrollEngine>,
        clock: Option<Arc<IntervalClock>>,
        taps: Vec<Arc<dyn EventTap>>,
        watchdog_interval: Duration,
    ) -> Self {
        let watchdog = Arc::new(Watchdog::new(
            taps.clone(),
            watchdog_interval,
            engine.stats_handle(),
        ));

        Self {
            engine,
            clock,
            taps,
            watchdog,
            running: Mutex::new(None),
        }
    }

    /// Attach the taps and spawn the background tasks
    ///
    /// Must be called from within a tokio runtime. Calling it while running
    /// does nothing.
    pub fn start(&self) -> Result<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Ok(());
        }

        for (index, tap) in self.taps.iter().enumerate() {
            if let Err(e) = tap.enable() {
                for attached in &self.taps[..index] {
                    attached.disable();
                }
                return Err(ScrollError::TapAttachFailed {
                    name: tap.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(2);

        if let Some(clock) = &self.clock {
            let clock = clock.clone();
            let engine = self.engine.clone();
            let token = cancel.clone();
            tasks.push(tokio::spawn(async move {
                clock
                    .drive(
                        move || {
                            engine.on_tick();
                        },
                        token,
                    )
                    .await;
            }));
        } else {
            warn!("Starting without a display clock, smoothing disabled");
        }

        let watchdog = self.watchdog.clone();
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move {
            watchdog.run(token).await;
        }));

        info!(
            "Scroll smoothing started ({} taps, watchdog every {:?})",
            self.taps.len(),
            self.watchdog.interval()
        );
        *running = Some(Running { cancel, tasks });
        Ok(())
    }

    /// Cancel the background tasks, drop in-flight motion and detach the taps
    ///
    /// Calling it while stopped does nothing.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        running.cancel.cancel();
        for task in running.tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }

        self.engine.pause();
        for tap in &self.taps {
            tap.disable();
        }

        info!("Scroll smoothing stopped");
    }

    /// Run one watchdog pass now; returns how many taps were reattached
    pub fn check(&self) -> usize {
        self.watchdog.check()
    }

    /// True between `start` and `stop`
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// The engine driven by this service
    pub fn engine(&self) -> &Arc<ScrollEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ExceptionTable, GlobalDefaults, OverrideResolver};
    use crate::engine::TickSource;
    use crate::platform::replay::{LineSink, ReplayPointer, ReplayTap};

    fn service(taps: Vec<Arc<dyn EventTap>>) -> (ScrollService, Arc<IntervalClock>) {
        let clock = Arc::new(IntervalClock::new(120).unwrap());
        let resolver = OverrideResolver::new(
            Arc::new(ExceptionTable::default()),
            GlobalDefaults::default(),
        );
        let engine = Arc::new(ScrollEngine::new(
            resolver,
            Arc::new(ReplayPointer::new()),
            Arc::new(LineSink::new(std::io::sink())),
            Some(clock.clone()),
            3,
        ));
        (
            ScrollService::new(engine, Some(clock.clone()), taps, Duration::from_secs(5)),
            clock,
        )
    }

    #[tokio::test]
    async fn test_start_stop_idempotent() {
        let tap = Arc::new(ReplayTap::new("scroll"));
        let (service, clock) = service(vec![tap.clone() as Arc<dyn EventTap>]);

        service.start().unwrap();
        service.start().unwrap();
        assert!(service.is_running());
        assert!(tap.is_enabled());

        clock.start();
        service.stop().await;
        service.stop().await;
        assert!(!service.is_running());
        assert!(!tap.is_enabled());
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn test_check_reattaches_revoked_tap() {
        let tap = Arc::new(ReplayTap::new("scroll"));
        let (service, _clock) = service(vec![tap.clone() as Arc<dyn EventTap>]);

        service.start().unwrap();
        tap.revoke();
        assert_eq!(service.check(), 1);
        assert!(tap.is_enabled());
        assert_eq!(service.engine().stats().reattachments, 1);

        service.stop().await;
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let tap = Arc::new(ReplayTap::new("hotkey"));
        let (service, _clock) = service(vec![tap.clone() as Arc<dyn EventTap>]);

        service.start().unwrap();
        service.stop().await;
        service.start().unwrap();
        assert!(tap.is_enabled());
        service.stop().await;
    }
}
