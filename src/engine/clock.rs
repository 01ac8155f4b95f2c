//! Display Clock
//!
//! The emission loop is driven by a periodic tick that should track the
//! display refresh. The engine only needs three operations from it,
//! [`TickSource::start`], [`TickSource::stop`] and
//! [`TickSource::is_running`], and assumes nothing about the exact rate
//! beyond it being roughly constant for a session.
//!
//! Two implementations:
//!
//! - [`IntervalClock`] - a tokio interval at a fixed refresh rate, driven by
//!   [`IntervalClock::drive`]
//! - [`ExternalClock`] - a flag only; a platform vsync callback owns the
//!   timing and calls the engine's tick while the flag is set

use crate::error::{Result, ScrollError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Start/stop control of the tick source
///
/// Both operations are idempotent and must never block: they are called
/// from inside the input tap callback and from inside a tick.
pub trait TickSource: Send + Sync {
    /// Start ticking (no-op when already running)
    fn start(&self);

    /// Stop ticking (no-op when already stopped)
    fn stop(&self);

    /// True while ticks are being delivered
    fn is_running(&self) -> bool;
}

/// Fixed-rate tokio clock
#[derive(Debug)]
pub struct IntervalClock {
    period: Duration,
    running: watch::Sender<bool>,
}

impl IntervalClock {
    /// Create a clock ticking `refresh_hz` times per second
    pub fn new(refresh_hz: u32) -> Result<Self> {
        if refresh_hz == 0 {
            return Err(ScrollError::ClockUnavailable(
                "refresh rate must be non-zero".to_string(),
            ));
        }

        let (running, _) = watch::channel(false);
        Ok(Self {
            period: Duration::from_secs(1) / refresh_hz,
            running,
        })
    }

    /// Time between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deliver ticks to `on_tick` while running, until `cancel` fires
    ///
    /// Parks on the running flag while stopped, so an idle clock costs
    /// nothing.
    pub async fn drive<F>(&self, mut on_tick: F, cancel: CancellationToken)
    where
        F: FnMut(),
    {
        let mut running = self.running.subscribe();

        loop {
            while !*running.borrow_and_update() {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = running.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }

            debug!("Display clock running at {:?}", self.period);
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = interval.tick() => {
                        if !*running.borrow() {
                            break;
                        }
                        trace!("Display clock tick");
                        on_tick();
                    }
                }
            }

            debug!("Display clock parked");
        }
    }
}

impl TickSource for IntervalClock {
    fn start(&self) {
        self.running.send_if_modified(|running| !std::mem::replace(running, true));
    }

    fn stop(&self) {
        self.running.send_if_modified(|running| std::mem::replace(running, false));
    }

    fn is_running(&self) -> bool {
        *self.running.borrow()
    }
}

/// Clock whose ticks come from outside (display link, vsync callback, tests)
#[derive(Debug, Default)]
pub struct ExternalClock {
    running: AtomicBool,
}

impl ExternalClock {
    /// Create a stopped clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ExternalClock {
    fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_zero_refresh_rate_is_unavailable() {
        assert!(matches!(
            IntervalClock::new(0),
            Err(ScrollError::ClockUnavailable(_))
        ));
    }

    #[test]
    fn test_period_from_refresh_rate() {
        let clock = IntervalClock::new(50).unwrap();
        assert_eq!(clock.period(), Duration::from_millis(20));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let clock = IntervalClock::new(60).unwrap();
        assert!(!clock.is_running());

        clock.start();
        clock.start();
        assert!(clock.is_running());

        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_external_clock() {
        let clock = ExternalClock::new();
        clock.start();
        assert!(clock.is_running());
        clock.stop();
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn test_drive_ticks_only_while_running() {
        let clock = Arc::new(IntervalClock::new(200).unwrap());
        let ticks = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let driver = {
            let clock = clock.clone();
            let ticks = ticks.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                clock
                    .drive(
                        move || {
                            ticks.fetch_add(1, Ordering::SeqCst);
                        },
                        cancel,
                    )
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        clock.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        clock.stop();
        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop > 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        // At most one tick can already be in flight when stop lands
        assert!(ticks.load(Ordering::SeqCst) <= after_stop + 1);

        cancel.cancel();
        driver.await.unwrap();
    }
}
