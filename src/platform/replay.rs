//! Line-oriented replay backend
//!
//! Stands in for the OS primitives: input events arrive as newline-delimited
//! JSON, the pointer target is whatever application the last event named,
//! and synthetic scroll events are written out as JSON lines.
//!
//! # Input format
//!
//! ```text
//! {"type":"scroll","y":{"value":-3.0},"pid":412,"application":"org.example.editor"}
//! {"type":"scroll","y":{"value":1.0,"fixed":true},"device":"trackpad"}
//! {"type":"modifier","keycode":58,"pressed":true}
//! {"type":"button_down"}
//! {"type":"wait","ms":250}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Malformed lines are
//! logged and skipped.

use crate::engine::ScrollEngine;
use crate::error::{Result, ScrollError};
use crate::input::{AxisSample, DeviceClass, InputEvent, ModifierEvent, ScrollEvent, TapAction};
use crate::platform::{EventSink, EventTap, PointerTarget};
use crate::scroll::AxisPair;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// One axis of a replayed scroll event
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ReplayAxis {
    /// Delta (0 = axis not usable)
    #[serde(default)]
    pub value: f64,
    /// Discrete wheel click
    #[serde(default)]
    pub fixed: bool,
}

/// One line of replay input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// Scroll wheel event
    Scroll {
        /// Vertical axis
        #[serde(default)]
        y: ReplayAxis,
        /// Horizontal axis
        #[serde(default)]
        x: ReplayAxis,
        /// Device class
        #[serde(default)]
        device: DeviceClass,
        /// Target process
        #[serde(default)]
        pid: Option<u32>,
        /// Application under the pointer
        #[serde(default)]
        application: Option<String>,
    },
    /// Modifier key transition
    Modifier {
        /// Physical keycode
        keycode: u16,
        /// Pressed (true) or released (false)
        pressed: bool,
        /// Application under the pointer
        #[serde(default)]
        application: Option<String>,
    },
    /// Primary button click
    ButtonDown,
    /// Pause input for a while (lets the emission loop run)
    Wait {
        /// Milliseconds
        ms: u64,
    },
}

impl ReplayEvent {
    /// Parse one input line
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        serde_json::from_str(line).map_err(|source| ScrollError::MalformedEvent {
            line: line_number,
            source,
        })
    }

    /// Pointer target carried by the event, and the engine event it maps to
    fn into_input(self) -> Option<(Option<String>, InputEvent)> {
        match self {
            ReplayEvent::Scroll {
                y,
                x,
                device,
                pid,
                application,
            } => Some((
                application,
                InputEvent::Scroll(ScrollEvent {
                    y: AxisSample::new(y.value, y.fixed),
                    x: AxisSample::new(x.value, x.fixed),
                    device,
                    target_pid: pid,
                }),
            )),
            ReplayEvent::Modifier {
                keycode,
                pressed,
                application,
            } => Some((
                application,
                InputEvent::Modifier(ModifierEvent::new(keycode, pressed)),
            )),
            ReplayEvent::ButtonDown => Some((None, InputEvent::PrimaryButtonDown)),
            ReplayEvent::Wait { .. } => None,
        }
    }
}

/// Pointer target fed from the replay stream
#[derive(Debug, Default)]
pub struct ReplayPointer {
    application: RwLock<Option<String>>,
}

impl ReplayPointer {
    /// No application under the pointer
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the pointer over `application`
    pub fn set(&self, application: Option<String>) {
        *self.application.write() = application;
    }
}

impl PointerTarget for ReplayPointer {
    fn application_under_pointer(&self) -> Option<String> {
        self.application.read().clone()
    }
}

/// Writes each synthetic scroll event as a JSON line
pub struct LineSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    /// Sink writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> EventSink for LineSink<W> {
    fn emit_scroll(&self, delta: AxisPair<i32>) -> Result<()> {
        let mut out = self.out.lock();
        serde_json::to_writer(&mut *out, &delta)
            .map_err(|e| ScrollError::EmissionFailed(e.to_string()))?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

/// Tap whose liveness can be revoked from outside, like an OS timeout would
#[derive(Debug)]
pub struct ReplayTap {
    name: String,
    enabled: AtomicBool,
}

impl ReplayTap {
    /// Detached tap called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: AtomicBool::new(false),
        }
    }

    /// Silently disable the tap
    pub fn revoke(&self) {
        self.enabled.store(false, Ordering::Release);
    }
}

impl EventTap for ReplayTap {
    fn name(&self) -> &str {
        &self.name
    }

    fn enable(&self) -> Result<()> {
        self.enabled.store(true, Ordering::Release);
        Ok(())
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

/// Counts from one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Lines read
    pub lines: usize,
    /// Events delivered to the engine
    pub delivered: usize,
    /// Events that missed the engine because the tap was down
    pub bypassed: usize,
    /// Lines that failed to parse
    pub malformed: usize,
}

/// Feed every line of `reader` through `engine`
pub async fn run<R>(
    reader: R,
    engine: &ScrollEngine,
    pointer: &ReplayPointer,
    tap: &dyn EventTap,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ReplaySummary::default();

    while let Some(line) = lines.next_line().await? {
        summary.lines += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = match ReplayEvent::parse(line, summary.lines) {
            Ok(event) => event,
            Err(e) => {
                warn!("{}", e);
                summary.malformed += 1;
                continue;
            }
        };

        if let ReplayEvent::Wait { ms } = event {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            continue;
        }

        let Some((application, input)) = event.into_input() else {
            continue;
        };

        pointer.set(application);

        if !tap.is_enabled() {
            debug!("Tap '{}' is down, event bypasses the engine", tap.name());
            summary.bypassed += 1;
            continue;
        }

        summary.delivered += 1;
        if let TapAction::Forward(raw) = engine.handle_event(input) {
            debug!(
                "Forwarded raw scroll ({}, {})",
                raw.y.usable_value(),
                raw.x.usable_value()
            );
        }

        // Give the clock driver a chance to run between events
        tokio::task::yield_now().await;
    }

    info!(
        "Replay input finished: {} lines, {} delivered, {} bypassed, {} malformed",
        summary.lines, summary.delivered, summary.bypassed, summary.malformed
    );

    Ok(summary)
}
