//! Interception pipeline and emission tick
//!
//! [`ScrollEngine`] is the explicit context object shared by the two
//! callback sources: the input tap ([`ScrollEngine::handle_event`]) and the
//! display clock ([`ScrollEngine::on_tick`]). All mutable state sits behind
//! one mutex, and neither path does more than a bounded amount of arithmetic
//! while holding it. Each event takes the lock once. Pointer queries happen
//! before the lock is taken and synthetic emission after it is released.
//!
//! # Scroll event path
//!
//! ```text
//! ScrollEvent
//!     │ target pid changed mid-gesture? ──> pause, then carry on
//!     │ trackpad? ──────────────────────> forward raw
//!     │ no clock? ──────────────────────> forward raw
//!     ▼
//! resolve params for app under pointer
//!     │ reverse usable axes
//!     │ smoothing off ──────────────────> forward (reversed)
//!     ▼
//! normalize continuous samples ──> ScrollBuffer::update ──> clock.start() ──> consume
//! ```
//!
//! # Tick path
//!
//! ```text
//! advance (lerp) ──> jitter filter ──> quantize ──> toggle swap
//!     ──> [pulse within precision: clock.stop(), clean]
//!     ──> unlock ──> EventSink::emit_scroll
//! ```

use crate::control::{
    HotkeyStateMachine, HotkeyTransition, KeyState, ModeFlags, OverrideResolver,
};
use crate::engine::clock::TickSource;
use crate::engine::emission::swap_if_toggling;
use crate::engine::stats::{EngineStats, StatsSnapshot};
use crate::input::{
    normalize, DeviceClass, InputEvent, Modifier, ModifierEvent, ScrollEvent, TapAction,
};
use crate::platform::{EventSink, PointerTarget};
use crate::scroll::{transition_for_duration, AxisPair, ScrollBuffer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Result of one emission tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock stopped; nothing to do
    Idle,
    /// Gesture in progress; this delta was emitted
    Emitted(AxisPair<i32>),
    /// Final tick of a gesture; this delta was emitted and the clock stopped
    Finished(AxisPair<i32>),
}

impl TickOutcome {
    /// Delta produced by this tick, if any
    pub fn delta(&self) -> Option<AxisPair<i32>> {
        match self {
            TickOutcome::Idle => None,
            TickOutcome::Emitted(delta) | TickOutcome::Finished(delta) => Some(*delta),
        }
    }
}

/// Copy of the buffer positions, for inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferSnapshot {
    /// Position already emitted
    pub current: AxisPair<f64>,
    /// Position being approached
    pub target: AxisPair<f64>,
    /// Last applied raw sample
    pub last_delta: AxisPair<f64>,
}

/// State guarded by the engine mutex
struct EngineState {
    buffer: ScrollBuffer,
    modes: ModeFlags,
    hotkeys: HotkeyStateMachine,
    /// Process that received the most recent scroll input
    tracked_pid: Option<u32>,
    /// Gesture parameters from the most recent smoothed event
    transition: f64,
    precision: f64,
}

/// Scroll smoothing engine
pub struct ScrollEngine {
    state: Mutex<EngineState>,
    resolver: OverrideResolver,
    pointer: Arc<dyn PointerTarget>,
    sink: Arc<dyn EventSink>,
    clock: Option<Arc<dyn TickSource>>,
    stats: Arc<EngineStats>,
    degraded_logged: AtomicBool,
}

impl ScrollEngine {
    /// Create an engine
    ///
    /// With `clock` set to `None` the platform had no tick source to offer;
    /// every event is then forwarded untouched.
    pub fn new(
        resolver: OverrideResolver,
        pointer: Arc<dyn PointerTarget>,
        sink: Arc<dyn EventSink>,
        clock: Option<Arc<dyn TickSource>>,
        jitter_warmup_ticks: u32,
    ) -> Self {
        let defaults = resolver.defaults();
        let state = EngineState {
            buffer: ScrollBuffer::new(jitter_warmup_ticks),
            modes: ModeFlags::new(),
            hotkeys: HotkeyStateMachine::new(),
            tracked_pid: None,
            transition: transition_for_duration(defaults.duration),
            precision: defaults.precision,
        };

        Self {
            state: Mutex::new(state),
            resolver,
            pointer,
            sink,
            clock,
            stats: EngineStats::new(),
            degraded_logged: AtomicBool::new(false),
        }
    }

    /// Feed one event from the input tap
    pub fn handle_event(&self, event: InputEvent) -> TapAction {
        match event {
            InputEvent::Scroll(scroll) => self.handle_scroll(scroll),
            InputEvent::Modifier(modifier) => self.handle_modifier(modifier),
            InputEvent::PrimaryButtonDown => self.handle_button_down(),
        }
    }

    /// Intercept a raw scroll event
    pub fn handle_scroll(&self, event: ScrollEvent) -> TapAction {
        EngineStats::bump(&self.stats.events_seen);

        let smoothable = event.device != DeviceClass::Trackpad && self.clock.is_some();
        let application = if smoothable {
            self.pointer.application_under_pointer()
        } else {
            None
        };

        let mut state = self.state.lock();

        if let Some(pid) = event.target_pid {
            let tracked = state.tracked_pid;
            match tracked {
                // The new target is recorded by its next event, not this one
                Some(previous) if previous != pid => {
                    debug!("Scroll target moved from pid {} to {}", previous, pid);
                    self.pause_locked(&mut state);
                }
                _ => state.tracked_pid = Some(pid),
            }
        }

        if event.device == DeviceClass::Trackpad {
            drop(state);
            return self.pass(event);
        }

        let Some(clock) = &self.clock else {
            drop(state);
            if !self.degraded_logged.swap(true, Ordering::Relaxed) {
                warn!("No display clock available, scroll events pass through unsmoothed");
            }
            return self.pass(event);
        };

        let params = self
            .resolver
            .resolve(application.as_deref(), state.modes.block_active);

        let mut forwarded = event;
        if params.reverse {
            if forwarded.y.usable {
                forwarded.y.reverse();
            }
            if forwarded.x.usable {
                forwarded.x.reverse();
            }
        }

        if !params.smooth || !forwarded.has_usable_axis() {
            drop(state);
            return self.pass(forwarded);
        }

        let sample = AxisPair::new(forwarded.y, forwarded.x).map(|axis| {
            if !axis.usable {
                0.0
            } else if axis.fixed {
                axis.value
            } else {
                normalize(axis.value, params.step)
            }
        });

        let amplification = state.modes.dash_amplification;
        state.buffer.update(sample, params.speed, amplification);
        state.transition = params.transition;
        state.precision = params.precision;
        clock.start();
        drop(state);

        trace!(
            "Consumed scroll ({:.2}, {:.2}) for {:?}",
            sample.y,
            sample.x,
            application
        );
        EngineStats::bump(&self.stats.events_consumed);
        TapAction::Consume
    }

    fn pass(&self, event: ScrollEvent) -> TapAction {
        EngineStats::bump(&self.stats.events_passed);
        TapAction::Forward(event)
    }

    /// Track a modifier transition
    pub fn handle_modifier(&self, event: ModifierEvent) -> TapAction {
        let modifier = match event.modifier() {
            Ok(modifier) => modifier,
            Err(e) => {
                trace!("Ignoring key event: {}", e);
                return TapAction::Observe;
            }
        };

        let application = self.pointer.application_under_pointer();

        let mut state = self.state.lock();
        let state = &mut *state;
        let params = self
            .resolver
            .resolve(application.as_deref(), state.modes.block_active);

        let was_blocking = state.modes.block_active;
        let transition = state
            .hotkeys
            .on_modifier(modifier, event.pressed, &params, &mut state.modes);

        if !was_blocking && state.modes.block_active {
            state.buffer.hold();
            debug!("Block engaged, holding scroll position");
        }

        if transition == HotkeyTransition::ReleasedAll {
            info!(
                "Modifier {} released over a different target, all modes released",
                modifier
            );
        }

        TapAction::Observe
    }

    /// Primary button went down: drop any in-flight motion
    pub fn handle_button_down(&self) -> TapAction {
        self.pause();
        TapAction::Observe
    }

    /// Stop the clock, clear the buffers and forget the tracked process
    pub fn pause(&self) {
        let mut state = self.state.lock();
        self.pause_locked(&mut state);
    }

    fn pause_locked(&self, state: &mut EngineState) {
        let in_flight = self.is_clock_running() || !state.buffer.is_clean();

        if let Some(clock) = &self.clock {
            clock.stop();
        }
        state.buffer.clean();
        state.tracked_pid = None;

        if in_flight {
            debug!("Smoothing interrupted");
            EngineStats::bump(&self.stats.interrupts);
        }
    }

    /// One display clock tick
    pub fn on_tick(&self) -> TickOutcome {
        let Some(clock) = &self.clock else {
            return TickOutcome::Idle;
        };

        let mut state = self.state.lock();
        if !clock.is_running() {
            return TickOutcome::Idle;
        }

        let transition = state.transition;
        let pulse = state.buffer.advance(transition);
        let finished = pulse.within(state.precision);

        let output = state.buffer.filter(pulse);
        let quantized = state.buffer.quantize(output);
        let delta = swap_if_toggling(quantized, state.modes.toggle_active);

        if finished {
            clock.stop();
            state.buffer.clean();
            state.tracked_pid = None;
        }
        drop(state);

        EngineStats::bump(&self.stats.ticks);
        trace!(
            "Tick: pulse=({:.3}, {:.3}) emit=({}, {})",
            pulse.y,
            pulse.x,
            delta.y,
            delta.x
        );

        match self.sink.emit_scroll(delta) {
            Ok(()) => EngineStats::bump(&self.stats.events_emitted),
            Err(e) => {
                EngineStats::bump(&self.stats.emit_failures);
                warn!("Dropping synthetic scroll event: {}", e);
            }
        }

        if finished {
            EngineStats::bump(&self.stats.gestures_completed);
            debug!("Gesture complete");
            TickOutcome::Finished(delta)
        } else {
            TickOutcome::Emitted(delta)
        }
    }

    fn is_clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(|clock| clock.is_running())
    }

    /// True while the emission loop is running
    pub fn is_emitting(&self) -> bool {
        self.is_clock_running()
    }

    /// False when the engine runs without a tick source
    pub fn is_smoothing_available(&self) -> bool {
        self.clock.is_some()
    }

    /// Counters snapshot
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Shared counters handle
    pub fn stats_handle(&self) -> Arc<EngineStats> {
        self.stats.clone()
    }

    /// Current buffer positions
    pub fn buffer(&self) -> BufferSnapshot {
        let state = self.state.lock();
        BufferSnapshot {
            current: state.buffer.current(),
            target: state.buffer.target(),
            last_delta: state.buffer.last_delta(),
        }
    }

    /// Current mode flags
    pub fn modes(&self) -> ModeFlags {
        self.state.lock().modes
    }

    /// Process that received the most recent scroll input
    pub fn tracked_pid(&self) -> Option<u32> {
        self.state.lock().tracked_pid
    }

    /// Hotkey state of `modifier`
    pub fn key_state(&self, modifier: Modifier) -> KeyState {
        self.state.lock().hotkeys.state(modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ExceptionTable, GlobalDefaults, OverrideProfile};
    use crate::engine::clock::ExternalClock;
    use crate::error::ScrollError;
    use crate::input::{keycodes, AxisSample};
    use crate::platform::{MockEventSink, MockPointerTarget};

    fn defaults() -> GlobalDefaults {
        GlobalDefaults {
            step: 5.0,
            speed: 1.0,
            duration: 3.0,
            ..GlobalDefaults::default()
        }
    }

    fn pointer_over(app: Option<&'static str>) -> Arc<MockPointerTarget> {
        let mut pointer = MockPointerTarget::new();
        pointer
            .expect_application_under_pointer()
            .returning(move || app.map(str::to_string));
        Arc::new(pointer)
    }

    fn quiet_sink() -> Arc<MockEventSink> {
        let mut sink = MockEventSink::new();
        sink.expect_emit_scroll().returning(|_| Ok(()));
        Arc::new(sink)
    }

    fn engine_with(
        profiles: Vec<OverrideProfile>,
        sink: Arc<MockEventSink>,
    ) -> (ScrollEngine, Arc<ExternalClock>) {
        let clock = Arc::new(ExternalClock::new());
        let resolver =
            OverrideResolver::new(Arc::new(ExceptionTable::from_profiles(profiles)), defaults());
        let engine = ScrollEngine::new(resolver, pointer_over(None), sink, Some(clock.clone()), 0);
        (engine, clock)
    }

    fn wheel(y: f64) -> ScrollEvent {
        ScrollEvent::mouse(AxisSample::fixed(y), AxisSample::unusable())
    }

    #[test]
    fn test_smoothed_event_is_consumed_and_starts_clock() {
        let (engine, clock) = engine_with(vec![], quiet_sink());

        assert_eq!(engine.handle_scroll(wheel(-1.0)), TapAction::Consume);
        assert!(clock.is_running());
        assert_eq!(engine.buffer().target.y, -1.0);
    }

    #[test]
    fn test_continuous_sample_is_normalized() {
        let (engine, _clock) = engine_with(vec![], quiet_sink());
        let event = ScrollEvent::mouse(AxisSample::continuous(-3.0), AxisSample::unusable());

        engine.handle_scroll(event);
        assert_eq!(engine.buffer().target.y, -5.0);
    }

    #[test]
    fn test_trackpad_passes_through_untouched() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        let event = wheel(2.0).with_device(DeviceClass::Trackpad);

        assert_eq!(engine.handle_scroll(event), TapAction::Forward(event));
        assert!(!clock.is_running());
        assert_eq!(engine.stats().events_passed, 1);
    }

    #[test]
    fn test_reverse_without_smoothing_forwards_reversed() {
        let mut rule = OverrideProfile::new("com.example.game");
        rule.smooth = false;
        rule.reverse = true;

        let clock = Arc::new(ExternalClock::new());
        let resolver =
            OverrideResolver::new(Arc::new(ExceptionTable::from_profiles(vec![rule])), defaults());
        let engine = ScrollEngine::new(
            resolver,
            pointer_over(Some("com.example.game")),
            quiet_sink(),
            Some(clock.clone()),
            0,
        );

        match engine.handle_scroll(wheel(3.0)) {
            TapAction::Forward(event) => assert_eq!(event.y.value, -3.0),
            other => panic!("expected forward, got {other:?}"),
        }
        assert!(!clock.is_running());
    }

    #[test]
    fn test_no_usable_axis_is_forwarded() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        let event = ScrollEvent::mouse(AxisSample::unusable(), AxisSample::unusable());

        assert!(matches!(engine.handle_scroll(event), TapAction::Forward(_)));
        assert!(!clock.is_running());
    }

    #[test]
    fn test_missing_clock_passes_everything_through() {
        let resolver = OverrideResolver::new(Arc::new(ExceptionTable::default()), defaults());
        let engine = ScrollEngine::new(resolver, pointer_over(None), quiet_sink(), None, 0);

        assert!(!engine.is_smoothing_available());
        assert_eq!(engine.handle_scroll(wheel(1.0)), TapAction::Forward(wheel(1.0)));
        assert_eq!(engine.on_tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_tick_idle_when_stopped() {
        let mut sink = MockEventSink::new();
        sink.expect_emit_scroll().never();
        let (engine, _clock) = engine_with(vec![], Arc::new(sink));

        assert_eq!(engine.on_tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_gesture_runs_to_completion() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        engine.handle_scroll(wheel(10.0));

        let mut total = 0;
        let mut ticks = 0;
        loop {
            ticks += 1;
            match engine.on_tick() {
                TickOutcome::Emitted(delta) => total += delta.y,
                TickOutcome::Finished(delta) => {
                    total += delta.y;
                    break;
                }
                TickOutcome::Idle => panic!("clock stopped early"),
            }
            assert!(ticks < 100);
        }

        // Pulses 4, 2.4, 1.44 and a final 0.864, truncated with carry
        assert_eq!(total, 8);
        assert!(!clock.is_running());
        assert_eq!(engine.buffer().target, AxisPair::ZERO);
        assert_eq!(engine.stats().gestures_completed, 1);
    }

    #[test]
    fn test_emission_failure_is_counted_not_fatal() {
        let mut sink = MockEventSink::new();
        sink.expect_emit_scroll()
            .returning(|_| Err(ScrollError::EmissionFailed("closed".to_string())));
        let (engine, clock) = engine_with(vec![], Arc::new(sink));

        engine.handle_scroll(wheel(10.0));
        assert!(matches!(engine.on_tick(), TickOutcome::Emitted(_)));
        assert!(clock.is_running());
        assert_eq!(engine.stats().emit_failures, 1);
    }

    #[test]
    fn test_button_down_pauses() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        engine.handle_scroll(wheel(4.0).with_target_pid(7));

        assert_eq!(engine.handle_event(InputEvent::PrimaryButtonDown), TapAction::Observe);
        assert!(!clock.is_running());
        assert_eq!(engine.buffer().target, AxisPair::ZERO);
        assert_eq!(engine.tracked_pid(), None);
        assert_eq!(engine.stats().interrupts, 1);
    }

    #[test]
    fn test_pid_change_interrupts_and_restarts() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        engine.handle_scroll(wheel(4.0).with_target_pid(100));
        engine.on_tick();
        assert_eq!(engine.tracked_pid(), Some(100));

        let moved = wheel(3.0).with_target_pid(200);
        assert_eq!(engine.handle_scroll(moved), TapAction::Consume);
        assert_eq!(engine.stats().interrupts, 1);
        assert_eq!(engine.tracked_pid(), None);

        // Only the new event is buffered, from a fresh start
        let buffer = engine.buffer();
        assert_eq!(buffer.current, AxisPair::ZERO);
        assert_eq!(buffer.target.y, 3.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_pid_change_on_trackpad_interrupts() {
        let (engine, clock) = engine_with(vec![], quiet_sink());
        engine.handle_scroll(wheel(4.0).with_target_pid(100));

        let swipe = wheel(1.0)
            .with_target_pid(200)
            .with_device(DeviceClass::Trackpad);
        assert_eq!(engine.handle_scroll(swipe), TapAction::Forward(swipe));
        assert!(!clock.is_running());
        assert_eq!(engine.buffer().last_delta, AxisPair::ZERO);
    }

    #[test]
    fn test_pointer_queried_once_per_smoothable_event() {
        let mut pointer = MockPointerTarget::new();
        pointer
            .expect_application_under_pointer()
            .times(2)
            .returning(|| None);

        let clock = Arc::new(ExternalClock::new());
        let resolver = OverrideResolver::new(Arc::new(ExceptionTable::default()), defaults());
        let engine = ScrollEngine::new(
            resolver,
            Arc::new(pointer),
            quiet_sink(),
            Some(clock.clone()),
            0,
        );

        engine.handle_scroll(wheel(4.0).with_target_pid(100));
        let swipe = wheel(1.0).with_device(DeviceClass::Trackpad);
        assert_eq!(engine.handle_scroll(swipe), TapAction::Forward(swipe));
        // Interrupt and restart happen within the same call
        assert_eq!(
            engine.handle_scroll(wheel(4.0).with_target_pid(200)),
            TapAction::Consume
        );
        assert_eq!(engine.stats().interrupts, 1);
        assert!(clock.is_running());
    }

    #[test]
    fn test_dash_amplifies_new_samples() {
        let (engine, _clock) = engine_with(vec![], quiet_sink());
        engine.handle_modifier(ModifierEvent::new(keycodes::OPTION_RIGHT, true));
        engine.handle_scroll(wheel(1.0));

        assert_eq!(engine.buffer().target.y, 5.0);
        assert!(engine.modes().dash_active);
    }

    #[test]
    fn test_toggle_swaps_emitted_axes() {
        let mut sink = MockEventSink::new();
        sink.expect_emit_scroll()
            .withf(|delta| delta.y == 0)
            .returning(|_| Ok(()));
        let (engine, _clock) = engine_with(vec![], Arc::new(sink));

        engine.handle_modifier(ModifierEvent::new(keycodes::SHIFT_LEFT, true));
        engine.handle_scroll(wheel(20.0));
        let delta = engine.on_tick().delta().unwrap();
        assert_eq!(delta.y, 0);
        assert!(delta.x > 0);
    }

    #[test]
    fn test_block_holds_and_disables_smoothing() {
        let mut defaults = defaults();
        defaults.hotkeys.block = Some(Modifier::Command);
        let clock = Arc::new(ExternalClock::new());
        let resolver = OverrideResolver::new(Arc::new(ExceptionTable::default()), defaults);
        let engine = ScrollEngine::new(resolver, pointer_over(None), quiet_sink(), Some(clock.clone()), 0);

        engine.handle_scroll(wheel(10.0));
        engine.on_tick();
        engine.handle_modifier(ModifierEvent::new(keycodes::COMMAND_LEFT, true));

        let buffer = engine.buffer();
        assert_eq!(buffer.target, buffer.current);
        assert!(matches!(engine.handle_scroll(wheel(1.0)), TapAction::Forward(_)));
        assert_eq!(engine.on_tick(), TickOutcome::Finished(AxisPair::new(0, 0)));
    }

    #[test]
    fn test_block_mid_warmup_emits_nothing_more() {
        let mut defaults = defaults();
        defaults.hotkeys.block = Some(Modifier::Command);
        let clock = Arc::new(ExternalClock::new());
        let resolver = OverrideResolver::new(Arc::new(ExceptionTable::default()), defaults);
        let engine = ScrollEngine::new(resolver, pointer_over(None), quiet_sink(), Some(clock.clone()), 3);

        engine.handle_scroll(wheel(-40.0));
        assert!(matches!(engine.on_tick(), TickOutcome::Emitted(_)));
        assert!(matches!(engine.on_tick(), TickOutcome::Emitted(_)));

        engine.handle_modifier(ModifierEvent::new(keycodes::COMMAND_RIGHT, true));
        assert_eq!(engine.on_tick(), TickOutcome::Finished(AxisPair::new(0, 0)));
        assert_eq!(engine.on_tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_unknown_keycode_ignored() {
        let (engine, _clock) = engine_with(vec![], quiet_sink());
        assert_eq!(
            engine.handle_modifier(ModifierEvent::new(0x00, true)),
            TapAction::Observe
        );
        assert!(engine.modes().is_idle());
    }
}
