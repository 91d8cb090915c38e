//! # Timer Engine
//!
//! One state machine per countdown:
//!
//! ```text
//! Idle ──start──► Running ◄──resume── Paused
//!                  │   └────pause────►  │
//!                  │                    │
//!          elapsed ≥ duration         stop
//!                  ▼                    ▼
//!              Completed            Canceled
//!
//!        reset: any state ──► Idle (re-enters the registry)
//! ```
//!
//! `Timer` is a cheap, clonable handle. The registry that created it and the
//! client that drives it share the same underlying state, so a client can keep
//! querying a timer after the registry has reaped it.
//!
//! Misuse (pausing an idle timer, stopping a finished one, ...) is a silent
//! no-op: these calls come straight from user input without precondition checks.
//!
//! Tick and completion notifications are returned as [`TimerEvent`] values
//! rather than invoked as callbacks, so the caller decides when and in which
//! order to deliver them.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;

use crate::core::clock::{Clock, ClockMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Notification produced by [`Timer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    /// Emitted on every advancing tick with the time left, never negative.
    Tick { id: TimerId, remaining: f64 },
    /// Elapsed time reached the duration. Looping timers emit this once per lap.
    Completed { id: TimerId },
}

impl TimerEvent {
    pub fn id(&self) -> TimerId {
        match self {
            TimerEvent::Tick { id, .. } | TimerEvent::Completed { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
    Canceled,
}

/// Construction parameters for a timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSpec {
    pub duration: f64,
    pub looping: bool,
    pub clock: ClockMode,
}

impl TimerSpec {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: sanitize(duration),
            looping: false,
            clock: ClockMode::default(),
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn clock(mut self, mode: ClockMode) -> Self {
        self.clock = mode;
        self
    }
}

/// Negative and NaN durations collapse to zero.
fn sanitize(secs: f64) -> f64 {
    secs.max(0.0)
}

#[derive(Debug)]
struct TimerCore {
    id: TimerId,
    duration: f64,
    looping: bool,
    mode: ClockMode,
    started: bool,
    completed: bool,
    // Clock reading that elapsed time is measured from. Shifted forward by
    // paused spans so they never count.
    epoch: f64,
    last_tick: f64,
    paused_at: Option<f64>,
    canceled_at: Option<f64>,
    // True while the timer sits in a registry's active or pending collection.
    enlisted: bool,
}

impl TimerCore {
    fn is_done(&self) -> bool {
        self.completed || self.canceled_at.is_some()
    }

    fn elapsed_at(&self, now: f64) -> f64 {
        if self.completed {
            return self.duration;
        }
        if let Some(snapshot) = self.canceled_at.or(self.paused_at) {
            return snapshot.min(self.duration);
        }
        if !self.started {
            return 0.0;
        }
        (now - self.epoch).clamp(0.0, self.duration)
    }
}

pub type PendingTimers = Rc<RefCell<Vec<Timer>>>;

#[derive(Clone)]
pub struct Timer {
    core: Rc<RefCell<TimerCore>>,
    clock: Rc<dyn Clock>,
    // Owning registry's pending buffer; `reset` re-enters it.
    pending: Weak<RefCell<Vec<Timer>>>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("duration", &self.duration())
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

impl Timer {
    /// A timer not owned by any registry; `reset` will not re-enlist it.
    pub fn standalone(id: u64, spec: TimerSpec, clock: Rc<dyn Clock>) -> Self {
        Self::with_registry(TimerId(id), spec, clock, Weak::new())
    }

    pub(crate) fn with_registry(
        id: TimerId,
        spec: TimerSpec,
        clock: Rc<dyn Clock>,
        pending: Weak<RefCell<Vec<Timer>>>,
    ) -> Self {
        let now = clock.now(spec.clock);
        let core = TimerCore {
            id,
            duration: spec.duration,
            looping: spec.looping,
            mode: spec.clock,
            started: false,
            completed: false,
            epoch: now,
            last_tick: now,
            paused_at: None,
            canceled_at: None,
            enlisted: false,
        };
        Self {
            core: Rc::new(RefCell::new(core)),
            clock,
            pending,
        }
    }

    fn now(&self) -> f64 {
        let mode = self.core.borrow().mode;
        self.clock.now(mode)
    }

    pub fn id(&self) -> TimerId {
        self.core.borrow().id
    }

    pub fn duration(&self) -> f64 {
        self.core.borrow().duration
    }

    /// Change the target duration. Elapsed time is re-clamped on the next query.
    pub fn set_duration(&self, secs: f64) {
        self.core.borrow_mut().duration = sanitize(secs);
    }

    pub fn is_looping(&self) -> bool {
        self.core.borrow().looping
    }

    pub fn set_looping(&self, looping: bool) {
        self.core.borrow_mut().looping = looping;
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.core.borrow().mode
    }

    pub fn is_started(&self) -> bool {
        self.core.borrow().started
    }

    pub fn is_paused(&self) -> bool {
        self.core.borrow().paused_at.is_some()
    }

    pub fn is_canceled(&self) -> bool {
        self.core.borrow().canceled_at.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.core.borrow().completed
    }

    pub fn is_done(&self) -> bool {
        self.core.borrow().is_done()
    }

    pub fn state(&self) -> TimerState {
        let core = self.core.borrow();
        if core.completed {
            TimerState::Completed
        } else if core.canceled_at.is_some() {
            TimerState::Canceled
        } else if core.paused_at.is_some() {
            TimerState::Paused
        } else if core.started {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    /// Starts an idle timer. Starting a running, paused or finished timer is
    /// ignored: the accounting window is never re-based by a second start.
    /// Use [`Timer::reset`] to run a finished timer again.
    pub fn start(&self) {
        let now = self.now();
        let mut core = self.core.borrow_mut();
        if core.is_done() {
            debug!("{} is done, start ignored (reset it first)", core.id);
            return;
        }
        if core.started {
            debug!("{} already started, start ignored", core.id);
            return;
        }
        core.started = true;
        core.epoch = now;
        core.last_tick = now;
        debug!("{} started ({}s, {})", core.id, core.duration, core.mode.label());
    }

    /// Cancels the timer, freezing elapsed time at its current value.
    pub fn stop(&self) {
        let now = self.now();
        let mut core = self.core.borrow_mut();
        if core.is_done() {
            return;
        }
        let elapsed = core.elapsed_at(now);
        core.canceled_at = Some(elapsed);
        core.paused_at = None;
        debug!("{} canceled at {:.3}s", core.id, elapsed);
    }

    pub fn pause(&self) {
        let now = self.now();
        let mut core = self.core.borrow_mut();
        if !core.started || core.is_done() || core.paused_at.is_some() {
            return;
        }
        let elapsed = core.elapsed_at(now);
        core.paused_at = Some(elapsed);
    }

    /// Resumes a paused timer so that time spent paused is not counted, even
    /// when no tick happened during the pause.
    pub fn resume(&self) {
        let now = self.now();
        let mut core = self.core.borrow_mut();
        if core.is_done() {
            return;
        }
        let Some(snapshot) = core.paused_at.take() else {
            return;
        };
        core.epoch = now - snapshot;
        core.last_tick = now;
    }

    /// Returns the timer to `Idle` from any state, pause included, and puts it
    /// back into its registry's pending set if the registry had dropped it.
    pub fn reset(&self) {
        let now = self.now();
        let reenlist = {
            let mut core = self.core.borrow_mut();
            core.started = false;
            core.completed = false;
            core.canceled_at = None;
            core.paused_at = None;
            core.epoch = now;
            core.last_tick = now;
            !core.enlisted
        };

        if reenlist && let Some(pending) = self.pending.upgrade() {
            self.set_enlisted(true);
            pending.borrow_mut().push(self.clone());
            debug!("{} reset and re-registered", self.id());
        }
    }

    /// Advances the timer once, appending any notifications to `events`.
    pub fn tick(&self, events: &mut Vec<TimerEvent>) {
        let now = self.now();
        let mut core = self.core.borrow_mut();
        if core.is_done() || !core.started {
            return;
        }

        if core.paused_at.is_some() {
            let delta = now - core.last_tick;
            core.epoch += delta;
            core.last_tick = now;
            return;
        }

        core.last_tick = now;
        let elapsed = core.elapsed_at(now);
        events.push(TimerEvent::Tick {
            id: core.id,
            remaining: core.duration - elapsed,
        });

        if now - core.epoch >= core.duration {
            events.push(TimerEvent::Completed { id: core.id });
            if core.looping {
                core.epoch = now;
            } else {
                core.started = false;
                core.completed = true;
            }
        }
    }

    /// Seconds elapsed, in `[0, duration]`. Frozen while paused or after stop.
    pub fn elapsed(&self) -> f64 {
        let now = self.now();
        self.core.borrow().elapsed_at(now)
    }

    /// Seconds left, never negative.
    pub fn remaining(&self) -> f64 {
        let now = self.now();
        let core = self.core.borrow();
        core.duration - core.elapsed_at(now)
    }

    pub(crate) fn is_enlisted(&self) -> bool {
        self.core.borrow().enlisted
    }

    pub(crate) fn set_enlisted(&self, enlisted: bool) {
        self.core.borrow_mut().enlisted = enlisted;
    }

    pub fn ptr_eq(&self, other: &Timer) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    fn timer(duration: f64) -> (Rc<ManualClock>, Timer) {
        let clock = Rc::new(ManualClock::new());
        let timer = Timer::standalone(1, TimerSpec::new(duration), clock.clone());
        (clock, timer)
    }

    fn tick(timer: &Timer) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        timer.tick(&mut events);
        events
    }

    fn assert_accounting(timer: &Timer) {
        assert!((timer.remaining() - (timer.duration() - timer.elapsed())).abs() < 1e-9);
    }

    #[test]
    fn test_new_timer_is_idle_with_full_remaining() {
        let (clock, timer) = timer(5.0);
        clock.advance(3.0);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.elapsed(), 0.0);
        assert_eq!(timer.remaining(), 5.0);
        assert!(tick(&timer).is_empty());
    }

    #[test]
    fn test_pause_resume_scenario() {
        let (clock, timer) = timer(5.0);
        timer.start();

        clock.set(3.0);
        assert_eq!(
            tick(&timer),
            vec![TimerEvent::Tick { id: TimerId(1), remaining: 2.0 }]
        );

        timer.pause();
        clock.set(10.0);
        assert!(tick(&timer).is_empty());
        assert_eq!(timer.remaining(), 2.0);
        assert_eq!(timer.state(), TimerState::Paused);

        timer.resume();
        assert_eq!(timer.remaining(), 2.0);
        clock.set(12.0);
        assert_eq!(
            tick(&timer),
            vec![
                TimerEvent::Tick { id: TimerId(1), remaining: 0.0 },
                TimerEvent::Completed { id: TimerId(1) },
            ]
        );
        assert_eq!(timer.state(), TimerState::Completed);
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_resume_without_tick_excises_paused_span() {
        let (clock, timer) = timer(10.0);
        timer.start();
        clock.set(2.0);
        timer.pause();
        clock.set(7.0);
        timer.resume();
        clock.set(8.0);
        assert_eq!(timer.elapsed(), 3.0);
    }

    #[test]
    fn test_elapsed_monotonic_while_running_and_constant_while_paused() {
        let (clock, timer) = timer(100.0);
        timer.start();
        let mut last = timer.elapsed();
        for _ in 0..10 {
            clock.advance(0.5);
            let _ = tick(&timer);
            assert!(timer.elapsed() >= last);
            assert_accounting(&timer);
            last = timer.elapsed();
        }

        timer.pause();
        let frozen = timer.elapsed();
        for _ in 0..10 {
            clock.advance(1.0);
            let _ = tick(&timer);
            assert_eq!(timer.elapsed(), frozen);
            assert_accounting(&timer);
        }
    }

    #[test]
    fn test_stop_freezes_elapsed_forever() {
        let (clock, timer) = timer(5.0);
        timer.start();
        clock.set(1.5);
        timer.stop();
        assert_eq!(timer.state(), TimerState::Canceled);

        clock.set(100.0);
        assert!(tick(&timer).is_empty());
        assert_eq!(timer.elapsed(), 1.5);
        assert_eq!(timer.remaining(), 3.5);
    }

    #[test]
    fn test_stop_while_paused_keeps_pause_snapshot_and_clears_pause() {
        let (clock, timer) = timer(5.0);
        timer.start();
        clock.set(1.0);
        timer.pause();
        clock.set(4.0);
        timer.stop();
        assert!(!timer.is_paused());
        assert!(timer.is_canceled());
        assert_eq!(timer.elapsed(), 1.0);
    }

    #[test]
    fn test_misuse_is_a_no_op() {
        let (clock, timer) = timer(5.0);
        timer.pause();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start();
        clock.set(1.0);
        timer.resume();
        assert_eq!(timer.state(), TimerState::Running);

        timer.stop();
        timer.stop();
        timer.pause();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Canceled);
        assert_eq!(timer.elapsed(), 1.0);
    }

    #[test]
    fn test_double_start_does_not_rebase_epoch() {
        let (clock, timer) = timer(5.0);
        timer.start();
        clock.set(2.0);
        timer.start();
        assert_eq!(timer.elapsed(), 2.0);
    }

    #[test]
    fn test_start_on_finished_timer_is_ignored() {
        let (clock, timer) = timer(1.0);
        timer.start();
        clock.set(2.0);
        let _ = tick(&timer);
        assert!(timer.is_completed());
        timer.start();
        assert_eq!(timer.state(), TimerState::Completed);
    }

    #[test]
    fn test_looping_timer_fires_each_lap() {
        let clock = Rc::new(ManualClock::new());
        let timer = Timer::standalone(7, TimerSpec::new(2.0).looping(), clock.clone());
        timer.start();

        let mut completions = 0;
        for step in 1..=6 {
            clock.set(step as f64);
            let events = tick(&timer);
            if events.contains(&TimerEvent::Completed { id: TimerId(7) }) {
                completions += 1;
                assert!(timer.elapsed() < timer.duration());
            }
        }
        assert_eq!(completions, 3);
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_reset_clears_pause_and_returns_to_idle() {
        let (clock, timer) = timer(5.0);
        timer.start();
        clock.set(1.0);
        timer.pause();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!timer.is_paused());
        assert_eq!(timer.remaining(), 5.0);

        timer.start();
        clock.set(3.0);
        assert_eq!(timer.elapsed(), 2.0);
    }

    #[test]
    fn test_elapsed_clamps_to_duration() {
        let (clock, timer) = timer(2.0);
        timer.start();
        clock.set(50.0);
        assert_eq!(timer.elapsed(), 2.0);
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_negative_duration_is_zero() {
        let (_clock, timer) = timer(-3.0);
        assert_eq!(timer.duration(), 0.0);
        timer.set_duration(f64::NAN);
        assert_eq!(timer.duration(), 0.0);
    }

    #[test]
    fn test_real_time_timer_runs_while_suspended() {
        let clock = Rc::new(ManualClock::new());
        let logical = Timer::standalone(1, TimerSpec::new(10.0), clock.clone());
        let real = Timer::standalone(2, TimerSpec::new(10.0).clock(ClockMode::Real), clock.clone());
        logical.start();
        real.start();

        clock.suspend();
        clock.advance(4.0);
        assert_eq!(logical.elapsed(), 0.0);
        assert_eq!(real.elapsed(), 4.0);
    }
}
