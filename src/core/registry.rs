//! # Timer Registry
//!
//! Owns the set of live timers and advances them once per tick.
//!
//! Timers created (or reset) between two passes land in a pending buffer and
//! only join the active set at the start of the next `advance_all`, so a timer
//! created while the caller is reacting to one pass's events is never advanced
//! in that same pass.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::core::clock::Clock;
use crate::core::timer::{PendingTimers, Timer, TimerEvent, TimerId, TimerSpec};

pub struct TimerRegistry {
    clock: Rc<dyn Clock>,
    active: Vec<Timer>,
    pending: PendingTimers,
    next_id: u64,
}

impl TimerRegistry {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            active: Vec::new(),
            pending: Rc::new(RefCell::new(Vec::new())),
            next_id: 1,
        }
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    /// Creates an idle timer bound to this registry.
    pub fn create(&mut self, spec: TimerSpec) -> Timer {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let timer = Timer::with_registry(
            id,
            spec,
            Rc::clone(&self.clock),
            Rc::downgrade(&self.pending),
        );
        timer.set_enlisted(true);
        self.pending.borrow_mut().push(timer.clone());
        debug!("Created {} ({}s, looping={})", id, spec.duration, spec.looping);
        timer
    }

    /// Merges pending timers, ticks every active timer in insertion order and
    /// reaps the ones that are done.
    pub fn advance_all(&mut self) -> Vec<TimerEvent> {
        self.active.append(&mut self.pending.borrow_mut());

        let mut events = Vec::new();
        for timer in &self.active {
            timer.tick(&mut events);
        }

        self.active.retain(|timer| {
            if timer.is_done() {
                timer.set_enlisted(false);
                false
            } else {
                true
            }
        });
        events
    }

    pub fn pause_all(&self) {
        self.for_each(Timer::pause);
    }

    pub fn resume_all(&self) {
        self.for_each(Timer::resume);
    }

    /// Cancels every timer and forgets them all.
    pub fn stop_all(&mut self) {
        let pending: Vec<Timer> = self.pending.borrow_mut().drain(..).collect();
        for timer in self.active.drain(..).chain(pending) {
            timer.stop();
            timer.set_enlisted(false);
        }
    }

    fn for_each(&self, f: impl Fn(&Timer)) {
        self.active.iter().for_each(&f);
        self.pending.borrow().iter().for_each(&f);
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.pending.borrow().is_empty()
    }

    /// True if `timer` is in the active set or the pending buffer.
    pub fn contains(&self, timer: &Timer) -> bool {
        timer.is_enlisted()
            && (self.active.iter().any(|t| t.ptr_eq(timer))
                || self.pending.borrow().iter().any(|t| t.ptr_eq(timer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::timer::TimerState;

    fn registry() -> (Rc<ManualClock>, TimerRegistry) {
        let clock = Rc::new(ManualClock::new());
        let registry = TimerRegistry::new(clock.clone());
        (clock, registry)
    }

    fn completions(events: &[TimerEvent]) -> Vec<TimerId> {
        events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::Completed { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_created_timer_waits_in_pending_until_next_pass() {
        let (_clock, mut registry) = registry();
        let timer = registry.create(TimerSpec::new(1.0));
        assert_eq!(registry.pending_count(), 1);
        assert_eq!(registry.active_count(), 0);
        assert!(registry.contains(&timer));

        let _ = registry.advance_all();
        assert_eq!(registry.pending_count(), 0);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_advance_reaps_completed_timers() {
        let (clock, mut registry) = registry();
        let timer = registry.create(TimerSpec::new(2.0));
        timer.start();

        clock.set(1.0);
        assert!(completions(&registry.advance_all()).is_empty());

        clock.set(2.0);
        assert_eq!(completions(&registry.advance_all()), vec![timer.id()]);
        assert!(registry.is_empty());
        assert!(!registry.contains(&timer));
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_timer_created_after_pass_is_not_advanced_early() {
        let (clock, mut registry) = registry();
        let first = registry.create(TimerSpec::new(1.0));
        first.start();
        clock.set(1.0);
        let events = registry.advance_all();
        assert_eq!(completions(&events), vec![first.id()]);

        // Reacting to the completion by chaining a zero-length timer.
        let chained = registry.create(TimerSpec::new(0.0));
        chained.start();
        assert_eq!(registry.active_count(), 0);

        let events = registry.advance_all();
        assert_eq!(completions(&events), vec![chained.id()]);
    }

    #[test]
    fn test_reset_reenters_registry_once() {
        let (clock, mut registry) = registry();
        let timer = registry.create(TimerSpec::new(1.0));
        timer.start();
        clock.set(1.0);
        let _ = registry.advance_all();
        assert!(registry.is_empty());

        timer.reset();
        timer.reset();
        assert_eq!(registry.pending_count(), 1);
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start();
        clock.set(2.0);
        assert_eq!(completions(&registry.advance_all()), vec![timer.id()]);
    }

    #[test]
    fn test_reset_of_enlisted_timer_does_not_duplicate() {
        let (_clock, mut registry) = registry();
        let timer = registry.create(TimerSpec::new(1.0));
        let _ = registry.advance_all();
        timer.reset();
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_pause_all_and_resume_all() {
        let (clock, mut registry) = registry();
        let a = registry.create(TimerSpec::new(10.0));
        let b = registry.create(TimerSpec::new(10.0));
        a.start();
        b.start();
        let _ = registry.advance_all();

        clock.set(1.0);
        registry.pause_all();
        assert!(a.is_paused() && b.is_paused());

        clock.set(5.0);
        let _ = registry.advance_all();
        registry.resume_all();
        clock.set(6.0);
        assert_eq!(a.elapsed(), 2.0);
        assert_eq!(b.elapsed(), 2.0);
    }

    #[test]
    fn test_stop_all_cancels_and_clears() {
        let (clock, mut registry) = registry();
        let active = registry.create(TimerSpec::new(10.0));
        active.start();
        let _ = registry.advance_all();
        let pending = registry.create(TimerSpec::new(10.0));

        clock.set(3.0);
        registry.stop_all();
        assert!(registry.is_empty());
        assert!(active.is_canceled());
        assert!(pending.is_canceled());
        assert_eq!(active.elapsed(), 3.0);
    }

    #[test]
    fn test_dropped_registry_does_not_block_reset() {
        let (_clock, mut registry) = registry();
        let timer = registry.create(TimerSpec::new(1.0));
        drop(registry);
        timer.stop();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
    }
}
