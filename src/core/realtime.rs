//! # Real-time Timer
//!
//! A countdown driven by a tokio interval instead of the app's tick. The
//! background task never touches app state: it posts [`RealtimeEvent`]s into
//! a bounded channel, and the owner drains them on its own thread with
//! [`RealtimeTimer::poll`].
//!
//! ```text
//!   tokio task ──try_send──► sync_channel(cap) ──poll()──► owner thread
//! ```
//!
//! Stopping aborts the task and drops the receiver, so anything still in
//! flight is discarded. Ticks are dropped when the channel is full; the
//! completion message is retried until it fits.

use std::sync::mpsc::{self, Receiver, TryRecvError, TrySendError};
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RealtimeEvent {
    Tick { remaining: f64 },
    Completed,
}

pub struct RealtimeTimer {
    duration: Duration,
    interval: Duration,
    capacity: usize,
    task: Option<AbortHandle>,
    events: Option<Receiver<RealtimeEvent>>,
    remaining: f64,
    completed: bool,
}

impl RealtimeTimer {
    pub fn new(duration_secs: f64, interval: Duration) -> Self {
        let duration = Duration::try_from_secs_f64(duration_secs.max(0.0)).unwrap_or(Duration::ZERO);
        Self {
            duration,
            interval: interval.max(Duration::from_millis(1)),
            capacity: DEFAULT_CAPACITY,
            task: None,
            events: None,
            remaining: duration.as_secs_f64(),
            completed: false,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Spawns the countdown on `runtime`. Restarts from the full duration if
    /// already running.
    pub fn start(&mut self, runtime: &Handle) {
        self.stop();
        self.completed = false;
        self.remaining = self.duration.as_secs_f64();

        let (tx, rx) = mpsc::sync_channel(self.capacity);
        let duration = self.duration;
        let interval = self.interval;

        let task = runtime.spawn(async move {
            let deadline = Instant::now() + duration;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let remaining = deadline.saturating_duration_since(Instant::now());
                match tx.try_send(RealtimeEvent::Tick {
                    remaining: remaining.as_secs_f64(),
                }) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => return,
                }
                if remaining.is_zero() {
                    break;
                }
            }

            loop {
                match tx.try_send(RealtimeEvent::Completed) {
                    Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                    Err(TrySendError::Full(_)) => tokio::time::sleep(interval).await,
                }
            }
        });

        self.task = Some(task.abort_handle());
        self.events = Some(rx);
        debug!("Real-time timer started ({:?}, every {:?})", self.duration, self.interval);
    }

    /// Aborts the countdown and discards undelivered events.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Real-time timer stopped");
        }
        self.events = None;
    }

    /// Drains delivered events on the caller's thread.
    pub fn poll(&mut self) -> Vec<RealtimeEvent> {
        let Some(rx) = &self.events else {
            return Vec::new();
        };

        let mut drained = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.completed && !drained.contains(&RealtimeEvent::Completed) {
                        warn!("Real-time timer task ended without completing");
                    }
                    break;
                }
            }
        }

        for event in &drained {
            match event {
                RealtimeEvent::Tick { remaining } => self.remaining = *remaining,
                RealtimeEvent::Completed => {
                    self.remaining = 0.0;
                    self.completed = true;
                }
            }
        }
        if self.completed {
            self.task = None;
            self.events = None;
        }
        drained
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some() && !self.completed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Last remaining time reported by the task.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }
}

impl Drop for RealtimeTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
