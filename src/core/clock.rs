//! # Clock Source
//!
//! Supplies monotonically non-decreasing time in seconds, in two modes:
//!
//! - [`ClockMode::Real`]: wall time, keeps advancing while the app is suspended.
//! - [`ClockMode::Logical`]: simulation time, frozen while the app is suspended.
//!
//! Timers read the clock; nothing in the core ever sleeps on it.

use std::cell::Cell;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Logical,
    Real,
}

impl ClockMode {
    pub fn label(&self) -> &'static str {
        match self {
            ClockMode::Logical => "logical",
            ClockMode::Real => "real",
        }
    }
}

pub trait Clock {
    /// Seconds since the clock's origin in the given mode.
    fn now(&self, mode: ClockMode) -> f64;

    /// Freeze logical time. Real time is unaffected.
    fn suspend(&self);

    /// Unfreeze logical time. The suspended span is excised from it.
    fn resume(&self);

    fn is_suspended(&self) -> bool;
}

/// Monotonic clock backed by `Instant`.
pub struct SystemClock {
    origin: Instant,
    suspended_at: Cell<Option<Instant>>,
    suspended_total: Cell<Duration>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            suspended_at: Cell::new(None),
            suspended_total: Cell::new(Duration::ZERO),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self, mode: ClockMode) -> f64 {
        let now = Instant::now();
        match mode {
            ClockMode::Real => now.saturating_duration_since(self.origin).as_secs_f64(),
            ClockMode::Logical => {
                let frozen_at = self.suspended_at.get().unwrap_or(now);
                frozen_at
                    .saturating_duration_since(self.origin)
                    .saturating_sub(self.suspended_total.get())
                    .as_secs_f64()
            }
        }
    }

    fn suspend(&self) {
        if self.suspended_at.get().is_none() {
            self.suspended_at.set(Some(Instant::now()));
        }
    }

    fn resume(&self) {
        if let Some(at) = self.suspended_at.take() {
            let span = Instant::now().saturating_duration_since(at);
            self.suspended_total.set(self.suspended_total.get() + span);
        }
    }

    fn is_suspended(&self) -> bool {
        self.suspended_at.get().is_some()
    }
}

/// Hand-driven clock for deterministic replay and tests.
///
/// Both readings start at zero. `advance` moves real time always and logical
/// time only while not suspended.
#[derive(Debug, Default)]
pub struct ManualClock {
    real: Cell<f64>,
    logical: Cell<f64>,
    suspended: Cell<bool>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        if secs <= 0.0 || secs.is_nan() {
            return;
        }
        self.real.set(self.real.get() + secs);
        if !self.suspended.get() {
            self.logical.set(self.logical.get() + secs);
        }
    }

    /// Move real time forward to `secs`. Earlier readings are ignored.
    pub fn set(&self, secs: f64) {
        self.advance(secs - self.real.get());
    }
}

impl Clock for ManualClock {
    fn now(&self, mode: ClockMode) -> f64 {
        match mode {
            ClockMode::Real => self.real.get(),
            ClockMode::Logical => self.logical.get(),
        }
    }

    fn suspend(&self) {
        self.suspended.set(true);
    }

    fn resume(&self) {
        self.suspended.set(false);
    }

    fn is_suspended(&self) -> bool {
        self.suspended.get()
    }
}
