//! Timing of the upload sub-phases.
//!
//! Each phase runs inside a `tracing` span and its wall-clock duration and
//! outcome are recorded. With telemetry off the closure still runs but
//! nothing is recorded or emitted.

use std::cell::RefCell;
use std::time::{Duration, Instant};

/// One finished phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRecord {
    pub name: &'static str,
    pub elapsed: Duration,
    pub ok: bool,
}

#[derive(Debug, Default)]
pub struct Telemetry {
    enabled: bool,
    phases: RefCell<Vec<PhaseRecord>>,
}

impl Telemetry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phases: RefCell::new(Vec::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Run `f` as the phase `name`.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if !self.enabled {
            return f();
        }

        let span = tracing::info_span!("phase", phase = name);
        let start = Instant::now();
        let result = span.in_scope(f);
        let elapsed = start.elapsed();
        let ok = result.is_ok();

        tracing::debug!(
            parent: &span,
            elapsed_ms = elapsed.as_millis() as u64,
            ok,
            "phase finished"
        );
        self.phases.borrow_mut().push(PhaseRecord { name, elapsed, ok });
        result
    }

    /// Phases recorded so far, in completion order.
    pub fn phases(&self) -> Vec<PhaseRecord> {
        self.phases.borrow().clone()
    }
}
