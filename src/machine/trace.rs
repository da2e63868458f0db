//! Step tracing.
//!
//! The machine hands every [`TraceEvent`] to a [`TraceObserver`] chosen by
//! the caller for that run. Observers only see a shared reference and
//! cannot feed anything back into the loop.

use crate::machine::{Label, RegisterFile};
use serde::{Serialize, Deserialize};

/// Machine state captured immediately before a step executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Step number, starting at 0.
    pub step: u64,
    /// Label about to execute.
    pub label: Label,
    /// Register values at that instant.
    pub registers: RegisterFile,
}

/// Receives trace events from a running machine.
pub trait TraceObserver {
    fn on_step(&mut self, event: &TraceEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceObserver for NoTrace {
    fn on_step(&mut self, _event: &TraceEvent) {}
}

impl TraceObserver for Vec<TraceEvent> {
    fn on_step(&mut self, event: &TraceEvent) {
        self.push(event.clone());
    }
}

/// Adapts a closure into an observer.
pub struct FnObserver<F>(pub F);

impl<F: FnMut(&TraceEvent)> TraceObserver for FnObserver<F> {
    fn on_step(&mut self, event: &TraceEvent) {
        (self.0)(event)
    }
}

impl<T: TraceObserver + ?Sized> TraceObserver for &mut T {
    fn on_step(&mut self, event: &TraceEvent) {
        (**self).on_step(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(step: u64) -> TraceEvent {
        TraceEvent {
            step,
            label: Label::new("a"),
            registers: RegisterFile::from_values(vec![step]),
        }
    }

    #[test]
    fn test_vec_collects() {
        let mut events: Vec<TraceEvent> = Vec::new();
        events.on_step(&event(0));
        events.on_step(&event(1));
        assert_eq!(events, vec![event(0), event(1)]);
    }

    #[test]
    fn test_fn_observer() {
        let mut steps = Vec::new();
        {
            let mut observer = FnObserver(|e: &TraceEvent| steps.push(e.step));
            observer.on_step(&event(3));
            observer.on_step(&event(4));
        }
        assert_eq!(steps, vec![3, 4]);
    }
}
