//! Per-attempt progress notifications.
//!
//! The pass controller reports every segment attempt, success or failure, to
//! an optional observer. Delivery is synchronous and in attempt order.

/// One segment attempt, as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub range_start: u64,
    /// Inclusive.
    pub range_end: u64,
    pub ok: bool,
    /// Bytes finished across all passes so far.
    pub finished: u64,
    /// Expected total from the length probe.
    pub total: u64,
    /// 0 for the initial pass, 1.. for retry passes.
    pub pass: u32,
}

impl ProgressEvent {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.finished as f64 / self.total as f64).min(1.0)
    }
}

/// Receives a `ProgressEvent` after every segment attempt.
///
/// Implemented for any `FnMut(&ProgressEvent)`, so a closure can be passed
/// directly.
pub trait ProgressObserver {
    fn on_attempt(&mut self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_attempt(&mut self, event: &ProgressEvent) {
        self(event)
    }
}
