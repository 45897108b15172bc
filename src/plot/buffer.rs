//! Shared point buffer between the relay and its render worker

use super::PlotPoint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered point buffer plus the "finished" flag.
///
/// The relay only ever appends; the render worker takes everything
/// appended so far with [`drain`](ShareBuffer::drain), which swaps the
/// vector out under the lock so both critical sections stay short.
#[derive(Debug, Default)]
pub struct ShareBuffer {
    points: Mutex<Vec<PlotPoint>>,
    finished: AtomicBool,
}

impl ShareBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PlotPoint>> {
        self.points.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one point
    pub fn push(&self, point: PlotPoint) {
        self.lock().push(point);
    }

    /// Take every point appended since the last drain, in append order
    pub fn drain(&self) -> Vec<PlotPoint> {
        std::mem::take(&mut *self.lock())
    }

    /// Points appended but not yet drained
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tell the renderer to stop refreshing
    pub fn set_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
