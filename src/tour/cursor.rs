use std::sync::Arc;

use crate::models::{Tour, TourStop};

/// Forward-only position within a completed tour
///
/// The index always points at an existing stop. Callers serialise access;
/// there is no internal locking.
#[derive(Debug, Clone)]
pub struct TourCursor {
    tour: Arc<Tour>,
    index: usize,
}

impl TourCursor {
    /// Cursor at the first stop
    #[must_use]
    pub fn new(tour: Arc<Tour>) -> Self {
        Self { tour, index: 0 }
    }

    #[must_use]
    pub fn tour(&self) -> &Arc<Tour> {
        &self.tour
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_stop(&self) -> Option<&TourStop> {
        self.tour.stop(self.index)
    }

    /// Move to the next stop; stays put on the last one
    ///
    /// Returns whether the index changed.
    pub fn advance(&mut self) -> bool {
        let last = self.tour.len().saturating_sub(1);
        let next = (self.index + 1).min(last);
        let moved = next != self.index;
        self.index = next;
        moved
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.index + 1 >= self.tour.len()
    }

    /// Stops after the current one
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tour.len().saturating_sub(self.index + 1)
    }
}
