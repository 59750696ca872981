//! Per-conversation tour state
//!
//! Holds the current tour and cursor for one user session. Overlapping
//! `start_tour` calls follow cancel-and-replace: the newer call cancels the
//! older one, which returns `TourError::Superseded` without touching state.
//! A failed assembly leaves the previous tour and cursor in place.
//! Memory log writes run in the background; `flush_memory_log` waits for
//! the ones still pending.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::TourError;
use crate::models::{Tour, TourStop};
use crate::sources::MemoryLog;

use super::assembler::TourAssembler;
use super::cursor::TourCursor;

#[derive(Default)]
struct SessionState {
    generation: u64,
    cancel_in_flight: Option<oneshot::Sender<()>>,
    cursor: Option<TourCursor>,
    logged_stops: HashSet<usize>,
    pending_logs: Vec<JoinHandle<()>>,
}

/// Session object owning the current tour and its cursor
pub struct TourSession {
    assembler: Arc<TourAssembler>,
    memory_log: Option<Arc<dyn MemoryLog>>,
    state: Mutex<SessionState>,
}

impl TourSession {
    #[must_use]
    pub fn new(assembler: Arc<TourAssembler>) -> Self {
        Self {
            assembler,
            memory_log: None,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Send every visited stop to `memory_log`
    #[must_use]
    pub fn with_memory_log(mut self, memory_log: Arc<dyn MemoryLog>) -> Self {
        self.memory_log = Some(memory_log);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assemble a new tour and reset the cursor to its first stop
    pub async fn start_tour(&self, radius_meters: Option<f64>) -> Result<Arc<Tour>, TourError> {
        let (generation, cancelled) = {
            let mut state = self.lock();
            state.generation += 1;
            let (cancel, cancelled) = oneshot::channel::<()>();
            if state.cancel_in_flight.replace(cancel).is_some() {
                info!("Cancelling in-flight tour assembly");
            }
            (state.generation, cancelled)
        };

        // The receiver resolves once a newer call drops our sender.
        let outcome = tokio::select! {
            result = self.assembler.start_tour(radius_meters) => result,
            _ = cancelled => Err(TourError::Superseded),
        };

        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding result of superseded assembly {}", generation);
            return Err(TourError::Superseded);
        }
        state.cancel_in_flight = None;

        let tour = Arc::new(outcome?);
        state.cursor = Some(TourCursor::new(Arc::clone(&tour)));
        state.logged_stops.clear();
        self.log_current_stop(&mut state);

        Ok(tour)
    }

    /// The stop under the cursor, or `None` before the first tour
    #[must_use]
    pub fn current_stop(&self) -> Option<TourStop> {
        self.lock()
            .cursor
            .as_ref()
            .and_then(|cursor| cursor.current_stop().cloned())
    }

    #[must_use]
    pub fn current_tour(&self) -> Option<Arc<Tour>> {
        self.lock()
            .cursor
            .as_ref()
            .map(|cursor| Arc::clone(cursor.tour()))
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.lock().cursor.as_ref().map(TourCursor::index)
    }

    /// Move to the next stop; a no-op at the last stop or without a tour
    ///
    /// Returns the cursor index afterwards.
    pub fn advance(&self) -> Option<usize> {
        let mut state = self.lock();
        let cursor = state.cursor.as_mut()?;
        let moved = cursor.advance();
        let index = cursor.index();
        if moved {
            self.log_current_stop(&mut state);
        }
        Some(index)
    }

    /// Wait for memory log writes that are still running
    pub async fn flush_memory_log(&self) {
        let pending = std::mem::take(&mut self.lock().pending_logs);
        for handle in pending {
            if let Err(e) = handle.await {
                warn!("Memory log task ended abnormally: {}", e);
            }
        }
    }

    /// Hand the current stop to the memory log once per tour, without waiting
    fn log_current_stop(&self, state: &mut SessionState) {
        let Some(memory_log) = &self.memory_log else {
            return;
        };
        let Some(cursor) = &state.cursor else {
            return;
        };
        let index = cursor.index();
        if state.logged_stops.contains(&index) {
            return;
        }
        let Some(stop) = cursor.current_stop() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; stop {} not sent to the memory log", index);
            return;
        };

        let entry = stop.memory_entry();
        let memory_log = Arc::clone(memory_log);
        state.logged_stops.insert(index);
        state.pending_logs.retain(|handle| !handle.is_finished());
        state.pending_logs.push(runtime.spawn(async move {
            if let Err(e) = memory_log.record(entry).await {
                warn!("Memory log rejected stop {}: {}", index, e);
            }
        }));
    }
}
