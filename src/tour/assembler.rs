//! Tour assembly
//!
//! Position, then discovery, then concurrent enrichment, then the
//! distance/duration rollup. Only the first two steps can fail; once there
//! is at least one candidate the result is always a usable tour.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::TourConfig;
use crate::error::TourError;
use crate::models::{Attraction, GeoPoint, Tour};
use crate::sources::{ArchiveSource, AttractionSource, NarrativeSource, PositionProvider};

use super::enricher::StopEnricher;

/// Builds tours from the caller's position and the external sources
pub struct TourAssembler {
    position: Arc<dyn PositionProvider>,
    attractions: Arc<dyn AttractionSource>,
    enricher: StopEnricher,
    config: TourConfig,
}

impl TourAssembler {
    pub fn new(
        position: Arc<dyn PositionProvider>,
        attractions: Arc<dyn AttractionSource>,
        archive: Arc<dyn ArchiveSource>,
        narrative: Arc<dyn NarrativeSource>,
        config: TourConfig,
    ) -> Self {
        let enricher = StopEnricher::new(archive, narrative, &config);
        Self {
            position,
            attractions,
            enricher,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Assemble a tour around the current position
    ///
    /// `radius_meters` defaults to the configured discovery radius (2 km).
    #[instrument(skip(self))]
    pub async fn start_tour(&self, radius_meters: Option<f64>) -> Result<Tour, TourError> {
        let radius_meters = radius_meters.unwrap_or(self.config.default_radius_meters);
        info!("Starting tour assembly within {} m", radius_meters);

        let origin = self.acquire_position().await?;
        debug!("Tour origin: {}", origin.format_coordinates());

        let candidates = self.discover(&origin, radius_meters).await?;
        self.assemble(origin, candidates, radius_meters).await
    }

    /// Build a tour from already discovered candidates
    ///
    /// Keeps the first `max_stops` candidates in the given order and enriches
    /// them concurrently. Fails only when there are no candidates.
    pub async fn assemble(
        &self,
        origin: GeoPoint,
        mut candidates: Vec<Attraction>,
        radius_meters: f64,
    ) -> Result<Tour, TourError> {
        if candidates.is_empty() {
            warn!("No attractions found within {} m", radius_meters);
            return Err(TourError::NoAttractionsFound { radius_meters });
        }

        if candidates.len() > self.config.max_stops {
            debug!(
                "Keeping {} of {} candidates",
                self.config.max_stops,
                candidates.len()
            );
            candidates.truncate(self.config.max_stops);
        }

        let stops = self
            .enricher
            .enrich_all(candidates, self.config.max_concurrent_enrichments)
            .await;

        let tour = Tour::new(origin, stops).ok_or(TourError::NoAttractionsFound { radius_meters })?;

        info!(
            "Assembled tour with {} stops, {:.0} m, about {:.0} min",
            tour.len(),
            tour.total_distance_meters(),
            tour.estimated_duration_minutes()
        );
        Ok(tour)
    }

    /// Single bounded position read; a timeout is final
    async fn acquire_position(&self) -> Result<GeoPoint, TourError> {
        let timeout = self.config.position_timeout();

        match tokio::time::timeout(timeout, self.position.current_position(timeout)).await {
            Ok(Ok(point)) if point.is_valid() => Ok(point),
            Ok(Ok(point)) => Err(TourError::position_unavailable(format!(
                "invalid coordinates {}",
                point.format_coordinates()
            ))),
            Ok(Err(e)) => Err(TourError::position_unavailable(e.to_string())),
            Err(_) => Err(TourError::position_unavailable(format!(
                "no position within {} ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn discover(
        &self,
        origin: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Attraction>, TourError> {
        let timeout = self.config.discovery_timeout();
        let search = self
            .attractions
            .find_nearby(&self.config.category, origin, radius_meters);

        match tokio::time::timeout(timeout, search).await {
            Ok(Ok(candidates)) => {
                debug!("Discovery returned {} candidates", candidates.len());
                Ok(candidates)
            }
            Ok(Err(e)) => Err(TourError::discovery_failed(e.to_string())),
            Err(_) => Err(TourError::discovery_failed(format!(
                "no response within {} s",
                timeout.as_secs()
            ))),
        }
    }
}
