//! Stop enrichment
//!
//! Each attraction gets archival photos and a narrative from two independent
//! sources queried at the same time. Either source failing, timing out or
//! returning nothing degrades that part of the stop to an empty or
//! placeholder value; enrichment itself never fails.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::config::TourConfig;
use crate::models::{ArchivalPhoto, Attraction, TourStop};
use crate::sources::{ArchiveSource, NarrativeSource};

/// Narrative used when generation fails or returns blank text
pub const FALLBACK_NARRATIVE: &str = "No description available.";

/// Attaches archival photos and a narrative to attractions
pub struct StopEnricher {
    archive: Arc<dyn ArchiveSource>,
    narrative: Arc<dyn NarrativeSource>,
    archive_radius_meters: f64,
    timeout: Duration,
}

impl StopEnricher {
    pub fn new(
        archive: Arc<dyn ArchiveSource>,
        narrative: Arc<dyn NarrativeSource>,
        config: &TourConfig,
    ) -> Self {
        Self {
            archive,
            narrative,
            archive_radius_meters: config.archive_radius_meters,
            timeout: config.enrichment_timeout(),
        }
    }

    /// Radius `enrich_all` uses for the photo lookup around each stop
    #[must_use]
    pub fn archive_radius_meters(&self) -> f64 {
        self.archive_radius_meters
    }

    /// Enrich one attraction; both lookups run concurrently
    ///
    /// Photos are searched within `radius_meters` of the attraction, which is
    /// independent of the discovery radius.
    #[instrument(skip(self, attraction), fields(stop = %attraction.name))]
    pub async fn enrich(&self, attraction: Attraction, radius_meters: f64) -> TourStop {
        let (archival_photos, narrative) = tokio::join!(
            self.fetch_photos(&attraction, radius_meters),
            self.fetch_narrative(&attraction)
        );

        TourStop {
            attraction,
            archival_photos,
            narrative,
        }
    }

    /// Enrich every candidate with at most `concurrency` stops in flight,
    /// using the configured archive radius
    ///
    /// Results land in the slot of their input position, so the returned
    /// stops follow candidate order whatever order the lookups finish in.
    pub async fn enrich_all(&self, candidates: Vec<Attraction>, concurrency: usize) -> Vec<TourStop> {
        let radius_meters = self.archive_radius_meters;
        let mut slots: Vec<Option<TourStop>> = (0..candidates.len()).map(|_| None).collect();

        let mut completed = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, attraction)| async move {
                (index, self.enrich(attraction, radius_meters).await)
            })
            .buffer_unordered(concurrency.max(1));

        while let Some((index, stop)) = completed.next().await {
            debug!("Stop {} enriched", index);
            slots[index] = Some(stop);
        }

        slots.into_iter().flatten().collect()
    }

    async fn fetch_photos(&self, attraction: &Attraction, radius_meters: f64) -> Vec<ArchivalPhoto> {
        let lookup = self.archive.find_photos(&attraction.location, radius_meters);

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(photos)) => photos,
            Ok(Err(e)) => {
                warn!("Archive lookup failed for '{}': {}", attraction.name, e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "Archive lookup for '{}' timed out after {:?}",
                    attraction.name, self.timeout
                );
                Vec::new()
            }
        }
    }

    async fn fetch_narrative(&self, attraction: &Attraction) -> String {
        match tokio::time::timeout(self.timeout, self.narrative.describe(&attraction.name)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                warn!("Narrative for '{}' came back empty", attraction.name);
                FALLBACK_NARRATIVE.to_string()
            }
            Ok(Err(e)) => {
                warn!("Narrative generation failed for '{}': {}", attraction.name, e);
                FALLBACK_NARRATIVE.to_string()
            }
            Err(_) => {
                warn!(
                    "Narrative for '{}' timed out after {:?}",
                    attraction.name, self.timeout
                );
                FALLBACK_NARRATIVE.to_string()
            }
        }
    }
}
