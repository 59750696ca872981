//! External collaborators of the tour pipeline
//!
//! The pipeline only sees the traits defined here. The submodules provide
//! HTTP adapters for the services Roami talks to in production:
//! - Overpass (OpenStreetMap) for attraction discovery
//! - Wikimedia Commons for archival photos, optionally behind the persistent cache
//! - A chat-completions endpoint for narratives
//! - Fixed coordinates and a log-backed memory sink for the CLI

pub mod cached;
pub mod error;
pub mod http;
pub mod memory;
pub mod narrative;
pub mod overpass;
pub mod position;
pub mod wikimedia;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{ArchivalPhoto, Attraction, GeoPoint, MemoryEntry};

pub use cached::CachedArchive;
pub use error::{Result, SourceError};
pub use memory::TracingMemoryLog;
pub use narrative::ChatNarrativeClient;
pub use overpass::OverpassClient;
pub use position::FixedPosition;
pub use wikimedia::WikimediaClient;

/// Reads the device's current position
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Single read bounded by `timeout`; implementations must not retry.
    async fn current_position(&self, timeout: Duration) -> Result<GeoPoint>;
}

/// Finds candidate attractions around a coordinate
#[async_trait]
pub trait AttractionSource: Send + Sync {
    /// Candidates in the source's own ranking order; may be empty.
    async fn find_nearby(
        &self,
        category: &str,
        center: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Attraction>>;
}

/// Looks up historical photos around a coordinate
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    async fn find_photos(&self, center: &GeoPoint, radius_meters: f64)
    -> Result<Vec<ArchivalPhoto>>;
}

/// Generates descriptive text for a named place
#[async_trait]
pub trait NarrativeSource: Send + Sync {
    async fn describe(&self, place_name: &str) -> Result<String>;
}

/// Receives a record of every stop the user visits
#[async_trait]
pub trait MemoryLog: Send + Sync {
    async fn record(&self, entry: MemoryEntry) -> Result<()>;
}
