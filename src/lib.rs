//! Roami - roadtrip companion tour assembly
//!
//! This library turns the traveler's current position into a short walking
//! tour: nearby attractions, each enriched with archival photos and a
//! generated narrative, ordered and annotated with distance and duration.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod sources;
pub mod telemetry;
pub mod tour;

// Re-export core types for public API
pub use config::RoamiConfig;
pub use error::TourError;
pub use models::{ArchivalPhoto, Attraction, GeoPoint, MemoryEntry, Tour, TourStop};
pub use sources::{
    ArchiveSource, AttractionSource, MemoryLog, NarrativeSource, PositionProvider, SourceError,
};
pub use tour::{FALLBACK_NARRATIVE, StopEnricher, TourAssembler, TourCursor, TourSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TourError>;
