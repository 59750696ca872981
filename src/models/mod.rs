//! Data models for the Roami tour pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Geo: coordinates, great-circle distance and walking-time estimates
//! - Attraction: discovery candidates and archival photos
//! - Tour: enriched stops and the assembled itinerary

pub mod attraction;
pub mod geo;
pub mod tour;

// Re-export all public types for convenient access
pub use attraction::{ArchivalPhoto, Attraction};
pub use geo::{GeoPoint, distance, total_distance};
pub use tour::{MemoryEntry, Tour, TourStop};
