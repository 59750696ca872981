//! Assembled tours and the stops they are made of

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::{self, GeoPoint};
use super::{ArchivalPhoto, Attraction};

/// One enriched attraction within a tour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourStop {
    pub attraction: Attraction,
    /// Possibly empty when the archive had nothing or was unavailable
    pub archival_photos: Vec<ArchivalPhoto>,
    /// Generated description, or the fallback placeholder
    pub narrative: String,
}

impl TourStop {
    /// Entry handed to the memory log when this stop is visited
    #[must_use]
    pub fn memory_entry(&self) -> MemoryEntry {
        let historical_context = if self.archival_photos.is_empty() {
            None
        } else {
            Some(
                self.archival_photos
                    .iter()
                    .map(ArchivalPhoto::caption)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        MemoryEntry {
            title: self.attraction.name.clone(),
            description: self.narrative.clone(),
            location: self.attraction.location.clone(),
            historical_context,
        }
    }
}

/// An ordered, distance-annotated itinerary
///
/// Built once per assembly and never patched afterwards; fields are only
/// reachable through accessors. Deserialization goes through [`Tour::new`],
/// so stored totals are recomputed and an empty stop list is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "TourRecord")]
pub struct Tour {
    origin: GeoPoint,
    stops: Vec<TourStop>,
    total_distance_meters: f64,
    estimated_duration_minutes: f64,
    generated_at: DateTime<Utc>,
}

impl Tour {
    /// Build a tour from stops in their final order
    ///
    /// Returns `None` for an empty stop list, since a tour without stops is
    /// not a meaningful itinerary.
    #[must_use]
    pub fn new(origin: GeoPoint, stops: Vec<TourStop>) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }

        let total_distance_meters =
            geo::total_distance(stops.iter().map(|stop| &stop.attraction.location));
        let estimated_duration_minutes =
            geo::estimated_duration_minutes(total_distance_meters, stops.len());

        Some(Self {
            origin,
            stops,
            total_distance_meters,
            estimated_duration_minutes,
            generated_at: Utc::now(),
        })
    }

    /// Position the tour was assembled from
    #[must_use]
    pub fn origin(&self) -> &GeoPoint {
        &self.origin
    }

    #[must_use]
    pub fn stops(&self) -> &[TourStop] {
        &self.stops
    }

    #[must_use]
    pub fn stop(&self, index: usize) -> Option<&TourStop> {
        self.stops.get(index)
    }

    /// Number of stops; always at least one
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false, kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    #[must_use]
    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    #[must_use]
    pub fn estimated_duration_minutes(&self) -> f64 {
        self.estimated_duration_minutes
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

/// Serialized form of a [`Tour`]; the rollup fields are ignored on input
#[derive(Deserialize)]
struct TourRecord {
    origin: GeoPoint,
    stops: Vec<TourStop>,
    generated_at: DateTime<Utc>,
}

impl TryFrom<TourRecord> for Tour {
    type Error = String;

    fn try_from(record: TourRecord) -> Result<Self, Self::Error> {
        let mut tour = Tour::new(record.origin, record.stops)
            .ok_or_else(|| "a tour needs at least one stop".to_string())?;
        tour.generated_at = record.generated_at;
        Ok(tour)
    }
}

/// What the memory log keeps for a visited stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntry {
    pub title: String,
    pub description: String,
    pub location: GeoPoint,
    pub historical_context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lat: f64, lon: f64) -> TourStop {
        TourStop {
            attraction: Attraction::new(name, name, GeoPoint::new(lat, lon), "attraction"),
            archival_photos: vec![],
            narrative: format!("About {name}"),
        }
    }

    #[test]
    fn test_empty_tour_is_rejected() {
        assert!(Tour::new(GeoPoint::new(0.0, 0.0), vec![]).is_none());
    }

    #[test]
    fn test_single_stop_tour() {
        let tour = Tour::new(GeoPoint::new(0.0, 0.0), vec![stop("A", 1.0, 1.0)]).unwrap();
        assert_eq!(tour.len(), 1);
        assert_eq!(tour.total_distance_meters(), 0.0);
        assert_eq!(tour.estimated_duration_minutes(), 20.0);
    }

    #[test]
    fn test_distance_is_between_stops_not_from_origin() {
        let origin = GeoPoint::new(10.0, 10.0);
        let tour = Tour::new(origin, vec![stop("A", 0.0, 0.0), stop("B", 0.0, 1.0)]).unwrap();
        assert!((tour.total_distance_meters() - 111_195.0).abs() < 50.0);
        let expected = tour.total_distance_meters() / 5000.0 * 60.0 + 40.0;
        assert!((tour.estimated_duration_minutes() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_rejects_empty_stops() {
        let json = r#"{
            "origin": {"latitude": 0.0, "longitude": 0.0, "captured_at": "2026-01-01T00:00:00Z"},
            "stops": [],
            "total_distance_meters": -5.0,
            "estimated_duration_minutes": -1.0,
            "generated_at": "2026-01-01T00:00:00Z"
        }"#;
        let err = serde_json::from_str::<Tour>(json).unwrap_err();
        assert!(err.to_string().contains("at least one stop"));
    }

    #[test]
    fn test_deserialize_recomputes_totals() {
        let tour = Tour::new(
            GeoPoint::new(0.0, 0.0),
            vec![stop("A", 0.0, 0.0), stop("B", 0.0, 1.0)],
        )
        .unwrap();
        let mut value = serde_json::to_value(&tour).unwrap();
        value["total_distance_meters"] = serde_json::json!(-5.0);
        value["estimated_duration_minutes"] = serde_json::json!(-1.0);

        let restored: Tour = serde_json::from_value(value).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.total_distance_meters(), tour.total_distance_meters());
        assert_eq!(
            restored.estimated_duration_minutes(),
            tour.estimated_duration_minutes()
        );
        assert_eq!(restored.generated_at(), tour.generated_at());
    }

    #[test]
    fn test_memory_entry_without_photos() {
        let entry = stop("Old Mill", 1.0, 2.0).memory_entry();
        assert_eq!(entry.title, "Old Mill");
        assert_eq!(entry.description, "About Old Mill");
        assert_eq!(entry.location.latitude, 1.0);
        assert!(entry.historical_context.is_none());
    }

    #[test]
    fn test_memory_entry_historical_context() {
        let mut s = stop("Old Mill", 1.0, 2.0);
        s.archival_photos = vec![
            ArchivalPhoto::new("u1", "Mill front").with_year(1901),
            ArchivalPhoto::new("u2", "Mill yard"),
        ];
        let entry = s.memory_entry();
        assert_eq!(
            entry.historical_context.as_deref(),
            Some("Mill front (1901); Mill yard")
        );
    }
}
