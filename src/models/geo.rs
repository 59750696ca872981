//! Geographic point model and great-circle distance helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Walking speed used for duration estimates, in meters per hour (5 km/h)
pub const WALKING_SPEED_METERS_PER_HOUR: f64 = 5000.0;

/// Fixed dwell time spent at every stop, in minutes
pub const DWELL_MINUTES_PER_STOP: f64 = 20.0;

/// A coordinate pair with the time it was captured
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// When this position was read or reported
    pub captured_at: DateTime<Utc>,
}

impl GeoPoint {
    /// Create a point captured now
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::at(latitude, longitude, Utc::now())
    }

    /// Create a point with an explicit capture time
    #[must_use]
    pub fn at(latitude: f64, longitude: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            captured_at,
        }
    }

    /// Whether the coordinates lie inside the valid WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Great-circle distance to another point in meters
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(self, other)
    }
}

/// Haversine distance between two points in meters (Earth radius 6,371 km)
#[must_use]
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.latitude,
            longitude: a.longitude,
        },
        haversine::Location {
            latitude: b.latitude,
            longitude: b.longitude,
        },
        haversine::Units::Kilometers,
    ) * 1000.0
}

/// Sum of the legs between consecutive points; zero for fewer than two points
#[must_use]
pub fn total_distance<'a, I>(points: I) -> f64
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut total = 0.0;
    let mut previous: Option<&GeoPoint> = None;
    for point in points {
        if let Some(prev) = previous {
            total += distance(prev, point);
        }
        previous = Some(point);
    }
    total
}

/// Walking time for `distance_meters` plus the dwell time for `stop_count` stops
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimated_duration_minutes(distance_meters: f64, stop_count: usize) -> f64 {
    (distance_meters / WALKING_SPEED_METERS_PER_HOUR) * 60.0
        + DWELL_MINUTES_PER_STOP * stop_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(37.7749, -122.4194);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let d = distance(&a, &b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[rstest]
    #[case(37.0, -122.0, 37.01, -122.02)]
    #[case(46.8182, 8.2275, 45.8566, 6.8644)]
    #[case(-33.8688, 151.2093, 51.5074, -0.1278)]
    #[case(89.9, 10.0, -89.9, -170.0)]
    fn test_distance_is_symmetric(
        #[case] lat1: f64,
        #[case] lon1: f64,
        #[case] lat2: f64,
        #[case] lon2: f64,
    ) {
        let a = GeoPoint::new(lat1, lon1);
        let b = GeoPoint::new(lat2, lon2);
        let ab = distance(&a, &b);
        let ba = distance(&b, &a);
        assert!(ab > 0.0);
        assert!((ab - ba).abs() <= ab * 1e-6);
    }

    #[test]
    fn test_capture_time_does_not_affect_distance() {
        let a = GeoPoint::at(10.0, 10.0, DateTime::<Utc>::UNIX_EPOCH);
        let b = GeoPoint::new(10.0, 10.0);
        assert_eq!(distance(&a, &b), 0.0);
    }

    #[test]
    fn test_total_distance_single_point_is_zero() {
        let p = GeoPoint::new(1.0, 2.0);
        assert_eq!(total_distance([&p]), 0.0);
        assert_eq!(total_distance(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_total_distance_sums_legs() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let c = GeoPoint::new(0.0, 2.0);
        let total = total_distance([&a, &b, &c]);
        let expected = distance(&a, &b) + distance(&b, &c);
        assert!((total - expected).abs() < 1e-6);
    }

    #[rstest]
    #[case(0.0, 1, 20.0)]
    #[case(5000.0, 1, 80.0)]
    #[case(2500.0, 3, 90.0)]
    #[case(0.0, 5, 100.0)]
    fn test_estimated_duration(#[case] meters: f64, #[case] stops: usize, #[case] expected: f64) {
        assert_eq!(estimated_duration_minutes(meters, stops), expected);
    }

    #[test]
    fn test_rounded_coordinates() {
        let p = GeoPoint::new(46.818_234, 8.227_456);
        assert_eq!(p.rounded_coordinates(2), (46.82, 8.23));
        assert_eq!(p.format_coordinates(), "46.8182, 8.2275");
    }

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -181.0).is_valid());
    }
}
