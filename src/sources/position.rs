use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{PositionProvider, Result, SourceError};
use crate::models::GeoPoint;

/// Position provider that always reports the same coordinates
///
/// Used by the CLI, where the "device" position comes from arguments.
#[derive(Debug, Clone)]
pub struct FixedPosition {
    latitude: f64,
    longitude: f64,
}

impl FixedPosition {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self, _timeout: Duration) -> Result<GeoPoint> {
        let point = GeoPoint::at(self.latitude, self.longitude, Utc::now());
        if point.is_valid() {
            Ok(point)
        } else {
            Err(SourceError::PermissionDenied(format!(
                "coordinates out of range: {}",
                point.format_coordinates()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_position() {
        let provider = FixedPosition::new(37.0, -122.0);
        let point = provider
            .current_position(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(point.latitude, 37.0);
        assert_eq!(point.longitude, -122.0);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_are_rejected() {
        let provider = FixedPosition::new(123.0, 0.0);
        let result = provider.current_position(Duration::from_secs(5)).await;
        assert!(matches!(result, Err(SourceError::PermissionDenied(_))));
    }
}
