use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ArchiveSource, Result};
use crate::cache::PersistentCache;
use crate::models::{ArchivalPhoto, GeoPoint};

/// Archive source that remembers lookups in the persistent cache
///
/// Cache failures never fail a lookup; they fall through to the inner source.
pub struct CachedArchive<S> {
    inner: S,
    cache: PersistentCache,
    ttl: Duration,
}

impl<S: ArchiveSource> CachedArchive<S> {
    pub fn new(inner: S, cache: PersistentCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(center: &GeoPoint, radius_meters: f64) -> String {
        let (lat, lon) = center.rounded_coordinates(4);
        format!("archive:{lat:.4}:{lon:.4}:{radius_meters:.0}")
    }
}

#[async_trait]
impl<S: ArchiveSource> ArchiveSource for CachedArchive<S> {
    async fn find_photos(
        &self,
        center: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<ArchivalPhoto>> {
        let key = Self::cache_key(center, radius_meters);

        match self.cache.get::<Vec<ArchivalPhoto>>(&key).await {
            Ok(Some(photos)) => {
                debug!("Archive cache hit for {}", key);
                return Ok(photos);
            }
            Ok(None) => {}
            Err(e) => warn!("Archive cache read failed for {}: {}", key, e),
        }

        let photos = self.inner.find_photos(center, radius_meters).await?;

        if let Err(e) = self.cache.put(&key, photos.clone(), self.ttl).await {
            warn!("Archive cache write failed for {}: {}", key, e);
        }
        Ok(photos)
    }
}
