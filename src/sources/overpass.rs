use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::http::{build_client, check_status};
use super::{AttractionSource, Result, SourceError};
use crate::config::SourcesConfig;
use crate::models::{Attraction, GeoPoint, distance};

/// OpenStreetMap point-of-interest search through the Overpass API
pub struct OverpassClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassClient {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.overpass_url.clone(),
        })
    }

    fn build_query(category: &str, center: &GeoPoint, radius_meters: f64) -> String {
        let category = category.replace('"', "");
        let around = format!(
            "around:{:.0},{},{}",
            radius_meters, center.latitude, center.longitude
        );
        format!(
            "[out:json][timeout:25];(node[\"tourism\"=\"{category}\"]({around});way[\"tourism\"=\"{category}\"]({around}););out center;"
        )
    }

    fn request(&self, query: &str) -> RequestBuilder {
        self.client.post(&self.base_url).form(&[("data", query)])
    }
}

#[async_trait]
impl AttractionSource for OverpassClient {
    #[instrument(skip(self, center), fields(lat = center.latitude, lon = center.longitude))]
    async fn find_nearby(
        &self,
        category: &str,
        center: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Attraction>> {
        let query = Self::build_query(category, center, radius_meters);
        debug!("Overpass query: {}", query);

        let response = self.request(&query).send().await?;
        let response = check_status(response, "Overpass").await?;

        let payload: OverpassResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse Overpass response: {e}")))?;

        let attractions = parse_elements(payload.elements, category, center);
        info!("Found {} '{}' attractions from Overpass", attractions.len(), category);
        Ok(attractions)
    }
}

/// Convert raw elements, skipping ones without a usable name or position,
/// ordered by distance from `center`
fn parse_elements(elements: Vec<Value>, category: &str, center: &GeoPoint) -> Vec<Attraction> {
    let discovered_at = Utc::now();
    let mut attractions: Vec<Attraction> = elements
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<OverpassElement>(raw) {
            Ok(element) => Some(element),
            Err(e) => {
                debug!("Skipping malformed Overpass element: {}", e);
                None
            }
        })
        .filter_map(|mut element| {
            let (lat, lon) = match (element.lat, element.lon, &element.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(c)) => (c.lat, c.lon),
                _ => return None,
            };
            let name = element.tags.remove("name").filter(|n| !n.trim().is_empty())?;

            let photo_refs = ["image", "wikimedia_commons"]
                .iter()
                .filter_map(|key| element.tags.remove(*key))
                .collect();

            Some(Attraction {
                id: format!("{}/{}", element.kind, element.id),
                name,
                location: GeoPoint::at(lat, lon, discovered_at),
                category: category.to_string(),
                description: element.tags.remove("description"),
                photo_refs,
            })
        })
        .collect();

    attractions.sort_by(|a, b| {
        distance(center, &a.location).total_cmp(&distance(center, &b.location))
    });
    attractions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_contains_category_and_radius() {
        let center = GeoPoint::new(37.0, -122.0);
        let query = OverpassClient::build_query("attraction", &center, 2000.0);
        assert!(query.contains("node[\"tourism\"=\"attraction\"](around:2000,37,-122)"));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn test_request_sends_query_as_form_field() {
        let client = OverpassClient::new(&SourcesConfig::default()).unwrap();
        let query = OverpassClient::build_query("museum", &GeoPoint::new(48.0, 11.0), 500.0);
        let request = client.request(&query).build().unwrap();

        assert_eq!(
            request.headers()["content-type"],
            "application/x-www-form-urlencoded"
        );
        let body = std::str::from_utf8(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert!(body.starts_with("data=%5Bout%3Ajson%5D"));
        assert!(body.ends_with("out+center%3B"));
    }

    #[test]
    fn test_parse_elements_skips_incomplete_and_sorts_by_distance() {
        let center = GeoPoint::new(37.0, -122.0);
        let elements = vec![
            json!({"type": "node", "id": 1, "lat": 37.02, "lon": -122.0,
                   "tags": {"name": "Far Tower", "tourism": "attraction"}}),
            json!({"type": "way", "id": 2, "center": {"lat": 37.001, "lon": -122.0},
                   "tags": {"name": "Near Garden", "description": "Rose beds",
                            "wikimedia_commons": "File:Garden.jpg"}}),
            json!({"type": "node", "id": 3, "lat": 37.005, "lon": -122.0,
                   "tags": {"tourism": "attraction"}}),
            json!({"type": "way", "id": 4, "tags": {"name": "No Geometry"}}),
            json!({"type": "node", "id": "not-a-number"}),
        ];

        let attractions = parse_elements(elements, "attraction", &center);
        assert_eq!(attractions.len(), 2);
        assert_eq!(attractions[0].name, "Near Garden");
        assert_eq!(attractions[0].id, "way/2");
        assert_eq!(attractions[0].description.as_deref(), Some("Rose beds"));
        assert_eq!(attractions[0].photo_refs, vec!["File:Garden.jpg".to_string()]);
        assert_eq!(attractions[1].name, "Far Tower");
        assert_eq!(attractions[1].category, "attraction");
    }

    #[test]
    fn test_client_creation() {
        let config = SourcesConfig::default();
        let client = OverpassClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://overpass-api.de/api/interpreter");
    }
}
