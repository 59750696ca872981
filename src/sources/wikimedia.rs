use std::collections::HashMap;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::http::{build_client, check_status};
use super::{ArchiveSource, Result, SourceError};
use crate::config::SourcesConfig;
use crate::models::{ArchivalPhoto, GeoPoint};

/// Geosearch limits enforced by the Commons API
const MIN_RADIUS_METERS: f64 = 10.0;
const MAX_RADIUS_METERS: f64 = 10_000.0;
const RESULT_LIMIT: u32 = 20;

/// Historical photo lookup on Wikimedia Commons
pub struct WikimediaClient {
    client: ClientWithMiddleware,
    base_url: String,
    year_from: Option<i32>,
    year_to: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct CommonsResponse {
    query: Option<CommonsQuery>,
}

#[derive(Debug, Deserialize)]
struct CommonsQuery {
    #[serde(default)]
    pages: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CommonsPage {
    title: String,
    index: Option<i64>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: String,
    thumburl: Option<String>,
    #[serde(default)]
    extmetadata: HashMap<String, MetadataField>,
}

#[derive(Debug, Deserialize)]
struct MetadataField {
    value: Value,
}

impl WikimediaClient {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.wikimedia_url.clone(),
            year_from: None,
            year_to: None,
        })
    }

    /// Only keep photos dated within `[from, to]`; undated photos are kept
    #[must_use]
    pub fn with_year_range(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.year_from = from;
        self.year_to = to;
        self
    }

    fn build_url(&self, center: &GeoPoint, radius_meters: f64) -> String {
        let radius = radius_meters.clamp(MIN_RADIUS_METERS, MAX_RADIUS_METERS);
        format!(
            "{}?action=query&format=json&generator=geosearch&ggsnamespace=6&ggscoord={}&ggsradius={:.0}&ggslimit={}&prop=imageinfo&iiprop={}&iiurlwidth=800",
            self.base_url,
            urlencoding::encode(&format!("{}|{}", center.latitude, center.longitude)),
            radius,
            RESULT_LIMIT,
            urlencoding::encode("url|extmetadata"),
        )
    }

    fn in_year_range(&self, year: Option<i32>) -> bool {
        let Some(year) = year else {
            return true;
        };
        self.year_from.is_none_or(|from| year >= from) && self.year_to.is_none_or(|to| year <= to)
    }
}

#[async_trait]
impl ArchiveSource for WikimediaClient {
    #[instrument(skip(self, center), fields(lat = center.latitude, lon = center.longitude))]
    async fn find_photos(
        &self,
        center: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<ArchivalPhoto>> {
        let url = self.build_url(center, radius_meters);
        debug!("Wikimedia request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response, "Wikimedia Commons").await?;

        let payload: CommonsResponse = response.json().await.map_err(|e| {
            SourceError::Parse(format!("Failed to parse Wikimedia response: {e}"))
        })?;

        let pages = payload.query.map(|q| q.pages).unwrap_or_default();
        let photos: Vec<ArchivalPhoto> = parse_pages(pages)
            .into_iter()
            .filter(|photo| self.in_year_range(photo.year))
            .collect();

        info!("Found {} archival photos", photos.len());
        Ok(photos)
    }
}

/// Convert raw pages, skipping ones without image info
fn parse_pages(pages: HashMap<String, Value>) -> Vec<ArchivalPhoto> {
    let mut parsed: Vec<CommonsPage> = pages
        .into_values()
        .filter_map(|raw| serde_json::from_value::<CommonsPage>(raw).ok())
        .collect();
    parsed.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.title.cmp(&b.title)));

    parsed
        .into_iter()
        .filter_map(|page| {
            let info = page.imageinfo.into_iter().next()?;
            let metadata = |key: &str| {
                info.extmetadata
                    .get(key)
                    .and_then(|field| field.value.as_str())
                    .map(strip_markup)
                    .filter(|text| !text.is_empty())
            };

            let year = metadata("DateTimeOriginal")
                .and_then(|date| date.get(..4).and_then(|y| y.parse::<i32>().ok()));

            Some(ArchivalPhoto {
                url: info.url.clone(),
                title: page.title,
                year,
                description: metadata("ImageDescription"),
                thumbnail_url: info.thumburl.clone(),
                author: metadata("Artist"),
                license: metadata("LicenseShortName").or_else(|| metadata("License")),
            })
        })
        .collect()
}

/// Drop HTML tags from Commons metadata values
fn strip_markup(value: &str) -> String {
    let mut text = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}
