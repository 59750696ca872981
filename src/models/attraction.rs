//! Discovery candidates and archival imagery

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A point of interest returned by the discovery source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    /// Discovery category this candidate was found under (e.g. "attraction")
    pub category: String,
    pub description: Option<String>,
    /// Image references attached by the discovery source, if any
    pub photo_refs: Vec<String>,
}

impl Attraction {
    /// Create a candidate with no description or photo references
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: GeoPoint,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            category: category.into(),
            description: None,
            photo_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A historical photo found near a stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchivalPhoto {
    pub url: String,
    pub title: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
}

impl ArchivalPhoto {
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            year: None,
            description: None,
            thumbnail_url: None,
            author: None,
            license: None,
        }
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Short caption such as "Old Mill (1912)"
    #[must_use]
    pub fn caption(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        }
    }
}
