/// Shared data structures for the application state
///
/// These structs represent the report model that flows between
/// the storage layer, the controller and the renderers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_IMAGES;
use crate::error::{ReporterError, Result};

/// Report identifier: creation time in milliseconds
pub type ReportId = i64;

/// A geographic coordinate
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `Lat 5.4000, Lng 103.0900`
    pub fn label(&self) -> String {
        format!("Lat {:.4}, Lng {:.4}", self.lat, self.lng)
    }
}

/// Issue category, fixed set
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Electrical,
    Plumbing,
    Furniture,
    Cleanliness,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electrical,
        Category::Plumbing,
        Category::Furniture,
        Category::Cleanliness,
        Category::Other,
    ];

    /// Wire name, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electrical => "electrical",
            Category::Plumbing => "plumbing",
            Category::Furniture => "furniture",
            Category::Cleanliness => "cleanliness",
            Category::Other => "other",
        }
    }

    /// Pin colour as a hex string
    pub fn pin_color(&self) -> &'static str {
        match self {
            Category::Electrical => "#E74C3C",
            Category::Plumbing => "#3498DB",
            Category::Furniture => "#9B59B6",
            Category::Cleanliness => "#2ECC71",
            Category::Other => "#7F8C8D",
        }
    }

    /// Pin colour as RGB bytes, for canvas drawing
    pub fn pin_rgb(&self) -> [u8; 3] {
        match self {
            Category::Electrical => [0xE7, 0x4C, 0x3C],
            Category::Plumbing => [0x34, 0x98, 0xDB],
            Category::Furniture => [0x9B, 0x59, 0xB6],
            Category::Cleanliness => [0x2E, 0xCC, 0x71],
            Category::Other => [0x7F, 0x8C, 0x8D],
        }
    }
}

impl fmt::Display for Category {
    /// Capitalised, for legends and pick lists
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

/// Triage state. Any value may follow any other.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Submitted,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Submitted, Status::InProgress, Status::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Submitted => "submitted",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
        }
    }

    /// `in-progress` becomes `in progress`
    pub fn humanized(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for Status {
    /// Title case, as shown in the status selector
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Submitted => "Submitted",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        };
        f.write_str(label)
    }
}

/// A single facility issue report
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    pub location: LatLng,
    /// Full-size images as data URLs, 1 to 5 entries
    pub images: Vec<String>,
    /// One letterboxed JPEG per image, same order
    pub thumbnails: Vec<String>,
    #[serde(default)]
    pub status: Status,
    /// Creation time, never changed afterwards
    pub date: DateTime<Utc>,
}

impl Report {
    /// Check the invariants every stored report must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ReporterError::InvalidReport(format!(
                "report {} has an empty title",
                self.id
            )));
        }
        if self.images.is_empty() || self.images.len() > MAX_IMAGES {
            return Err(ReporterError::InvalidReport(format!(
                "report {} has {} images (expected 1 to {})",
                self.id,
                self.images.len(),
                MAX_IMAGES
            )));
        }
        if self.images.len() != self.thumbnails.len() {
            return Err(ReporterError::InvalidReport(format!(
                "report {} has {} images but {} thumbnails",
                self.id,
                self.images.len(),
                self.thumbnails.len()
            )));
        }
        Ok(())
    }

    /// Image used for marker icons: first thumbnail, else first image
    pub fn icon_image(&self) -> Option<&str> {
        self.thumbnails
            .first()
            .or_else(|| self.images.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A valid report with `image_count` placeholder images
    pub fn report(id: ReportId, status: Status, image_count: usize) -> Report {
        let images: Vec<String> = (0..image_count)
            .map(|i| format!("data:image/png;base64,IMG{id}_{i}"))
            .collect();
        let thumbnails = (0..image_count)
            .map(|i| format!("data:image/jpeg;base64,THUMB{id}_{i}"))
            .collect();
        Report {
            id,
            title: format!("Report {id}"),
            category: Category::Plumbing,
            description: String::new(),
            location: LatLng::new(5.4, 103.09),
            images,
            thumbnails,
            status,
            date: DateTime::parse_from_rfc3339("2025-03-01T08:30:00.000Z")
                .map(|d| d.with_timezone(&Utc))
                .unwrap(),
        }
    }
}
