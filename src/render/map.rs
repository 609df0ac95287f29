/// Map projection of the report collection
///
/// The registry keeps one marker per report keyed by report id. A full
/// refresh rebuilds it from the store; a newly appended report is inserted
/// on its own.

use std::collections::BTreeMap;

use tracing::debug;

use crate::state::data::{Category, LatLng, Report, ReportId};

/// Popup content for one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub title: String,
    pub category: String,
    pub status: String,
    /// Every image of the report; each can be enlarged
    pub images: Vec<String>,
}

/// One report's pin on the primary map
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub report_id: ReportId,
    pub position: LatLng,
    pub category: Category,
    /// Pin colour, keyed by category
    pub color: &'static str,
    /// Picture shown above the pin
    pub icon: Option<String>,
    pub popup: MarkerPopup,
}

impl Marker {
    pub fn from_report(report: &Report) -> Self {
        Self {
            report_id: report.id,
            position: report.location,
            category: report.category,
            color: report.category.pin_color(),
            icon: report.icon_image().map(str::to_string),
            popup: MarkerPopup {
                title: report.title.clone(),
                category: report.category.as_str().to_string(),
                status: report.status.humanized(),
                images: report.images.clone(),
            },
        }
    }
}

/// Report id -> marker
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: BTreeMap<ReportId, Marker>,
}

impl MarkerRegistry {
    /// Drop every marker and add one per report
    pub fn refresh(&mut self, reports: &[Report]) {
        self.markers = reports
            .iter()
            .map(|r| (r.id, Marker::from_report(r)))
            .collect();
        debug!("Map refreshed with {} markers", self.markers.len());
    }

    /// Add (or replace) the marker for one report
    pub fn insert(&mut self, report: &Report) {
        self.markers.insert(report.id, Marker::from_report(report));
    }

    pub fn get(&self, id: ReportId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Legend rows: capitalised category name and pin colour
pub fn legend() -> Vec<(String, [u8; 3])> {
    Category::ALL
        .iter()
        .map(|c| (c.to_string(), c.pin_rgb()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::report;
    use crate::state::data::Status;

    #[test]
    fn test_refresh_rebuilds_from_collection() {
        let mut registry = MarkerRegistry::default();
        registry.refresh(&[report(1, Status::Submitted, 1), report(2, Status::Resolved, 2)]);
        assert_eq!(registry.len(), 2);

        registry.refresh(&[report(3, Status::Submitted, 1)]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(1).is_none());
        assert!(registry.get(3).is_some());
    }

    #[test]
    fn test_insert_adds_single_marker() {
        let mut registry = MarkerRegistry::default();
        registry.refresh(&[report(1, Status::Submitted, 1)]);
        registry.insert(&report(2, Status::Submitted, 1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_marker_content() {
        let mut r = report(7, Status::InProgress, 3);
        r.category = Category::Electrical;
        let marker = Marker::from_report(&r);

        assert_eq!(marker.color, "#E74C3C");
        assert_eq!(marker.icon.as_deref(), Some(r.thumbnails[0].as_str()));
        assert_eq!(marker.popup.status, "in progress");
        assert_eq!(marker.popup.category, "electrical");
        assert_eq!(marker.popup.images.len(), 3);
    }

    #[test]
    fn test_legend_lists_every_category() {
        let rows = legend();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1], ("Plumbing".to_string(), [0x34, 0x98, 0xDB]));
        assert_eq!(rows[4].0, "Other");
    }
}
