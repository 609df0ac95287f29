/// Report composition: the draft form and its pending images
///
/// Images are tracked by an id handed out at insertion time, so removing one
/// never depends on where it sits in the preview strip.

use chrono::{DateTime, Utc};

use super::data::{Category, LatLng, Report, ReportId, Status};
use crate::config::MAX_IMAGES;
use crate::error::{ReporterError, Result, ValidationError};

/// Stable handle for a pending image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

/// An image waiting to be submitted
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub id: ImageId,
    pub data_url: String,
}

/// What happened to a batch of images offered to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Ids of the images that fit, in batch order
    pub added: Vec<ImageId>,
    /// Images dropped because the collector was full
    pub rejected: usize,
    /// Free slots before the batch was applied
    pub remaining_before: usize,
}

impl BatchOutcome {
    /// Warning to show when part of the batch did not fit
    pub fn warning(&self) -> Option<String> {
        if self.rejected == 0 {
            None
        } else if self.remaining_before == 0 {
            Some(format!("Maximum of {} images reached", MAX_IMAGES))
        } else {
            Some(format!(
                "You can only add {} more image(s)",
                self.remaining_before
            ))
        }
    }
}

/// Accumulates up to `MAX_IMAGES` images for the report being composed
#[derive(Debug, Clone)]
pub struct ImageCollector {
    images: Vec<PendingImage>,
    next_id: u64,
}

impl Default for ImageCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCollector {
    pub fn new() -> Self {
        Self {
            images: Vec::with_capacity(MAX_IMAGES),
            next_id: 0,
        }
    }

    pub fn images(&self) -> &[PendingImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Free slots left
    pub fn remaining(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.images.len())
    }

    /// Add as many images as fit, in order; the rest are rejected
    pub fn add_batch(&mut self, data_urls: Vec<String>) -> BatchOutcome {
        let remaining_before = self.remaining();
        let offered = data_urls.len();

        let mut added = Vec::with_capacity(offered.min(remaining_before));
        for data_url in data_urls.into_iter().take(remaining_before) {
            let id = ImageId(self.next_id);
            self.next_id += 1;
            self.images.push(PendingImage { id, data_url });
            added.push(id);
        }

        BatchOutcome {
            rejected: offered - added.len(),
            added,
            remaining_before,
        }
    }

    /// Remove one image by id. Returns false if it was already gone.
    pub fn remove(&mut self, id: ImageId) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != id);
        self.images.len() != before
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn data_urls(&self) -> Vec<String> {
        self.images.iter().map(|img| img.data_url.clone()).collect()
    }
}

/// The report composition form
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub location: Option<LatLng>,
    pub images: ImageCollector,
}

/// A validated snapshot of the draft, waiting for its thumbnails
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub location: LatLng,
    pub images: Vec<String>,
}

impl ReportDraft {
    /// `Location: Lat x, Lng y` or `Location: Not selected`
    pub fn location_label(&self) -> String {
        match &self.location {
            Some(loc) => format!("Location: {}", loc.label()),
            None => "Location: Not selected".to_string(),
        }
    }

    /// Check the draft and snapshot it for submission
    pub fn prepare(&self) -> std::result::Result<Submission, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let location = self.location.ok_or(ValidationError::MissingLocation)?;
        if self.images.is_empty() {
            return Err(ValidationError::NoImages);
        }

        Ok(Submission {
            title: self.title.trim().to_string(),
            category: self.category,
            description: self.description.trim().to_string(),
            location,
            images: self.images.data_urls(),
        })
    }

    /// Back to an empty form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Submission {
    /// Build the report once every thumbnail exists
    pub fn into_report(
        self,
        id: ReportId,
        thumbnails: Vec<String>,
        date: DateTime<Utc>,
    ) -> Result<Report> {
        if thumbnails.len() != self.images.len() {
            return Err(ReporterError::InvalidReport(format!(
                "{} images but {} thumbnails",
                self.images.len(),
                thumbnails.len()
            )));
        }

        let report = Report {
            id,
            title: self.title,
            category: self.category,
            description: self.description,
            location: self.location,
            images: self.images,
            thumbnails,
            status: Status::Submitted,
            date,
        };
        report.validate()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("data:image/png;base64,{i}")).collect()
    }

    #[test]
    fn test_partial_batch_adds_what_fits() {
        let mut collector = ImageCollector::new();
        collector.add_batch(urls(3));

        let outcome = collector.add_batch(urls(3));
        assert_eq!(outcome.added.len(), 2);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.warning().as_deref(), Some("You can only add 2 more image(s)"));
        assert_eq!(collector.len(), 5);
    }

    #[test]
    fn test_cap_holds_for_any_batch_size() {
        for batch in 0..12 {
            let mut collector = ImageCollector::new();
            collector.add_batch(urls(batch));
            collector.add_batch(urls(batch));
            assert!(collector.len() <= MAX_IMAGES);
            assert_eq!(collector.len(), (batch * 2).min(MAX_IMAGES));
        }
    }

    #[test]
    fn test_full_collector_warns_maximum() {
        let mut collector = ImageCollector::new();
        collector.add_batch(urls(5));
        let outcome = collector.add_batch(urls(1));
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.warning().as_deref(), Some("Maximum of 5 images reached"));
    }

    #[test]
    fn test_batch_that_fits_has_no_warning() {
        let mut collector = ImageCollector::new();
        assert_eq!(collector.add_batch(urls(5)).warning(), None);
    }

    #[test]
    fn test_remove_by_id_not_position() {
        let mut collector = ImageCollector::new();
        let ids = collector.add_batch(urls(3)).added;

        assert!(collector.remove(ids[0]));
        assert!(!collector.remove(ids[0]));
        // The id of the last image still points at the same image
        assert!(collector.remove(ids[2]));

        let left: Vec<&str> = collector.images().iter().map(|i| i.data_url.as_str()).collect();
        assert_eq!(left, vec!["data:image/png;base64,1"]);

        // Fresh ids after removal never reuse old ones
        let new_id = collector.add_batch(urls(1)).added[0];
        assert!(!ids.contains(&new_id));
    }

    #[test]
    fn test_prepare_validation_order() {
        let mut draft = ReportDraft::default();
        assert_eq!(draft.prepare(), Err(ValidationError::EmptyTitle));

        draft.title = "Broken sink".to_string();
        assert_eq!(draft.prepare(), Err(ValidationError::MissingLocation));

        draft.location = Some(LatLng::new(5.4, 103.09));
        assert_eq!(draft.prepare(), Err(ValidationError::NoImages));

        draft.images.add_batch(urls(1));
        let submission = draft.prepare().unwrap();
        assert_eq!(submission.images.len(), 1);
    }

    #[test]
    fn test_into_report_pairs_images_and_thumbnails() {
        let submission = Submission {
            title: "Broken sink".to_string(),
            category: Category::Plumbing,
            description: String::new(),
            location: LatLng::new(5.4, 103.09),
            images: urls(2),
        };

        let err = submission.clone().into_report(1, urls(1), Utc::now());
        assert!(err.is_err());

        let report = submission.into_report(1, urls(2), Utc::now()).unwrap();
        assert_eq!(report.status, Status::Submitted);
        assert_eq!(report.images.len(), report.thumbnails.len());
    }

    #[test]
    fn test_reset_and_location_label() {
        let mut draft = ReportDraft {
            title: "x".to_string(),
            category: Category::Other,
            location: Some(LatLng::new(5.4, 103.09)),
            ..Default::default()
        };
        assert_eq!(draft.location_label(), "Location: Lat 5.4000, Lng 103.0900");

        draft.reset();
        assert_eq!(draft.category, Category::Electrical);
        assert_eq!(draft.location_label(), "Location: Not selected");
    }
}
