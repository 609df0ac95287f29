//! "My Reports" card list with a single-select status filter.

use std::fmt;

use chrono::Local;

use crate::state::data::{Report, ReportId, Status};

/// How many images a card previews before showing an overflow count
const CARD_PREVIEW_IMAGES: usize = 3;

/// Status filter; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    #[default]
    All,
    Only(Status),
}

impl ReportFilter {
    pub const ALL: [ReportFilter; 4] = [
        ReportFilter::All,
        ReportFilter::Only(Status::Submitted),
        ReportFilter::Only(Status::InProgress),
        ReportFilter::Only(Status::Resolved),
    ];

    pub fn matches(&self, report: &Report) -> bool {
        match self {
            ReportFilter::All => true,
            ReportFilter::Only(status) => report.status == *status,
        }
    }
}

impl fmt::Display for ReportFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFilter::All => f.write_str("All"),
            ReportFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

/// Reports passing `filter`, in collection order
pub fn filter_reports(reports: &[Report], filter: ReportFilter) -> Vec<&Report> {
    reports.iter().filter(|r| filter.matches(r)).collect()
}

/// One card in the list
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCard {
    pub id: ReportId,
    pub title: String,
    /// Drives status-specific styling
    pub status: Status,
    pub status_label: String,
    pub category: String,
    /// Up to three images
    pub preview_images: Vec<String>,
    /// `+N more` when the report has more than three images
    pub overflow: Option<String>,
    pub date_label: String,
}

impl ReportCard {
    pub fn from_report(report: &Report) -> Self {
        let extra = report.images.len().saturating_sub(CARD_PREVIEW_IMAGES);
        Self {
            id: report.id,
            title: report.title.clone(),
            status: report.status,
            status_label: report.status.humanized(),
            category: report.category.as_str().to_string(),
            preview_images: report
                .images
                .iter()
                .take(CARD_PREVIEW_IMAGES)
                .cloned()
                .collect(),
            overflow: (extra > 0).then(|| format!("+{} more", extra)),
            date_label: report
                .date
                .with_timezone(&Local)
                .format("%d/%m/%Y")
                .to_string(),
        }
    }
}

/// Cards for the filtered collection
pub fn render_cards(reports: &[Report], filter: ReportFilter) -> Vec<ReportCard> {
    filter_reports(reports, filter)
        .into_iter()
        .map(ReportCard::from_report)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::report;

    fn collection() -> Vec<Report> {
        vec![
            report(1, Status::Submitted, 1),
            report(2, Status::Resolved, 1),
            report(3, Status::Submitted, 2),
            report(4, Status::InProgress, 1),
        ]
    }

    #[test]
    fn test_all_returns_everything_in_order() {
        let reports = collection();
        let ids: Vec<ReportId> = filter_reports(&reports, ReportFilter::All)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_status_filter_is_exact_subset() {
        let reports = collection();
        for status in Status::ALL {
            let filtered = filter_reports(&reports, ReportFilter::Only(status));
            let expected = reports.iter().filter(|r| r.status == status).count();
            assert_eq!(filtered.len(), expected);
            assert!(filtered.iter().all(|r| r.status == status));
        }

        let ids: Vec<ReportId> = filter_reports(&reports, ReportFilter::Only(Status::Submitted))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_card_previews_three_and_counts_overflow() {
        let card = ReportCard::from_report(&report(9, Status::InProgress, 5));
        assert_eq!(card.preview_images.len(), 3);
        assert_eq!(card.overflow.as_deref(), Some("+2 more"));
        assert_eq!(card.status_label, "in progress");
        assert_eq!(card.category, "plumbing");

        let small = ReportCard::from_report(&report(10, Status::Submitted, 3));
        assert_eq!(small.preview_images.len(), 3);
        assert_eq!(small.overflow, None);
    }

    #[test]
    fn test_filter_labels() {
        assert_eq!(ReportFilter::All.to_string(), "All");
        assert_eq!(ReportFilter::Only(Status::InProgress).to_string(), "In Progress");
    }
}
