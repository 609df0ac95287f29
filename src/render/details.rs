use chrono::Local;

use crate::state::data::{Report, ReportId, Status};

/// Shared details modal for one report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDetails {
    pub id: ReportId,
    pub title: String,
    pub category: String,
    pub status: Status,
    pub status_label: String,
    pub date_label: String,
    pub location_label: String,
    pub description: String,
    pub images: Vec<String>,
}

impl ReportDetails {
    pub fn from_report(report: &Report) -> Self {
        let description = if report.description.trim().is_empty() {
            "No description provided".to_string()
        } else {
            report.description.clone()
        };

        Self {
            id: report.id,
            title: report.title.clone(),
            category: report.category.as_str().to_string(),
            status: report.status,
            status_label: report.status.humanized(),
            date_label: report
                .date
                .with_timezone(&Local)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string(),
            location_label: report.location.label(),
            description,
            images: report.images.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::report;

    #[test]
    fn test_details_fields() {
        let mut r = report(5, Status::InProgress, 2);
        r.description = "Water pooling near the door".to_string();
        let details = ReportDetails::from_report(&r);

        assert_eq!(details.status_label, "in progress");
        assert_eq!(details.location_label, "Lat 5.4000, Lng 103.0900");
        assert_eq!(details.description, "Water pooling near the door");
        assert_eq!(details.images.len(), 2);
    }

    #[test]
    fn test_empty_description_placeholder() {
        let details = ReportDetails::from_report(&report(5, Status::Submitted, 1));
        assert_eq!(details.description, "No description provided");
    }
}
