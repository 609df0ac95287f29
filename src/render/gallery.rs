use crate::state::data::Report;

/// Every image of every report, flattened in collection order.
/// Tiles carry no report identity.
pub fn render_gallery(reports: &[Report]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|r| r.images.iter().cloned())
        .collect()
}
