/// Report rendering
///
/// Pure projections of the report collection into what each view shows.
/// The widgets in `ui` draw these; nothing here owns report data.

pub mod details;
pub mod gallery;
pub mod list;
pub mod map;
