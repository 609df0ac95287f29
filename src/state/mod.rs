/// State management module
///
/// This module handles all application state, including:
/// - The report model (data.rs)
/// - Report persistence (store.rs)
/// - The draft report and its pending images (compose.rs)
/// - Location picking and geolocation (location.rs)
/// - Page navigation (navigation.rs)
/// - Toast notifications (notify.rs)
/// - The controller that owns all of the above (app.rs)

pub mod app;
pub mod compose;
pub mod data;
pub mod location;
pub mod navigation;
pub mod notify;
pub mod store;
