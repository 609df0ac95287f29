/// User interface module
///
/// - Decoded image handles (images.rs)
/// - The map canvas shared by the map page and the location picker (map_canvas.rs)
/// - Page and modal views (pages.rs)

pub mod images;
pub mod map_canvas;
pub mod pages;
