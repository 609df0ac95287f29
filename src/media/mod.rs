/// Image handling for report composition
///
/// This module handles:
/// - Data URL encoding and decoding
/// - Letterboxed thumbnail generation for marker icons
/// - Camera frame encoding
/// - Reading picked image files

pub mod capture;
pub mod data_url;
pub mod files;
pub mod thumbnail;
