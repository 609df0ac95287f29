//! Runtime configuration. Every value can be overridden through environment
//! variables; anything unset falls back to the campus defaults.

use std::path::PathBuf;

use crate::state::data::LatLng;

/// Hard cap on images attached to one report
pub const MAX_IMAGES: usize = 5;

/// Thumbnail box used for marker icons (square)
pub const THUMBNAIL_SIZE: u32 = 100;

/// How long a toast stays on screen
pub const TOAST_LIFETIME_MS: u64 = 3000;

/// Delay before the map canvas is invalidated after becoming visible
pub const MAP_INVALIDATE_DELAY_MS: u64 = 100;

/// Zoom used when the map is centred on a device fix
pub const GEOLOCATED_ZOOM: f64 = 18.0;

/// Zoom used by the location picker
pub const PICKER_ZOOM: f64 = 16.0;

/// Campus centre used when nothing else is configured
const DEFAULT_CENTER: LatLng = LatLng {
    lat: 5.4072,
    lng: 103.0883,
};

const DEFAULT_ZOOM: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite file holding the report blob
    pub db_path: PathBuf,
    /// Initial centre of the primary map
    pub map_center: LatLng,
    /// Initial zoom of the primary map
    pub map_zoom: f64,
    /// Fixed device position, if the host exposes one
    pub device_position: Option<LatLng>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            map_center: DEFAULT_CENTER,
            map_zoom: DEFAULT_ZOOM,
            device_position: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from `FACILITY_REPORTER_*` variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_f64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());

        let db_path = lookup("FACILITY_REPORTER_DB")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let map_center = LatLng {
            lat: parse_f64("FACILITY_REPORTER_MAP_LAT").unwrap_or(DEFAULT_CENTER.lat),
            lng: parse_f64("FACILITY_REPORTER_MAP_LNG").unwrap_or(DEFAULT_CENTER.lng),
        };
        let map_zoom = parse_f64("FACILITY_REPORTER_MAP_ZOOM")
            .map(|z| z.clamp(1.0, 19.0))
            .unwrap_or(DEFAULT_ZOOM);

        // Both halves of the fix are required
        let device_position = match (
            parse_f64("FACILITY_REPORTER_GEO_LAT"),
            parse_f64("FACILITY_REPORTER_GEO_LNG"),
        ) {
            (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
            _ => None,
        };

        Self {
            db_path,
            map_center,
            map_zoom,
            device_position,
        }
    }
}

/// Where the database lives by default
/// - Linux: ~/.local/share/facility-reporter/facility_reporter.db
/// - macOS: ~/Library/Application Support/facility-reporter/facility_reporter.db
/// - Windows: %APPDATA%\facility-reporter\facility_reporter.db
fn default_db_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("facility-reporter");
    path.push("facility_reporter.db");
    path
}
