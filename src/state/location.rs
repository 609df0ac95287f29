//! Location selection: map viewports, the picker modal and device geolocation.

use std::f64::consts::PI;
use std::sync::Arc;

use tracing::{info, warn};

use super::data::LatLng;
use crate::config::{AppConfig, GEOLOCATED_ZOOM, PICKER_ZOOM};
use crate::error::GeoError;

/// Side of a slippy-map tile in pixels
const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web-Mercator projection
const MAX_LATITUDE: f64 = 85.051_128_78;

const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 19.0;

/// Centre and zoom of a map, with Web-Mercator projection helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Absolute pixel position of `point` at the current zoom
    pub fn project(&self, point: LatLng) -> (f64, f64) {
        let n = self.world_size();
        let lat_rad = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lng + 180.0) / 360.0 * n;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
        (x, y)
    }

    /// Inverse of `project`
    pub fn unproject(&self, x: f64, y: f64) -> LatLng {
        let n = self.world_size();
        let lng = x / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
        LatLng::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lng)
    }

    /// Screen position of `point` in a view of `width` x `height`
    pub fn to_screen(&self, point: LatLng, width: f64, height: f64) -> (f64, f64) {
        let (px, py) = self.project(point);
        let (cx, cy) = self.project(self.center);
        (px - cx + width / 2.0, py - cy + height / 2.0)
    }

    /// Geographic position under a screen point
    pub fn from_screen(&self, sx: f64, sy: f64, width: f64, height: f64) -> LatLng {
        let (cx, cy) = self.project(self.center);
        self.unproject(cx + sx - width / 2.0, cy + sy - height / 2.0)
    }

    /// Move the view so content follows a drag of (`dx`, `dy`) pixels
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.project(self.center);
        self.center = self.unproject(cx - dx, cy - dy);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Centre on `point` at `zoom`
    pub fn set_view(&mut self, point: LatLng, zoom: f64) {
        self.center = point;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

/// Source of the device position. Best effort; callers must cope with errors.
pub trait Geolocator: Send + Sync {
    fn locate(&self) -> Result<LatLng, GeoError>;

    /// Whether this host can position at all
    fn is_available(&self) -> bool {
        true
    }
}

/// Host that reports a fixed position
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub LatLng);

impl Geolocator for FixedGeolocator {
    fn locate(&self) -> Result<LatLng, GeoError> {
        Ok(self.0)
    }
}

/// Host without positioning
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocator;

impl Geolocator for NoGeolocator {
    fn locate(&self) -> Result<LatLng, GeoError> {
        Err(GeoError::Unsupported)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Pick the geolocator the configuration allows
pub fn geolocator_from_config(config: &AppConfig) -> Arc<dyn Geolocator> {
    match config.device_position {
        Some(position) => {
            info!("📍 Device position configured at {}", position.label());
            Arc::new(FixedGeolocator(position))
        }
        None => Arc::new(NoGeolocator),
    }
}

/// Shown beside the picker marker when it must be placed by hand
pub const MANUAL_PICK_HINT: &str = "Drag to select location";

/// What asked the picker for a device fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSource {
    /// Automatic attempt when the picker opens
    PickerOpened,
    /// The "use my location" button
    Button,
}

/// Modal picker producing one coordinate for the draft report.
/// Holds a single marker; the last click or drag wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPicker {
    pub viewport: Viewport,
    pub marker: LatLng,
    /// Shown beside the marker when the user must place it by hand
    pub hint: Option<&'static str>,
}

impl LocationPicker {
    /// Open seeded at `seed`, usually the primary map centre
    pub fn open(seed: LatLng) -> Self {
        Self {
            viewport: Viewport::new(seed, PICKER_ZOOM),
            marker: seed,
            hint: None,
        }
    }

    /// Move the marker (click or drag)
    pub fn place_marker(&mut self, point: LatLng) {
        self.marker = point;
    }

    /// A device fix arrived: centre on it and move the marker there
    pub fn apply_fix(&mut self, point: LatLng) {
        self.viewport.set_view(point, GEOLOCATED_ZOOM);
        self.marker = point;
        self.hint = None;
    }

    /// Geolocation failed; the marker stays where it was seeded
    pub fn fix_failed(&mut self, error: &GeoError) {
        warn!("⚠️  Picker geolocation failed: {}", error);
        self.hint = Some(MANUAL_PICK_HINT);
    }

    /// The confirmed coordinate
    pub fn confirm(self) -> LatLng {
        info!("📌 Location confirmed: {}", self.marker.label());
        self.marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPUS: LatLng = LatLng {
        lat: 5.4072,
        lng: 103.0883,
    };

    fn close(a: LatLng, b: LatLng) -> bool {
        (a.lat - b.lat).abs() < 1e-9 && (a.lng - b.lng).abs() < 1e-9
    }

    #[test]
    fn test_center_projects_to_middle_of_view() {
        let view = Viewport::new(CAMPUS, 16.0);
        let (x, y) = view.to_screen(CAMPUS, 800.0, 600.0);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_point_maps_back() {
        let view = Viewport::new(CAMPUS, 17.0);
        let point = LatLng::new(5.409, 103.087);
        let (sx, sy) = view.to_screen(point, 640.0, 480.0);
        assert!(close(view.from_screen(sx, sy, 640.0, 480.0), point));
    }

    #[test]
    fn test_north_is_up() {
        let view = Viewport::new(CAMPUS, 16.0);
        let (_, north) = view.to_screen(LatLng::new(5.41, CAMPUS.lng), 100.0, 100.0);
        let (_, south) = view.to_screen(LatLng::new(5.40, CAMPUS.lng), 100.0, 100.0);
        assert!(north < south);
    }

    #[test]
    fn test_pan_follows_drag() {
        let mut view = Viewport::new(CAMPUS, 16.0);
        let point = LatLng::new(5.41, 103.09);
        let (before_x, before_y) = view.to_screen(point, 500.0, 500.0);

        view.pan_by(30.0, -20.0);
        let (after_x, after_y) = view.to_screen(point, 500.0, 500.0);
        assert!((after_x - before_x - 30.0).abs() < 1e-3);
        assert!((after_y - before_y + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = Viewport::new(CAMPUS, 16.0);
        view.zoom_by(10.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_by(-40.0);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_picker_last_placement_wins() {
        let mut picker = LocationPicker::open(CAMPUS);
        assert_eq!(picker.marker, CAMPUS);

        picker.place_marker(LatLng::new(5.40, 103.08));
        picker.place_marker(LatLng::new(5.41, 103.09));
        assert_eq!(picker.confirm(), LatLng::new(5.41, 103.09));
    }

    #[test]
    fn test_picker_geolocation_fallback_keeps_seed() {
        let mut picker = LocationPicker::open(CAMPUS);
        let err = NoGeolocator.locate().unwrap_err();
        picker.fix_failed(&err);

        assert_eq!(picker.marker, CAMPUS);
        assert_eq!(picker.hint, Some("Drag to select location"));
    }

    #[test]
    fn test_picker_applies_fix() {
        let mut picker = LocationPicker::open(CAMPUS);
        let fix = FixedGeolocator(LatLng::new(5.4, 103.09)).locate().unwrap();
        picker.apply_fix(fix);

        assert_eq!(picker.marker, fix);
        assert_eq!(picker.viewport.center, fix);
        assert_eq!(picker.viewport.zoom, GEOLOCATED_ZOOM);
    }

    #[test]
    fn test_geolocator_follows_config() {
        let mut config = AppConfig::default();
        assert!(!geolocator_from_config(&config).is_available());

        config.device_position = Some(LatLng::new(5.4, 103.09));
        let geo = geolocator_from_config(&config);
        assert!(geo.is_available());
        assert_eq!(geo.locate(), Ok(LatLng::new(5.4, 103.09)));
    }
}
