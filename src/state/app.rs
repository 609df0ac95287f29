/// The application controller
///
/// `AppState` owns every piece of mutable state: the report store, the draft
/// being composed, the visible page, the open modal and the toasts. Views
/// only read from it; every change goes through one of the methods below.

use chrono::Utc;
use tracing::{error, info, warn};

use super::compose::{ImageId, ReportDraft, Submission};
use super::data::{Category, LatLng, Report, ReportId, Status};
use super::location::{FixSource, LocationPicker, Viewport, MANUAL_PICK_HINT};
use super::navigation::{Activation, Navigator, Page};
use super::notify::Toasts;
use super::store::{LoadOutcome, ReportStore};
use crate::config::{AppConfig, GEOLOCATED_ZOOM};
use crate::error::{GeoError, ReporterError, ValidationError};
use crate::media::capture::{self, Camera};
use crate::media::files::FileBatch;
use crate::render::details::ReportDetails;
use crate::render::gallery::render_gallery;
use crate::render::list::{render_cards, ReportCard, ReportFilter};
use crate::render::map::{Marker, MarkerRegistry};

const FINDING_LOCATION: &str = "Finding your location...";

/// The single modal that may be open
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    LocationPicker(LocationPicker),
    Details {
        report: ReportDetails,
        /// Value chosen in the status selector, applied on confirm
        selected_status: Status,
    },
    /// Enlarged image
    Image(String),
}

pub struct AppState {
    store: ReportStore,
    navigator: Navigator,
    draft: ReportDraft,
    map_view: Viewport,
    markers: MarkerRegistry,
    /// Report whose marker popup is open
    popup: Option<ReportId>,
    /// "New Report Location" pin dropped by clicking the map
    scratch_pin: Option<LatLng>,
    /// "Your current location" pin
    user_pin: Option<LatLng>,
    filter: ReportFilter,
    cards: Vec<ReportCard>,
    gallery: Vec<String>,
    modal: Option<Modal>,
    toasts: Toasts,
    submitting: bool,
}

impl AppState {
    /// Load the store and build the initial map
    pub fn new(mut store: ReportStore, config: &AppConfig) -> Self {
        let mut toasts = Toasts::default();

        match store.load() {
            Ok(LoadOutcome::Recovered(reason)) => {
                warn!("⚠️  Saved reports were reset: {}", reason);
                toasts.warning("Saved reports could not be read and were reset");
            }
            Ok(_) => {}
            Err(e) => {
                error!("❌ Failed to load reports: {}", e);
                toasts.error(format!("Could not load saved reports: {}", e));
            }
        }

        let mut markers = MarkerRegistry::default();
        markers.refresh(store.reports());

        Self {
            store,
            navigator: Navigator::default(),
            draft: ReportDraft::default(),
            map_view: Viewport::new(config.map_center, config.map_zoom),
            markers,
            popup: None,
            scratch_pin: None,
            user_pin: None,
            filter: ReportFilter::All,
            cards: Vec::new(),
            gallery: Vec::new(),
            modal: None,
            toasts,
            submitting: false,
        }
    }

    // ========== Read access ==========

    pub fn page(&self) -> Page {
        self.navigator.current()
    }

    pub fn nav_open(&self) -> bool {
        self.navigator.nav_open()
    }

    pub fn reports(&self) -> &[Report] {
        self.store.reports()
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn map_view(&self) -> &Viewport {
        &self.map_view
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    /// Marker whose popup is open, if it still exists
    pub fn popup(&self) -> Option<&Marker> {
        self.popup.and_then(|id| self.markers.get(id))
    }

    pub fn scratch_pin(&self) -> Option<LatLng> {
        self.scratch_pin
    }

    pub fn user_pin(&self) -> Option<LatLng> {
        self.user_pin
    }

    pub fn filter(&self) -> ReportFilter {
        self.filter
    }

    pub fn cards(&self) -> &[ReportCard] {
        &self.cards
    }

    pub fn gallery(&self) -> &[String] {
        &self.gallery
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ========== Navigation ==========

    pub fn toggle_nav(&mut self) {
        self.navigator.toggle_nav();
    }

    /// Show `page` and render it once. The returned activation tells the
    /// shell whether a deferred map invalidate is needed.
    pub fn navigate(&mut self, page: Page) -> Activation {
        let activation = self.navigator.navigate(page);
        match activation {
            Activation::RenderList => self.render_list(),
            Activation::RenderGallery => self.render_gallery(),
            Activation::InvalidateMap | Activation::Nothing => {}
        }
        activation
    }

    fn render_list(&mut self) {
        self.cards = render_cards(self.store.reports(), self.filter);
    }

    fn render_gallery(&mut self) {
        self.gallery = render_gallery(self.store.reports());
    }

    // ========== Map ==========

    /// Rebuild every marker from the store
    pub fn refresh_map(&mut self) {
        self.scratch_pin = None;
        self.markers.refresh(self.store.reports());
    }

    pub fn pan_map(&mut self, dx: f64, dy: f64) {
        self.map_view.pan_by(dx, dy);
    }

    pub fn zoom_map(&mut self, delta: f64) {
        self.map_view.zoom_by(delta);
    }

    /// Clicking the primary map drops a scratch pin, only on the map page
    pub fn map_clicked(&mut self, point: LatLng) {
        self.popup = None;
        if self.page() == Page::Map {
            self.scratch_pin = Some(point);
        }
    }

    pub fn open_popup(&mut self, id: ReportId) {
        self.popup = Some(id);
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Result of a "centre on me" request
    pub fn center_on_user(&mut self, fix: Result<LatLng, GeoError>) {
        match fix {
            Ok(point) => {
                info!("📍 Centering map on {}", point.label());
                self.map_view.set_view(point, GEOLOCATED_ZOOM);
                self.user_pin = Some(point);
            }
            Err(e) => {
                warn!("⚠️  Geolocation failed: {}", e);
                self.toasts.error(e.to_string());
            }
        }
    }

    // ========== Location picker ==========

    /// Open the picker seeded at the primary map centre.
    /// Returns whether a device fix should be requested for it.
    pub fn open_location_picker(&mut self, geolocation_available: bool) -> bool {
        let mut picker = LocationPicker::open(self.map_view.center);
        if geolocation_available {
            self.toasts.info(FINDING_LOCATION);
        } else {
            picker.hint = Some(MANUAL_PICK_HINT);
        }
        self.modal = Some(Modal::LocationPicker(picker));
        geolocation_available
    }

    /// The picker's "use my location" button.
    /// Returns whether a device fix should be requested.
    pub fn picker_locate_requested(&mut self, geolocation_available: bool) -> bool {
        if !geolocation_available || self.picker_mut().is_none() {
            return false;
        }
        self.toasts.info(FINDING_LOCATION);
        true
    }

    fn picker_mut(&mut self) -> Option<&mut LocationPicker> {
        match self.modal.as_mut() {
            Some(Modal::LocationPicker(picker)) => Some(picker),
            _ => None,
        }
    }

    pub fn picker_place_marker(&mut self, point: LatLng) {
        if let Some(picker) = self.picker_mut() {
            picker.place_marker(point);
        }
    }

    pub fn picker_pan(&mut self, dx: f64, dy: f64) {
        if let Some(picker) = self.picker_mut() {
            picker.viewport.pan_by(dx, dy);
        }
    }

    pub fn picker_zoom(&mut self, delta: f64) {
        if let Some(picker) = self.picker_mut() {
            picker.viewport.zoom_by(delta);
        }
    }

    /// Device fix for the open picker. Failure never blocks confirmation.
    pub fn picker_fix(&mut self, source: FixSource, fix: Result<LatLng, GeoError>) {
        let Some(picker) = self.picker_mut() else {
            return;
        };
        match (fix, source) {
            (Ok(point), _) => picker.apply_fix(point),
            (Err(e), FixSource::PickerOpened) => {
                picker.fix_failed(&e);
                self.toasts
                    .warning("Could not find location. Please select manually.");
            }
            (Err(e), FixSource::Button) => {
                warn!("⚠️  Picker geolocation failed: {}", e);
                self.toasts.error(e.to_string());
            }
        }
    }

    /// Take the picker's marker as the draft location and close it
    pub fn confirm_location(&mut self) {
        if let Some(Modal::LocationPicker(picker)) = self.modal.take() {
            self.draft.location = Some(picker.confirm());
        }
    }

    /// Close whatever modal is open without applying it
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    // ========== Composition ==========

    pub fn set_title(&mut self, title: String) {
        self.draft.title = title;
    }

    pub fn set_category(&mut self, category: Category) {
        self.draft.category = category;
    }

    pub fn set_description(&mut self, description: String) {
        self.draft.description = description;
    }

    /// Offer a batch of images to the collector, warning about what did not fit
    pub fn add_images(&mut self, batch: FileBatch) {
        if !batch.skipped.is_empty() {
            self.toasts.warning(format!(
                "Skipped {} file(s) that are not images",
                batch.skipped.len()
            ));
        }
        if batch.images.is_empty() {
            return;
        }

        let outcome = self.draft.images.add_batch(batch.images);
        if let Some(warning) = outcome.warning() {
            self.toasts.warning(warning);
        }
        info!(
            "🖼️  {} image(s) added, {} pending",
            outcome.added.len(),
            self.draft.images.len()
        );
    }

    pub fn remove_image(&mut self, id: ImageId) {
        self.draft.images.remove(id);
    }

    /// Capture one frame from `camera` into the collector
    pub fn capture_photo(&mut self, camera: &dyn Camera) {
        match capture::capture(camera) {
            Ok(url) => self.add_images(FileBatch {
                images: vec![url],
                skipped: Vec::new(),
            }),
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    /// Validate the draft. On success the caller generates thumbnails and
    /// hands them to `finish_submit`.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.submitting {
            return None;
        }
        match self.draft.prepare() {
            Ok(submission) => {
                self.submitting = true;
                Some(submission)
            }
            Err(e) => {
                self.warn_validation(e);
                None
            }
        }
    }

    fn warn_validation(&mut self, error: ValidationError) {
        warn!("⚠️  Submission blocked: {}", error);
        self.toasts.warning(error.to_string());
    }

    /// Create, persist and display the report once all thumbnails exist
    pub fn finish_submit(
        &mut self,
        submission: Submission,
        thumbnails: crate::error::Result<Vec<String>>,
    ) {
        self.submitting = false;

        let result = thumbnails.and_then(|thumbnails| {
            let now = Utc::now();
            let report = submission.into_report(now.timestamp_millis(), thumbnails, now)?;
            self.store.append(report)
        });

        match result {
            Ok(report) => {
                self.markers.insert(&report);
                self.draft.reset();
                self.navigate(Page::MyReports);
                self.toasts.success("Report submitted successfully!");
            }
            Err(e) => {
                error!("❌ Submit failed: {}", e);
                self.toasts.error(submit_error_message(&e));
            }
        }
    }

    // ========== My Reports ==========

    pub fn set_filter(&mut self, filter: ReportFilter) {
        self.filter = filter;
        self.render_list();
    }

    pub fn open_details(&mut self, id: ReportId) {
        if let Some(report) = self.store.get(id) {
            self.modal = Some(Modal::Details {
                report: ReportDetails::from_report(report),
                selected_status: report.status,
            });
        }
    }

    pub fn view_image(&mut self, url: String) {
        self.modal = Some(Modal::Image(url));
    }

    pub fn select_status(&mut self, status: Status) {
        if let Some(Modal::Details {
            selected_status, ..
        }) = self.modal.as_mut()
        {
            *selected_status = status;
        }
    }

    /// Apply the status chosen in the details modal
    pub fn apply_status_update(&mut self) {
        let Some(Modal::Details {
            report,
            selected_status,
        }) = self.modal.as_ref()
        else {
            return;
        };
        let (id, status) = (report.id, *selected_status);

        match self.store.set_status(id, status) {
            Ok(()) => {
                if let Some(updated) = self.store.get(id) {
                    self.markers.insert(updated);
                }
                self.render_list();
                self.modal = None;
                self.toasts.success("Report status updated successfully!");
            }
            Err(e) => {
                error!("❌ Status update failed: {}", e);
                self.toasts
                    .error(format!("Could not update report status: {}", e));
            }
        }
    }
}

fn submit_error_message(error: &ReporterError) -> String {
    match error {
        ReporterError::Storage(_) | ReporterError::Serialization(_) => {
            format!("Could not save report: {}", error)
        }
        ReporterError::Image(_)
        | ReporterError::InvalidDataUrl(_)
        | ReporterError::Io(_)
        | ReporterError::Thumbnail(_) => {
            format!("Could not process images: {}", error)
        }
        other => other.to_string(),
    }
}
