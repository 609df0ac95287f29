use std::sync::Arc;
use std::time::Duration;

use iced::time::Instant;
use iced::widget::canvas;
use iced::{Element, Subscription, Task, Theme};
use rfd::FileDialog;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod media;
mod render;
mod state;
mod ui;

use config::{AppConfig, MAP_INVALIDATE_DELAY_MS, THUMBNAIL_SIZE};
use error::{GeoError, ReporterError};
use media::capture::NoCamera;
use media::files::{read_image_files, FileBatch, IMAGE_EXTENSIONS};
use media::thumbnail::create_thumbnails;
use render::list::ReportFilter;
use state::app::AppState;
use state::compose::{ImageId, Submission};
use state::data::{Category, LatLng, ReportId, Status};
use state::location::{geolocator_from_config, FixSource, Geolocator};
use state::navigation::{Activation, Page};
use state::store::ReportStore;
use ui::images::ImageCache;
use ui::map_canvas::MapEvent;

/// Main application state
struct FacilityReporter {
    /// Reports, draft, navigation and toasts
    state: AppState,
    /// Device position source
    geolocator: Arc<dyn Geolocator>,
    /// Decoded handles for every image currently shown
    images: ImageCache,
    /// Static layer of the primary map
    map_cache: canvas::Cache,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    Navigate(Page),
    ToggleNav,

    // Primary map
    PrimaryMap(MapEvent),
    RefreshMap,
    LocateMe,
    Located(Result<LatLng, GeoError>),
    /// Delayed redraw after the map page becomes visible
    MapInvalidated,

    // Report composition
    TitleChanged(String),
    CategorySelected(Category),
    DescriptionChanged(String),
    PickImages,
    ImagesRead(FileBatch),
    RemoveImage(ImageId),
    OpenCamera,

    // Location picker
    OpenLocationPicker,
    PickerMap(MapEvent),
    PickerLocateMe,
    PickerLocated(FixSource, Result<LatLng, GeoError>),
    ConfirmLocation,
    CloseModal,

    // Submission
    Submit,
    /// Thumbnails for every image of the submission, or why they failed
    ThumbnailsReady(Submission, Result<Vec<String>, String>),

    // My Reports
    FilterSelected(ReportFilter),
    OpenDetails(ReportId),
    ClosePopup,
    ViewImage(String),
    StatusSelected(Status),
    UpdateStatus,

    DismissToast(u64),
    Tick(Instant),
}

impl FacilityReporter {
    /// Create a new instance of the application
    fn new(store: ReportStore, storage_fallback: bool, config: AppConfig) -> (Self, Task<Message>) {
        let mut state = AppState::new(store, &config);
        if storage_fallback {
            state
                .toasts_mut()
                .error("Could not open report storage. Reports will not be kept after closing.");
        }

        info!(
            "🏗️  Facility reporter initialized with {} reports",
            state.reports().len()
        );

        let mut app = FacilityReporter {
            state,
            geolocator: geolocator_from_config(&config),
            images: ImageCache::default(),
            map_cache: canvas::Cache::new(),
        };
        app.sync_images();

        // Centre the map on the device when a position source exists
        let task = if config.device_position.is_some() {
            app.locate(Message::Located)
        } else {
            Task::none()
        };
        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(page) => {
                let activation = self.state.navigate(page);
                if activation == Activation::InvalidateMap {
                    return Task::perform(
                        tokio::time::sleep(Duration::from_millis(MAP_INVALIDATE_DELAY_MS)),
                        |_| Message::MapInvalidated,
                    );
                }
                Task::none()
            }
            Message::ToggleNav => {
                self.state.toggle_nav();
                Task::none()
            }

            Message::PrimaryMap(event) => {
                match event {
                    MapEvent::Pan(dx, dy) => self.state.pan_map(dx, dy),
                    MapEvent::Zoom(delta) => self.state.zoom_map(delta),
                    MapEvent::Clicked(point) => self.state.map_clicked(point),
                    MapEvent::MarkerClicked(id) => self.state.open_popup(id),
                    MapEvent::MarkerDragged(_) => {}
                }
                self.map_cache.clear();
                Task::none()
            }
            Message::RefreshMap => {
                self.state.refresh_map();
                self.map_cache.clear();
                Task::none()
            }
            Message::LocateMe => self.locate(Message::Located),
            Message::Located(fix) => {
                self.state.center_on_user(fix);
                self.map_cache.clear();
                Task::none()
            }
            Message::MapInvalidated => {
                self.map_cache.clear();
                Task::none()
            }

            Message::TitleChanged(title) => {
                self.state.set_title(title);
                Task::none()
            }
            Message::CategorySelected(category) => {
                self.state.set_category(category);
                Task::none()
            }
            Message::DescriptionChanged(description) => {
                self.state.set_description(description);
                Task::none()
            }
            Message::PickImages => {
                let files = FileDialog::new()
                    .set_title("Select Photos of the Issue")
                    .add_filter("Images", &IMAGE_EXTENSIONS[..])
                    .pick_files();

                match files {
                    Some(paths) if !paths.is_empty() => {
                        info!("📂 Reading {} picked files", paths.len());
                        Task::perform(read_image_files(paths), Message::ImagesRead)
                    }
                    _ => Task::none(),
                }
            }
            Message::ImagesRead(batch) => {
                self.state.add_images(batch);
                self.sync_images();
                Task::none()
            }
            Message::RemoveImage(id) => {
                self.state.remove_image(id);
                self.sync_images();
                Task::none()
            }
            Message::OpenCamera => {
                self.state.capture_photo(&NoCamera);
                self.sync_images();
                Task::none()
            }

            Message::OpenLocationPicker => {
                if self
                    .state
                    .open_location_picker(self.geolocator.is_available())
                {
                    self.locate(|fix| Message::PickerLocated(FixSource::PickerOpened, fix))
                } else {
                    Task::none()
                }
            }
            Message::PickerMap(event) => {
                match event {
                    MapEvent::Pan(dx, dy) => self.state.picker_pan(dx, dy),
                    MapEvent::Zoom(delta) => self.state.picker_zoom(delta),
                    MapEvent::Clicked(point) | MapEvent::MarkerDragged(point) => {
                        self.state.picker_place_marker(point)
                    }
                    MapEvent::MarkerClicked(_) => {}
                }
                Task::none()
            }
            Message::PickerLocateMe => {
                if self
                    .state
                    .picker_locate_requested(self.geolocator.is_available())
                {
                    self.locate(|fix| Message::PickerLocated(FixSource::Button, fix))
                } else {
                    Task::none()
                }
            }
            Message::PickerLocated(source, fix) => {
                self.state.picker_fix(source, fix);
                Task::none()
            }
            Message::ConfirmLocation => {
                self.state.confirm_location();
                Task::none()
            }
            Message::CloseModal => {
                self.state.close_modal();
                Task::none()
            }

            Message::Submit => {
                let Some(submission) = self.state.begin_submit() else {
                    return Task::none();
                };
                info!(
                    "📨 Submitting \"{}\" with {} images",
                    submission.title,
                    submission.images.len()
                );

                let images = submission.images.clone();
                Task::perform(
                    async move {
                        create_thumbnails(images, THUMBNAIL_SIZE, THUMBNAIL_SIZE)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    move |result| Message::ThumbnailsReady(submission.clone(), result),
                )
            }
            Message::ThumbnailsReady(submission, result) => {
                self.state
                    .finish_submit(submission, result.map_err(ReporterError::Thumbnail));
                self.sync_images();
                self.map_cache.clear();
                Task::none()
            }

            Message::FilterSelected(filter) => {
                self.state.set_filter(filter);
                Task::none()
            }
            Message::OpenDetails(id) => {
                self.state.close_popup();
                self.state.open_details(id);
                Task::none()
            }
            Message::ClosePopup => {
                self.state.close_popup();
                Task::none()
            }
            Message::ViewImage(url) => {
                self.state.view_image(url);
                Task::none()
            }
            Message::StatusSelected(status) => {
                self.state.select_status(status);
                Task::none()
            }
            Message::UpdateStatus => {
                self.state.apply_status_update();
                Task::none()
            }

            Message::DismissToast(id) => {
                self.state.toasts_mut().dismiss(id);
                Task::none()
            }
            Message::Tick(now) => {
                self.state.toasts_mut().expire(now);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        ui::pages::app_view(&self.state, &self.images, &self.map_cache)
    }

    /// Toasts need a clock only while one is showing
    fn subscription(&self) -> Subscription<Message> {
        if self.state.toasts().is_empty() {
            Subscription::none()
        } else {
            iced::time::every(Duration::from_millis(500)).map(Message::Tick)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    /// Ask the geolocator for a fix off the UI thread
    fn locate(
        &self,
        on_fix: impl Fn(Result<LatLng, GeoError>) -> Message + Send + 'static,
    ) -> Task<Message> {
        let geolocator = Arc::clone(&self.geolocator);
        Task::perform(async move { geolocator.locate() }, on_fix)
    }

    /// Keep decoded handles for every image a page can show
    fn sync_images(&mut self) {
        let draft = self.state.draft().images.data_urls();
        let reports = self.state.reports();
        let urls = draft.iter().map(String::as_str).chain(
            reports
                .iter()
                .flat_map(|r| r.images.iter().chain(r.thumbnails.iter()))
                .map(String::as_str),
        );
        self.images.sync(urls);
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("facility_reporter=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!("💾 Report storage at {}", config.db_path.display());

    // Without a usable database the session still runs, in memory only
    let (store, storage_fallback) = match ReportStore::open(&config.db_path) {
        Ok(store) => (store, false),
        Err(e) => {
            error!("❌ Could not open {}: {}", config.db_path.display(), e);
            match ReportStore::open_in_memory() {
                Ok(store) => (store, true),
                Err(e) => {
                    error!("❌ In-memory storage unavailable: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    iced::application(
        "Facility Feedback Reporter",
        FacilityReporter::update,
        FacilityReporter::view,
    )
    .subscription(FacilityReporter::subscription)
    .theme(FacilityReporter::theme)
    .centered()
    .run_with(move || FacilityReporter::new(store, storage_fallback, config))
}
