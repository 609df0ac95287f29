/// Map canvas
/// Draws a Web-Mercator tile grid with report pins and handles pan, zoom,
/// clicks and marker dragging.
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size, Theme, Vector};

use super::images::ImageCache;
use crate::render::map::Marker;
use crate::state::data::{LatLng, ReportId};
use crate::state::location::Viewport;

/// Tile grid spacing in pixels
const GRID_STEP: f64 = 256.0;

/// Pointer travel below which a press/release counts as a click
const CLICK_SLOP: f32 = 4.0;

/// Radius used for pin hit-testing
const PIN_HIT_RADIUS: f32 = 14.0;

/// Side of the report picture drawn above a pin
const ICON_SIZE: f32 = 36.0;

/// Gap between the pin head and its picture
const ICON_GAP: f32 = 4.0;

const BACKGROUND: Color = Color::from_rgb(0.93, 0.93, 0.90);
const GRID: Color = Color::from_rgb(0.82, 0.82, 0.80);

/// Events emitted by the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Drag by (dx, dy) pixels
    Pan(f64, f64),
    Zoom(f64),
    /// Click on empty map
    Clicked(LatLng),
    /// Click on a report pin
    MarkerClicked(ReportId),
    /// The draggable marker was moved
    MarkerDragged(LatLng),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinKind {
    Report(ReportId),
    /// Temporary "New Report Location" pin
    Scratch,
    /// Device position
    User,
    /// The picker's draggable marker
    Draggable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub position: LatLng,
    pub color: Color,
    pub kind: PinKind,
    pub label: Option<String>,
    /// Report picture drawn above the head
    pub icon: Option<Handle>,
}

impl Pin {
    /// Pin for one report marker, with its picture when the cache has it
    pub fn for_marker(marker: &Marker, images: &ImageCache) -> Self {
        Self {
            position: marker.position,
            color: rgb(marker.category.pin_rgb()),
            kind: PinKind::Report(marker.report_id),
            label: None,
            icon: marker.icon.as_deref().and_then(|url| images.get(url)),
        }
    }

    fn radius(&self) -> f32 {
        match self.kind {
            PinKind::Draggable => 11.0,
            PinKind::User => 7.0,
            _ => 9.0,
        }
    }

    /// Where the picture sits for a head drawn at `center`
    fn icon_bounds(&self, center: Point) -> Rectangle {
        Rectangle::new(
            Point::new(
                center.x - ICON_SIZE / 2.0,
                center.y - self.radius() - ICON_GAP - ICON_SIZE,
            ),
            Size::new(ICON_SIZE, ICON_SIZE),
        )
    }
}

/// Canvas program for both the primary map and the picker map
pub struct MapCanvas<'a> {
    pub viewport: &'a Viewport,
    pub pins: Vec<Pin>,
    /// Static layer; cleared by the owner whenever the view changes
    pub cache: Option<&'a canvas::Cache>,
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub pressed_at: Option<Point>,
    pub last_position: Option<Point>,
    pub moved: bool,
    pub dragging_marker: bool,
}

impl<'a> MapCanvas<'a> {
    fn screen_point(&self, position: LatLng, bounds: Rectangle) -> Point {
        let (x, y) = self
            .viewport
            .to_screen(position, bounds.width as f64, bounds.height as f64);
        Point::new(x as f32, y as f32)
    }

    fn geo_point(&self, point: Point, bounds: Rectangle) -> LatLng {
        self.viewport.from_screen(
            point.x as f64,
            point.y as f64,
            bounds.width as f64,
            bounds.height as f64,
        )
    }

    /// Topmost pin under `point`, head or picture
    fn pin_at(&self, point: Point, bounds: Rectangle) -> Option<&Pin> {
        self.pins.iter().rev().find(|pin| {
            let center = self.screen_point(pin.position, bounds);
            center.distance(point) <= PIN_HIT_RADIUS
                || (pin.icon.is_some() && pin.icon_bounds(center).contains(point))
        })
    }

    fn draw_layer(&self, frame: &mut canvas::Frame, bounds: Rectangle) {
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        // Tile grid, aligned to world coordinates so it moves with the map
        let (cx, cy) = self.viewport.project(self.viewport.center);
        let left = cx - bounds.width as f64 / 2.0;
        let top = cy - bounds.height as f64 / 2.0;

        let grid = Path::new(|builder| {
            let mut x = (left / GRID_STEP).ceil() * GRID_STEP;
            while x < left + bounds.width as f64 {
                let sx = (x - left) as f32;
                builder.move_to(Point::new(sx, 0.0));
                builder.line_to(Point::new(sx, bounds.height));
                x += GRID_STEP;
            }
            let mut y = (top / GRID_STEP).ceil() * GRID_STEP;
            while y < top + bounds.height as f64 {
                let sy = (y - top) as f32;
                builder.move_to(Point::new(0.0, sy));
                builder.line_to(Point::new(bounds.width, sy));
                y += GRID_STEP;
            }
        });
        frame.stroke(&grid, Stroke::default().with_color(GRID).with_width(1.0));

        for pin in &self.pins {
            let center = self.screen_point(pin.position, bounds);
            if center.x < -40.0
                || center.y < -(40.0 + ICON_SIZE)
                || center.x > bounds.width + 40.0
                || center.y > bounds.height + 40.0
            {
                continue;
            }

            let radius = pin.radius();

            // Stem below the head, like a map pin
            if matches!(pin.kind, PinKind::Report(_) | PinKind::Draggable) {
                let stem = Path::line(center, center + Vector::new(0.0, radius + 8.0));
                frame.stroke(&stem, Stroke::default().with_color(pin.color).with_width(3.0));
            }

            let head = Path::circle(center, radius);
            frame.fill(&head, pin.color);
            frame.stroke(&head, Stroke::default().with_color(Color::WHITE).with_width(2.0));

            // Report picture framed in the category colour
            if let Some(icon) = &pin.icon {
                let area = pin.icon_bounds(center);
                frame.fill_rectangle(
                    area.position() - Vector::new(2.0, 2.0),
                    Size::new(area.width + 4.0, area.height + 4.0),
                    pin.color,
                );
                frame.draw_image(area, icon);
            }

            if let Some(label) = &pin.label {
                frame.fill_text(canvas::Text {
                    content: label.clone(),
                    position: center + Vector::new(radius + 6.0, -radius),
                    color: Color::from_rgb(0.15, 0.15, 0.15),
                    size: Pixels(13.0),
                    ..canvas::Text::default()
                });
            }
        }
    }
}

impl<'a> Program<MapEvent> for MapCanvas<'a> {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<MapEvent>) {
        match event {
            // Mouse wheel for zooming
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_none() {
                    return (canvas::event::Status::Ignored, None);
                }
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y as f64 * 0.5,
                    mouse::ScrollDelta::Pixels { y, .. } => y as f64 * 0.01,
                };
                return (canvas::event::Status::Captured, Some(MapEvent::Zoom(zoom_delta)));
            }

            // Mouse button press - start a click or a drag
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    state.pressed_at = Some(pos);
                    state.last_position = Some(pos);
                    state.moved = false;
                    state.dragging_marker = matches!(
                        self.pin_at(pos, Rectangle::with_size(bounds.size())),
                        Some(Pin { kind: PinKind::Draggable, .. })
                    );
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Mouse move - pan, or move the draggable marker
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let (Some(pressed), Some(last)) = (state.pressed_at, state.last_position) {
                    if let Some(current) = cursor.position_in(bounds) {
                        if current.distance(pressed) > CLICK_SLOP {
                            state.moved = true;
                        }
                        if !state.moved {
                            return (canvas::event::Status::Captured, None);
                        }
                        state.last_position = Some(current);

                        let local = Rectangle::with_size(bounds.size());
                        let event = if state.dragging_marker {
                            MapEvent::MarkerDragged(self.geo_point(current, local))
                        } else {
                            MapEvent::Pan((current.x - last.x) as f64, (current.y - last.y) as f64)
                        };
                        return (canvas::event::Status::Captured, Some(event));
                    }
                }
            }

            // Mouse button release - a press without movement is a click
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let Some(pressed) = state.pressed_at else {
                    return (canvas::event::Status::Ignored, None);
                };
                let was_click = !state.moved;
                *state = DragState::default();

                if was_click {
                    let pos = pressed;
                    let local = Rectangle::with_size(bounds.size());
                    let event = match self.pin_at(pos, local) {
                        Some(Pin {
                            kind: PinKind::Report(id),
                            ..
                        }) => MapEvent::MarkerClicked(*id),
                        _ => MapEvent::Clicked(self.geo_point(pos, local)),
                    };
                    return (canvas::event::Status::Captured, Some(event));
                }
                return (canvas::event::Status::Captured, None);
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let local = Rectangle::with_size(bounds.size());
        match self.cache {
            Some(cache) => vec![cache.draw(renderer, bounds.size(), |frame| {
                self.draw_layer(frame, local)
            })],
            None => {
                let mut frame = canvas::Frame::new(renderer, bounds.size());
                self.draw_layer(&mut frame, local);
                vec![frame.into_geometry()]
            }
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.pressed_at.is_some() && state.moved {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(pos) if self.pin_at(pos, Rectangle::with_size(bounds.size())).is_some() => {
                mouse::Interaction::Pointer
            }
            Some(_) => mouse::Interaction::Crosshair,
            None => mouse::Interaction::default(),
        }
    }
}

/// Pin colour from RGB bytes
pub fn rgb(bytes: [u8; 3]) -> Color {
    Color::from_rgb8(bytes[0], bytes[1], bytes[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::thumbnail::samples::png_data_url;
    use crate::state::data::fixtures::report;
    use crate::state::data::Status;

    fn canvas_with(viewport: &Viewport, pins: Vec<Pin>) -> MapCanvas<'_> {
        MapCanvas {
            viewport,
            pins,
            cache: None,
        }
    }

    #[test]
    fn test_pin_hit_testing() {
        let center = LatLng::new(5.4072, 103.0883);
        let viewport = Viewport::new(center, 16.0);
        let canvas = canvas_with(
            &viewport,
            vec![Pin {
                position: center,
                color: Color::BLACK,
                kind: PinKind::Report(42),
                label: None,
                icon: None,
            }],
        );
        let bounds = Rectangle::with_size(Size::new(400.0, 300.0));

        let hit = canvas.pin_at(Point::new(205.0, 152.0), bounds);
        assert_eq!(hit.map(|p| p.kind), Some(PinKind::Report(42)));
        assert!(canvas.pin_at(Point::new(10.0, 10.0), bounds).is_none());
    }

    #[test]
    fn test_geo_point_of_center() {
        let center = LatLng::new(5.4072, 103.0883);
        let viewport = Viewport::new(center, 16.0);
        let canvas = canvas_with(&viewport, Vec::new());
        let bounds = Rectangle::with_size(Size::new(400.0, 300.0));

        let point = canvas.geo_point(Point::new(200.0, 150.0), bounds);
        assert!((point.lat - center.lat).abs() < 1e-9);
        assert!((point.lng - center.lng).abs() < 1e-9);
    }

    #[test]
    fn test_report_pin_carries_its_picture() {
        let mut with_picture = report(1, Status::Submitted, 2);
        with_picture.thumbnails[0] = png_data_url(100, 100, [52, 152, 219]);
        let without_picture = report(2, Status::Submitted, 1);

        let first = Marker::from_report(&with_picture);
        let second = Marker::from_report(&without_picture);

        let mut images = ImageCache::default();
        images.sync(first.icon.iter().chain(second.icon.iter()).map(String::as_str));

        let pin = Pin::for_marker(&first, &images);
        assert_eq!(pin.kind, PinKind::Report(1));
        assert_eq!(pin.color, rgb([0x34, 0x98, 0xDB]));
        assert!(pin.icon.is_some());
        assert_eq!(pin.icon, images.get(&with_picture.thumbnails[0]));

        // Undecodable picture: the pin is still drawn, just without it
        assert!(Pin::for_marker(&second, &images).icon.is_none());
    }

    #[test]
    fn test_picture_is_clickable() {
        let center = LatLng::new(5.4072, 103.0883);
        let viewport = Viewport::new(center, 16.0);
        let mut images = ImageCache::default();
        let url = png_data_url(4, 4, [0, 0, 0]);
        images.sync([url.as_str()]);

        let canvas = canvas_with(
            &viewport,
            vec![Pin {
                position: center,
                color: Color::BLACK,
                kind: PinKind::Report(7),
                label: None,
                icon: images.get(&url),
            }],
        );
        let bounds = Rectangle::with_size(Size::new(400.0, 300.0));

        // Middle of the picture, above the head at (200, 150)
        let above = Point::new(200.0, 150.0 - 9.0 - ICON_GAP - ICON_SIZE / 2.0);
        assert_eq!(canvas.pin_at(above, bounds).map(|p| p.kind), Some(PinKind::Report(7)));
    }
}
