/// Page and modal views
///
/// Every function here only reads `AppState`; user actions come back as
/// `Message`s handled in `main.rs`.
use iced::alignment::Horizontal;
use iced::widget::canvas::{self, Canvas};
use iced::widget::image::Image;
use iced::widget::{
    button, center, column, container, horizontal_space, mouse_area, opaque, pick_list, row,
    scrollable, stack, text, text_input, Column, Row,
};
use iced::{Alignment, Background, Border, Color, ContentFit, Element, Length, Theme};
use iced_aw::Wrap;

use super::images::ImageCache;
use super::map_canvas::{rgb, MapCanvas, MapEvent, Pin, PinKind};
use crate::config::MAX_IMAGES;
use crate::render::details::ReportDetails;
use crate::render::list::{ReportCard, ReportFilter};
use crate::render::map::legend;
use crate::state::app::{AppState, Modal};
use crate::state::data::{Category, Status};
use crate::state::location::LocationPicker;
use crate::state::navigation::Page;
use crate::state::notify::Toast;
use crate::Message;

const SCRATCH_PIN: Color = Color::from_rgb(0.2, 0.2, 0.2);
const USER_PIN: Color = Color::from_rgb(0.16, 0.5, 0.73);
const PICKER_PIN: Color = Color::from_rgb(0.91, 0.3, 0.24);

/// Whole window: navigation, active page, toasts and the open modal
pub fn app_view<'a>(
    state: &'a AppState,
    images: &'a ImageCache,
    map_cache: &'a canvas::Cache,
) -> Element<'a, Message> {
    let page: Element<'a, Message> = match state.page() {
        Page::Landing => landing_view(),
        Page::Map => map_view(state, images, map_cache),
        Page::ReportIssue => compose_view(state, images),
        Page::MyReports => reports_view(state, images),
        Page::Gallery => gallery_view(state, images),
        Page::About => about_view(),
    };

    let mut body = row![].height(Length::Fill);
    if state.nav_open() {
        body = body.push(side_nav(state.page()));
    }
    body = body.push(container(page).width(Length::Fill).height(Length::Fill).padding(16));

    let base = column![top_bar(), body];

    let mut layers = stack![base, toast_overlay(state.toasts().items())];
    if let Some(modal) = state.modal() {
        layers = layers.push(modal_overlay(modal_view(modal, images)));
    }
    layers.into()
}

fn top_bar<'a>() -> Element<'a, Message> {
    container(
        row![
            button(text("☰").size(20)).on_press(Message::ToggleNav).style(button::text),
            button(text("Facility Feedback Reporter").size(20))
                .on_press(Message::Navigate(Page::Landing))
                .style(button::text),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding(8)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

fn side_nav<'a>(current: Page) -> Element<'a, Message> {
    let links = Page::NAV.iter().map(|page| {
        let style = if *page == current {
            button::primary
        } else {
            button::secondary
        };
        button(text(page.to_string()))
            .width(Length::Fill)
            .style(style)
            .on_press(Message::Navigate(*page))
            .into()
    });

    container(Column::with_children(links).spacing(6))
        .width(Length::Fixed(180.0))
        .height(Length::Fill)
        .padding(12)
        .into()
}

fn landing_view<'a>() -> Element<'a, Message> {
    let content = column![
        text("Facility Feedback Reporter").size(40),
        text("Spotted something broken? Snap a photo, pin it on the map and let facilities know.")
            .size(16),
        row![
            button("Report an Issue")
                .padding(10)
                .style(button::primary)
                .on_press(Message::Navigate(Page::ReportIssue)),
            button("View Map")
                .padding(10)
                .on_press(Message::Navigate(Page::Map)),
            button("My Reports")
                .padding(10)
                .on_press(Message::Navigate(Page::MyReports)),
        ]
        .spacing(12),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn about_view<'a>() -> Element<'a, Message> {
    column![
        text("About").size(28),
        text(
            "Report facility issues such as broken lights, leaking pipes, damaged furniture \
             or cleanliness problems. Each report carries up to five photos and a map location, \
             and its status can be followed from My Reports."
        ),
        text("Reports are stored on this device only."),
    ]
    .spacing(12)
    .into()
}

// ========== Map ==========

fn map_view<'a>(
    state: &'a AppState,
    images: &'a ImageCache,
    map_cache: &'a canvas::Cache,
) -> Element<'a, Message> {
    let mut pins: Vec<Pin> = state
        .markers()
        .markers()
        .map(|marker| Pin::for_marker(marker, images))
        .collect();
    if let Some(point) = state.scratch_pin() {
        pins.push(Pin {
            position: point,
            color: SCRATCH_PIN,
            kind: PinKind::Scratch,
            label: Some(format!("New Report Location: {}", point.label())),
            icon: None,
        });
    }
    if let Some(point) = state.user_pin() {
        pins.push(Pin {
            position: point,
            color: USER_PIN,
            kind: PinKind::User,
            label: Some("Your current location".to_string()),
            icon: None,
        });
    }

    let map: Element<'a, MapEvent> = Canvas::new(MapCanvas {
        viewport: state.map_view(),
        pins,
        cache: Some(map_cache),
    })
    .width(Length::Fill)
    .height(Length::Fill)
    .into();

    let mut side = column![
        row![
            button("🔄").on_press(Message::RefreshMap),
            button("📍").on_press(Message::LocateMe),
            button("➕ New Report")
                .style(button::primary)
                .on_press(Message::Navigate(Page::ReportIssue)),
        ]
        .spacing(6),
        legend_view(),
    ]
    .spacing(16)
    .width(Length::Fixed(260.0));

    if let Some(marker) = state.popup() {
        let mut header = row![].spacing(8).align_y(Alignment::Center);
        if let Some(icon) = &marker.icon {
            header = header.push(thumb(images, icon, 40.0));
        }
        let popup = column![
            header.push(
                row![
                    text(&marker.popup.title).size(18),
                    horizontal_space(),
                    button("×").style(button::text).on_press(Message::ClosePopup),
                ]
                .align_y(Alignment::Center)
            ),
            text(format!("Category: {}", marker.popup.category)),
            text(format!("Status: {}", marker.popup.status)),
            Wrap::with_elements(
                marker
                    .popup
                    .images
                    .iter()
                    .map(|url| thumb(images, url, 64.0))
                    .collect(),
            )
            .spacing(4.0)
            .line_spacing(4.0),
            button("View Details").on_press(Message::OpenDetails(marker.report_id)),
        ]
        .spacing(6);
        side = side.push(container(popup).padding(10).style(container::rounded_box));
    }

    row![map.map(Message::PrimaryMap), side].spacing(12).into()
}

fn legend_view<'a>() -> Element<'a, Message> {
    let rows = legend().into_iter().map(|(name, color)| {
        row![swatch(rgb(color)), text(name)]
            .spacing(8)
            .align_y(Alignment::Center)
            .into()
    });

    column![text("Legend").size(18), Column::with_children(rows).spacing(4)]
        .spacing(6)
        .into()
}

fn swatch<'a>(color: Color) -> Element<'a, Message> {
    container(text(""))
        .width(Length::Fixed(14.0))
        .height(Length::Fixed(14.0))
        .style(move |_theme: &Theme| filled(color))
        .into()
}

// ========== Report composition ==========

fn compose_view<'a>(state: &'a AppState, images: &'a ImageCache) -> Element<'a, Message> {
    let draft = state.draft();

    let previews = draft
        .images
        .images()
        .iter()
        .map(|pending| {
            column![
                thumb(images, &pending.data_url, 90.0),
                button(text("×"))
                    .style(button::danger)
                    .on_press(Message::RemoveImage(pending.id)),
            ]
            .spacing(2)
            .align_x(Alignment::Center)
            .into()
        })
        .collect();

    let submit = button(if state.is_submitting() {
        "Submitting..."
    } else {
        "Submit Report"
    })
    .padding(10)
    .style(button::success)
    .on_press_maybe((!state.is_submitting()).then_some(Message::Submit));

    let form = column![
        text("Report an Issue").size(28),
        text("Title"),
        text_input("Short summary of the issue", &draft.title)
            .on_input(Message::TitleChanged)
            .padding(8),
        text("Category"),
        pick_list(Category::ALL, Some(draft.category), Message::CategorySelected),
        text("Description (optional)"),
        text_input("What is wrong?", &draft.description)
            .on_input(Message::DescriptionChanged)
            .padding(8),
        text(format!("Photos ({}/{})", draft.images.len(), MAX_IMAGES)),
        row![
            button("📷 Camera").on_press(Message::OpenCamera),
            button("🖼️ Gallery").on_press(Message::PickImages),
        ]
        .spacing(8),
        Wrap::with_elements(previews).spacing(8.0).line_spacing(8.0),
        row![
            text(draft.location_label()),
            button("Select Location").on_press(Message::OpenLocationPicker),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        submit,
    ]
    .spacing(10)
    .max_width(640);

    scrollable(form).height(Length::Fill).into()
}

// ========== My Reports ==========

fn reports_view<'a>(state: &'a AppState, images: &'a ImageCache) -> Element<'a, Message> {
    let filters = ReportFilter::ALL.iter().map(|filter| {
        let style = if *filter == state.filter() {
            button::primary
        } else {
            button::secondary
        };
        button(text(filter.to_string()))
            .style(style)
            .on_press(Message::FilterSelected(*filter))
            .into()
    });

    let list: Element<'a, Message> = if state.cards().is_empty() {
        text("No reports found").into()
    } else {
        Column::with_children(state.cards().iter().map(|card| report_card(card, images)))
            .spacing(12)
            .into()
    };

    column![
        text("My Reports").size(28),
        Row::with_children(filters).spacing(6),
        scrollable(list).height(Length::Fill),
    ]
    .spacing(12)
    .into()
}

fn report_card<'a>(card: &'a ReportCard, images: &'a ImageCache) -> Element<'a, Message> {
    let mut previews = Row::with_children(
        card.preview_images.iter().map(|url| thumb(images, url, 70.0)),
    )
    .spacing(6)
    .align_y(Alignment::Center);
    if let Some(overflow) = &card.overflow {
        previews = previews.push(text(overflow));
    }

    let content = column![
        row![
            text(&card.title).size(18),
            horizontal_space(),
            status_badge(card.status, &card.status_label),
        ]
        .align_y(Alignment::Center),
        text(&card.category),
        previews,
        row![
            text(&card.date_label),
            horizontal_space(),
            button("View Details").on_press(Message::OpenDetails(card.id)),
        ]
        .align_y(Alignment::Center),
    ]
    .spacing(8);

    container(content)
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn status_badge<'a>(status: Status, label: &'a str) -> Element<'a, Message> {
    let color = status_color(status);
    container(text(label).color(Color::WHITE))
        .padding([2, 8])
        .style(move |_theme: &Theme| filled(color))
        .into()
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Submitted => rgb([0x34, 0x98, 0xDB]),
        Status::InProgress => rgb([0xF3, 0x9C, 0x12]),
        Status::Resolved => rgb([0x27, 0xAE, 0x60]),
    }
}

// ========== Gallery ==========

fn gallery_view<'a>(state: &'a AppState, images: &'a ImageCache) -> Element<'a, Message> {
    let grid: Element<'a, Message> = if state.gallery().is_empty() {
        text("No photos available").into()
    } else {
        Wrap::with_elements(
            state
                .gallery()
                .iter()
                .map(|url| thumb(images, url, 160.0))
                .collect(),
        )
        .spacing(8.0)
        .line_spacing(8.0)
        .into()
    };

    column![text("Gallery").size(28), scrollable(grid).height(Length::Fill)]
        .spacing(12)
        .into()
}

// ========== Modals ==========

fn modal_view<'a>(modal: &'a Modal, images: &'a ImageCache) -> Element<'a, Message> {
    match modal {
        Modal::LocationPicker(picker) => picker_view(picker),
        Modal::Details {
            report,
            selected_status,
        } => details_view(report, *selected_status, images),
        Modal::Image(url) => {
            let content: Element<'a, Message> = match images.get(url) {
                Some(handle) => Image::new(handle)
                    .width(Length::Fixed(720.0))
                    .height(Length::Fixed(540.0))
                    .content_fit(ContentFit::Contain)
                    .into(),
                None => text("Image unavailable").into(),
            };
            column![content, button("Close").on_press(Message::CloseModal)]
                .spacing(10)
                .align_x(Alignment::Center)
                .into()
        }
    }
}

fn picker_view<'a>(picker: &'a LocationPicker) -> Element<'a, Message> {
    let pins = vec![Pin {
        position: picker.marker,
        color: PICKER_PIN,
        kind: PinKind::Draggable,
        label: picker.hint.map(str::to_string),
        icon: None,
    }];

    let map: Element<'a, MapEvent> = Canvas::new(MapCanvas {
        viewport: &picker.viewport,
        pins,
        cache: None,
    })
    .width(Length::Fixed(640.0))
    .height(Length::Fixed(420.0))
    .into();

    column![
        text("Select Location").size(22),
        text("Click the map or drag the marker to the issue's location."),
        map.map(Message::PickerMap),
        text(picker.marker.label()),
        row![
            button("📍 Use my location").on_press(Message::PickerLocateMe),
            horizontal_space(),
            button("Cancel")
                .style(button::secondary)
                .on_press(Message::CloseModal),
            button("Confirm Location")
                .style(button::primary)
                .on_press(Message::ConfirmLocation),
        ]
        .spacing(8),
    ]
    .spacing(10)
    .width(Length::Fixed(640.0))
    .into()
}

fn details_view<'a>(
    report: &'a ReportDetails,
    selected: Status,
    images: &'a ImageCache,
) -> Element<'a, Message> {
    column![
        row![
            text(&report.title).size(22),
            horizontal_space(),
            button("×").style(button::text).on_press(Message::CloseModal),
        ]
        .align_y(Alignment::Center),
        text(format!("Category: {}", report.category)),
        row![
            text("Status:"),
            status_badge(report.status, &report.status_label)
        ]
        .spacing(6)
        .align_y(Alignment::Center),
        text(format!("Date Reported: {}", report.date_label)),
        text(format!("Location: {}", report.location_label)),
        text("Description:"),
        text(&report.description),
        Wrap::with_elements(
            report
                .images
                .iter()
                .map(|url| thumb(images, url, 100.0))
                .collect(),
        )
        .spacing(6.0)
        .line_spacing(6.0),
        text("Update Report Status").size(18),
        row![
            pick_list(Status::ALL, Some(selected), Message::StatusSelected),
            button("Update")
                .style(button::primary)
                .on_press(Message::UpdateStatus),
        ]
        .spacing(8),
    ]
    .spacing(8)
    .width(Length::Fixed(560.0))
    .into()
}

/// Dimmed backdrop; clicking outside the content closes the modal
fn modal_overlay<'a>(content: Element<'a, Message>) -> Element<'a, Message> {
    opaque(
        mouse_area(
            center(opaque(
                container(content)
                    .padding(20)
                    .style(container::rounded_box),
            ))
            .style(|_theme: &Theme| container::Style {
                background: Some(Background::Color(Color {
                    a: 0.7,
                    ..Color::BLACK
                })),
                ..container::Style::default()
            }),
        )
        .on_press(Message::CloseModal),
    )
}

fn toast_overlay<'a>(toasts: &'a [Toast]) -> Element<'a, Message> {
    let items = toasts.iter().map(|toast| {
        let color = rgb(toast.kind.rgb());
        container(
            row![
                text(&toast.message).color(Color::WHITE),
                button(text("×").color(Color::WHITE))
                    .style(button::text)
                    .on_press(Message::DismissToast(toast.id)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .padding([6, 12])
        .style(move |_theme: &Theme| filled(color))
        .into()
    });

    container(Column::with_children(items).spacing(8).width(Length::Shrink))
        .width(Length::Fill)
        .align_x(Horizontal::Right)
        .padding(16)
        .into()
}

/// Clickable image thumbnail that opens the enlarged view
fn thumb<'a>(images: &ImageCache, url: &str, size: f32) -> Element<'a, Message> {
    let content: Element<'a, Message> = match images.get(url) {
        Some(handle) => Image::new(handle)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("🖼️"))
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .center_x(Length::Fixed(size))
            .center_y(Length::Fixed(size))
            .into(),
    };

    button(content)
        .padding(0)
        .style(button::text)
        .on_press(Message::ViewImage(url.to_string()))
        .into()
}

fn filled(color: Color) -> container::Style {
    container::Style {
        background: Some(Background::Color(color)),
        border: Border {
            radius: 6.0.into(),
            ..Border::default()
        },
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    }
}
