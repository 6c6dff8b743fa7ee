/// Full-screen viewer overlay
///
/// Shown on top of the grid while the viewer is open: the current
/// record's preview, metadata, mutation buttons and the slideshow
/// transport. Videos display their poster frame; playback happens in
/// whatever the user opens the saved original with.

use iced::widget::{button, column, container, image, row, slider, text, Space};
use iced::{Alignment, Background, Color, ContentFit, Element, Length, Theme};

use crate::state::data::{MediaRecord, MediaType};
use crate::Message;

pub fn view<'a>(
    record: &'a MediaRecord,
    preview: Option<&image::Handle>,
    position: usize,
    total: usize,
    playing: bool,
    interval_secs: u64,
) -> Element<'a, Message> {
    let header = row![
        column![
            text(&record.display_name).size(16),
            text(format!(
                "{} · {} of {}",
                record.display_date(),
                position + 1,
                total
            ))
            .size(12),
        ]
        .spacing(2),
        Space::with_width(Length::Fill),
        button(text(if record.is_favorite { "♥" } else { "♡" }).size(18))
            .on_press(Message::FavoritePressed(record.id))
            .style(button::text),
        button(text("⬇").size(18))
            .on_press(Message::DownloadPressed(record.id))
            .style(button::text),
        button(text("🗑").size(18))
            .on_press(Message::DeletePressed(record.id))
            .style(button::text),
        button(text("✕").size(18))
            .on_press(Message::ViewerClosed)
            .style(button::text),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .padding(12);

    let picture: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => text("Loading…").size(18).into(),
    };
    let stage = container(picture)
        .center_x(Length::Fill)
        .center_y(Length::Fill);

    let caption: Element<'a, Message> = if record.media_type == MediaType::Video {
        text("Video: save the original (⬇) to play it").size(12).into()
    } else if !record.tags.is_empty() {
        text(record.tags.join(" · ")).size(12).into()
    } else {
        Space::with_height(Length::Shrink).into()
    };

    let transport = row![
        button(text("‹").size(24))
            .on_press(Message::ViewerPrev)
            .style(button::text),
        button(text(if playing { "⏸" } else { "▶" }).size(20))
            .on_press(Message::SlideshowToggled)
            .style(button::text),
        button(text("›").size(24))
            .on_press(Message::ViewerNext)
            .style(button::text),
        Space::with_width(Length::Fixed(24.0)),
        text(format!("every {}s", interval_secs)).size(12),
        slider(
            1.0..=10.0,
            interval_secs as f64,
            Message::SlideshowIntervalChanged
        )
        .step(1.0)
        .on_release(Message::SlideshowIntervalCommitted)
        .width(Length::Fixed(140.0)),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .padding(12);

    container(
        column![
            header,
            stage,
            container(caption).center_x(Length::Fill),
            container(transport).center_x(Length::Fill),
        ]
        .spacing(4),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .style(backdrop)
    .into()
}

/// Near-opaque black so the grid disappears behind the viewer
fn backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.94))),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    }
}
