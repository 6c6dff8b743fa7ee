/// Thumbnail grid
///
/// Renders the collection as a wrapping grid of cards. Thumbnails
/// arrive asynchronously; cards without one yet show a placeholder
/// of the same size so the layout does not jump when bytes land.

use std::collections::HashMap;

use iced::widget::{button, column, container, image, mouse_area, row, text};
use iced::{Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::state::data::{MediaRecord, MediaType};
use crate::Message;

const CARD_WIDTH: f32 = 220.0;
const THUMB_HEIGHT: f32 = 160.0;

pub fn view<'a>(
    records: &'a [MediaRecord],
    thumbnails: &HashMap<i64, image::Handle>,
) -> Element<'a, Message> {
    let cards: Vec<Element<'a, Message>> = records
        .iter()
        .map(|record| card(record, thumbnails.get(&record.id)))
        .collect();

    container(Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0))
        .padding(16)
        .width(Length::Fill)
        .into()
}

fn card<'a>(record: &'a MediaRecord, thumbnail: Option<&image::Handle>) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match thumbnail {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(THUMB_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("·").size(32))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(THUMB_HEIGHT))
            .into(),
    };

    let badge: Element<'a, Message> = if record.media_type == MediaType::Video {
        text("▶").size(14).into()
    } else {
        text("").size(14).into()
    };

    let meta = row![
        column![
            text(&record.display_name).size(13),
            text(record.display_date()).size(11),
        ]
        .spacing(2)
        .width(Length::Fill),
        badge,
        button(text(if record.is_favorite { "♥" } else { "♡" }).size(16))
            .on_press(Message::FavoritePressed(record.id))
            .padding(4)
            .style(button::text),
    ]
    .spacing(6)
    .align_y(Alignment::Center)
    .width(Length::Fixed(CARD_WIDTH));

    let body = column![
        mouse_area(picture).on_press(Message::CardPressed(record.id)),
        meta,
    ]
    .spacing(6);

    container(body)
        .padding(6)
        .style(container::rounded_box)
        .into()
}
