/// UI building blocks
///
/// Pure view code: these functions project the gallery state into
/// widgets and emit `Message`s. No state lives here; everything is
/// re-derived from the engine on each render.

use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Background, Color, Element, Length, Theme};

use crate::Message;

pub mod grid;
pub mod viewer;

/// Modal confirmation shown before a delete is sent to the server
pub fn confirm_delete<'a>(id: i64) -> Element<'a, Message> {
    let dialog = container(
        column![
            text("Delete this moment permanently?").size(16),
            text("The original and all generated assets are removed from the server.").size(12),
            row![
                button("Cancel").on_press(Message::DeleteCancelled),
                button("Delete")
                    .on_press(Message::DeleteConfirmed(id))
                    .style(button::danger),
            ]
            .spacing(12),
        ]
        .spacing(14)
        .align_x(Alignment::Center),
    )
    .padding(24)
    .style(container::rounded_box);

    container(dialog)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(scrim)
        .into()
}

/// Dimmed backdrop behind modal layers
pub fn scrim(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
        ..container::Style::default()
    }
}
