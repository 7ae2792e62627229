//! Modal overlay helpers shared by the settings and feedback dialogs

use iced::widget::{center, container, mouse_area, opaque, stack, Space};
use iced::{Color, Element, Length};

use super::message::Message;

/// Semi-transparent backdrop that closes the modal on click
fn build_backdrop(close_message: Message) -> Element<'static, Message> {
    mouse_area(
        container(Space::new())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
                ..Default::default()
            }),
    )
    .on_press(close_message)
    .into()
}

/// Stack the modal content centered above the base view and a backdrop
pub fn with_modal_overlay<'a>(
    base: Element<'a, Message>,
    modal_content: Element<'a, Message>,
    close_message: Message,
) -> Element<'a, Message> {
    let backdrop = build_backdrop(close_message);

    let modal = center(opaque(modal_content))
        .width(Length::Fill)
        .height(Length::Fill);

    stack![base, backdrop, modal].into()
}
