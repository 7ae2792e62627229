//! Transport bar: position readout, transport buttons, repeat and auto-next

use iced::widget::{button, row, text, toggler, Space};
use iced::{Alignment, Element, Length};

use crest_core::playback::{format_time, PlaybackState};

use super::message::Message;

pub fn view(playback: &PlaybackState, track_title: Option<&str>) -> Element<'static, Message> {
    let position = format_time(playback.position_seconds);
    let duration = format_time(playback.duration_seconds.unwrap_or(0.0));
    let time = text(format!("{} / {}", position, duration)).size(14);

    let title = text(track_title.unwrap_or("No track").to_string()).size(14);

    let previous_btn = button(text("⏮").size(16))
        .on_press(Message::PreviousTrack)
        .style(button::secondary);
    let play_label = if playback.is_playing() { "⏸" } else { "▶" };
    let play_btn = button(text(play_label).size(16))
        .on_press(Message::TogglePlay)
        .style(button::primary);
    let stop_btn = button(text("⏹").size(16))
        .on_press(Message::Stop)
        .style(button::secondary);
    let next_btn = button(text("⏭").size(16))
        .on_press(Message::NextTrack)
        .style(button::secondary);

    let repeat_btn = button(text(playback.repeat.label()).size(12))
        .on_press(Message::CycleRepeat)
        .style(button::secondary);

    let auto_next = row![
        text("Auto-next").size(12),
        toggler(playback.auto_next).on_toggle(Message::ToggleAutoNext),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    row![
        title,
        Space::new().width(Length::Fill),
        previous_btn,
        play_btn,
        stop_btn,
        next_btn,
        Space::new().width(20),
        repeat_btn,
        auto_next,
        Space::new().width(20),
        time,
    ]
    .spacing(6)
    .align_y(Alignment::Center)
    .width(Length::Fill)
    .into()
}
