//! Playlist panel: path entry, track rows, reorder and remove controls

use iced::widget::{button, column, container, row, scrollable, text, text_input, Space};
use iced::{Alignment, Element, Length};

use crest_core::playback::format_time;
use crest_core::playlist::Playlist;

use super::message::Message;

pub fn view<'a>(playlist: &'a Playlist, path_input: &'a str) -> Element<'a, Message> {
    let title = text("Playlist").size(18);

    let input = text_input("Path to file or folder...", path_input)
        .on_input(Message::PathInputChanged)
        .on_submit(Message::AddPath);
    let add_btn = button(text("Add").size(12))
        .on_press(Message::AddPath)
        .style(button::primary);
    let input_row = row![input, add_btn].spacing(6).align_y(Alignment::Center);

    let rows: Vec<Element<Message>> = playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let is_current = playlist.current_index() == Some(index);

            let label = match track.duration_seconds {
                Some(duration) => format!("{}  {}", track.label(), format_time(duration)),
                None => track.label(),
            };
            let select_btn = button(text(label).size(13))
                .on_press(Message::SelectTrack(index))
                .style(if is_current {
                    button::primary
                } else {
                    button::text
                })
                .width(Length::Fill);

            let up_btn = button(text("▲").size(10))
                .on_press(Message::MoveTrackUp(index))
                .style(button::secondary);
            let down_btn = button(text("▼").size(10))
                .on_press(Message::MoveTrackDown(index))
                .style(button::secondary);
            let remove_btn = button(text("✕").size(10))
                .on_press(Message::RemoveTrack(index))
                .style(button::secondary);

            row![select_btn, up_btn, down_btn, remove_btn]
                .spacing(4)
                .align_y(Alignment::Center)
                .into()
        })
        .collect();

    let list: Element<Message> = if rows.is_empty() {
        container(text("Add audio files to get started").size(13))
            .padding(20)
            .into()
    } else {
        scrollable(column(rows).spacing(2)).height(Length::Fill).into()
    };

    let clear_btn = button(text("Clear").size(11))
        .on_press(Message::ClearPlaylist)
        .style(button::secondary);
    let footer = row![
        text(format!("{} tracks", playlist.len())).size(12),
        Space::new().width(Length::Fill),
        clear_btn,
    ]
    .align_y(Alignment::Center);

    container(column![title, input_row, list, footer].spacing(10))
        .padding(12)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
