//! Settings modal
//!
//! Edits a draft copy of the configuration; nothing is applied until Save.

use iced::widget::{button, column, container, row, scrollable, text, text_input, toggler, Space};
use iced::{Alignment, Element, Length};

use crest_core::config::{PlayerConfig, WaveformViewMode};
use crest_core::output::OutputDevice;
use crest_core::routing::RoutingMode;
use crest_midi::{MidiRemote, TransportAction};

use super::message::Message;

/// Resolution choices shown in the settings grid
pub const RESOLUTION_OPTIONS: [usize; 6] = [1200, 2000, 4000, 8000, 16000, 24000];

/// Settings state for the modal
#[derive(Debug, Clone, Default)]
pub struct SettingsState {
    pub is_open: bool,
    pub draft_dark: bool,
    pub draft_accent: String,
    pub draft_resolution: usize,
    pub draft_view_mode: WaveformViewMode,
    pub draft_device: Option<String>,
    pub draft_routing: RoutingMode,
    pub draft_midi_enabled: bool,
    pub draft_midi_channel: Option<u8>,
    /// Devices enumerated when the modal opens
    pub devices: Vec<OutputDevice>,
    /// Status message (for save feedback)
    pub status: String,
}

impl SettingsState {
    /// Snapshot the current config into drafts
    pub fn from_config(config: &PlayerConfig, midi_enabled: bool, midi_channel: Option<u8>) -> Self {
        Self {
            is_open: false,
            draft_dark: config.theme.dark,
            draft_accent: config.theme.accent.clone(),
            draft_resolution: config.waveform.effective_resolution(),
            draft_view_mode: config.waveform.view_mode,
            draft_device: config.audio.output_device.clone(),
            draft_routing: config.audio.routing,
            draft_midi_enabled: midi_enabled,
            draft_midi_channel: midi_channel,
            devices: Vec::new(),
            status: String::new(),
        }
    }
}

/// Render the settings modal content
pub fn view<'a>(
    state: &'a SettingsState,
    midi: &'a MidiRemote,
    update_status: &'a str,
) -> Element<'a, Message> {
    let title = text("Settings").size(24);
    let close_btn = button(text("×").size(20))
        .on_press(Message::CloseSettings)
        .style(button::secondary);

    let header = row![title, Space::new().width(Length::Fill), close_btn]
        .align_y(Alignment::Center)
        .width(Length::Fill);

    let display_section = view_display_section(state);
    let audio_section = view_audio_section(state);
    let midi_section = view_midi_section(state, midi);
    let update_section = view_update_section(update_status);

    let status: Element<Message> = if !state.status.is_empty() {
        text(&state.status).size(14).into()
    } else {
        Space::new().height(20).into()
    };

    let cancel_btn = button(text("Cancel"))
        .on_press(Message::CloseSettings)
        .style(button::secondary);
    let save_btn = button(text("Save"))
        .on_press(Message::SaveSettings)
        .style(button::primary);

    let actions = row![Space::new().width(Length::Fill), cancel_btn, save_btn]
        .spacing(10)
        .width(Length::Fill);

    let sections = scrollable(
        column![display_section, audio_section, midi_section, update_section].spacing(15),
    )
    .height(Length::Fixed(420.0));

    let content = column![header, sections, status, actions]
        .spacing(15)
        .width(Length::Fixed(560.0));

    container(content)
        .padding(30)
        .style(container::rounded_box)
        .into()
}

/// Theme and waveform display settings
fn view_display_section(state: &SettingsState) -> Element<'_, Message> {
    let section_title = text("Display").size(18);

    let dark_label = text("Dark theme").size(14);
    let dark_toggle = toggler(state.draft_dark).on_toggle(Message::UpdateSettingsDark);
    let dark_row = row![dark_label, Space::new().width(Length::Fill), dark_toggle]
        .spacing(10)
        .align_y(Alignment::Center);

    let accent_label = text("Accent color").size(14);
    let accent_input = text_input("#4DA6FF", &state.draft_accent)
        .on_input(Message::UpdateSettingsAccent)
        .width(Length::Fixed(110.0));
    let accent_row = row![accent_label, Space::new().width(Length::Fill), accent_input]
        .spacing(10)
        .align_y(Alignment::Center);

    let resolution_title = text("Waveform Resolution").size(14);
    let resolution_hint = text("Buckets per waveform; higher is sharper but slower to build")
        .size(12);
    let resolution_buttons: Vec<Element<Message>> = RESOLUTION_OPTIONS
        .iter()
        .map(|&resolution| {
            let is_selected = state.draft_resolution == resolution;
            button(text(format!("{}", resolution)).size(11))
                .on_press(Message::UpdateSettingsResolution(resolution))
                .style(if is_selected {
                    button::primary
                } else {
                    button::secondary
                })
                .width(Length::Fixed(56.0))
                .into()
        })
        .collect();
    let resolution_row = row(resolution_buttons).spacing(4).align_y(Alignment::Center);

    let view_mode_title = text("Waveform View").size(14);
    let view_mode_row = row![
        mode_button(
            "Combined",
            state.draft_view_mode == WaveformViewMode::Combined,
            Message::UpdateSettingsViewMode(WaveformViewMode::Combined),
        ),
        mode_button(
            "Per channel",
            state.draft_view_mode == WaveformViewMode::Channels,
            Message::UpdateSettingsViewMode(WaveformViewMode::Channels),
        ),
    ]
    .spacing(4);

    container(
        column![
            section_title,
            dark_row,
            accent_row,
            Space::new().height(6),
            resolution_title,
            resolution_hint,
            resolution_row,
            Space::new().height(6),
            view_mode_title,
            view_mode_row,
        ]
        .spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .into()
}

/// Output device and routing settings
fn view_audio_section(state: &SettingsState) -> Element<'_, Message> {
    let section_title = text("Audio Output").size(18);

    let device_title = text("Output Device").size(14);
    let mut device_buttons: Vec<Element<Message>> = vec![mode_button(
        "System default",
        state.draft_device.is_none(),
        Message::UpdateSettingsDevice(None),
    )];
    for device in &state.devices {
        let is_selected = state.draft_device.as_deref() == Some(device.name.as_str());
        device_buttons.push(
            button(text(device.to_string()).size(12))
                .on_press(Message::UpdateSettingsDevice(Some(device.name.clone())))
                .style(if is_selected {
                    button::primary
                } else {
                    button::secondary
                })
                .width(Length::Fill)
                .into(),
        );
    }
    let device_list = column(device_buttons).spacing(4);

    let routing_title = text("Channel Layout").size(14);
    let routing_hint = text("Auto follows the source; others force the output layout")
        .size(12);
    let routing_buttons: Vec<Element<Message>> = RoutingMode::ALL
        .iter()
        .map(|&mode| {
            mode_button(
                mode.label(),
                state.draft_routing == mode,
                Message::UpdateSettingsRouting(mode),
            )
        })
        .collect();
    let routing_row = row(routing_buttons).spacing(4).align_y(Alignment::Center);

    container(
        column![
            section_title,
            device_title,
            device_list,
            Space::new().height(6),
            routing_title,
            routing_hint,
            routing_row,
        ]
        .spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .into()
}

/// MIDI remote settings and learn-mode bindings
fn view_midi_section<'a>(state: &'a SettingsState, midi: &'a MidiRemote) -> Element<'a, Message> {
    let section_title = text("MIDI Remote").size(18);

    let connected = if midi.is_connected() {
        text(format!("Connected: {}", midi.port_name().unwrap_or("?"))).size(12)
    } else {
        text("No device connected").size(12)
    };

    let enabled_toggle = toggler(state.draft_midi_enabled)
        .on_toggle(Message::UpdateSettingsMidiEnabled);
    let enabled_row = row![
        text("Enabled").size(14),
        Space::new().width(Length::Fill),
        enabled_toggle,
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let channel_title = text("Listen Channel").size(14);
    let mut channel_buttons: Vec<Element<Message>> = vec![channel_button(
        "All",
        state.draft_midi_channel.is_none(),
        Message::UpdateSettingsMidiChannel(None),
    )];
    for channel in 0u8..16 {
        channel_buttons.push(channel_button(
            &format!("{}", channel + 1),
            state.draft_midi_channel == Some(channel),
            Message::UpdateSettingsMidiChannel(Some(channel)),
        ));
    }
    let channel_row = row(channel_buttons).spacing(2).align_y(Alignment::Center);

    // One binding row per action: label, bound note, learn, clear
    let learn_pending = midi.learn_pending();
    let binding_rows: Vec<Element<Message>> = TransportAction::ALL
        .iter()
        .map(|&action| {
            let bound = midi
                .bindings()
                .note_for(action)
                .map(|note| format!("note {}", note))
                .unwrap_or_else(|| "unbound".to_string());

            let learning = learn_pending == Some(action);
            let learn_btn = if learning {
                button(text("Press a key...").size(11))
                    .on_press(Message::CancelLearn)
                    .style(button::primary)
            } else {
                button(text("Learn").size(11))
                    .on_press(Message::StartLearn(action))
                    .style(button::secondary)
            };
            let clear_btn = button(text("Clear").size(11))
                .on_press(Message::UnbindAction(action))
                .style(button::secondary);

            row![
                text(action.label()).size(13).width(Length::Fixed(150.0)),
                text(bound).size(12).width(Length::Fixed(80.0)),
                Space::new().width(Length::Fill),
                learn_btn,
                clear_btn,
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into()
        })
        .collect();

    container(
        column![
            section_title,
            connected,
            enabled_row,
            channel_title,
            channel_row,
            Space::new().height(6),
            text("Bindings").size(14),
            column(binding_rows).spacing(4),
        ]
        .spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .into()
}

fn view_update_section(update_status: &str) -> Element<'_, Message> {
    let section_title = text("Updates").size(18);
    let check_btn = button(text("Check for updates").size(12))
        .on_press(Message::CheckForUpdates)
        .style(button::secondary);
    let status = text(update_status).size(12);

    container(
        column![
            section_title,
            row![check_btn, status].spacing(10).align_y(Alignment::Center),
        ]
        .spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .into()
}

fn mode_button(label: &str, is_selected: bool, message: Message) -> Element<'_, Message> {
    button(text(label.to_string()).size(11))
        .on_press(message)
        .style(if is_selected {
            button::primary
        } else {
            button::secondary
        })
        .into()
}

fn channel_button(label: &str, is_selected: bool, message: Message) -> Element<'static, Message> {
    button(text(label.to_string()).size(10))
        .on_press(message)
        .style(if is_selected {
            button::primary
        } else {
            button::secondary
        })
        .width(Length::Fixed(28.0))
        .into()
}
