//! Feedback modal

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};

use crest_core::feedback::ReportKind;

use super::message::Message;

#[derive(Debug, Clone)]
pub struct FeedbackState {
    pub is_open: bool,
    pub kind: ReportKind,
    pub summary: String,
    pub details: String,
    pub contact: String,
    /// Submission status shown under the form
    pub status: String,
    /// A submission is in flight
    pub sending: bool,
}

impl Default for FeedbackState {
    fn default() -> Self {
        Self {
            is_open: false,
            kind: ReportKind::Bug,
            summary: String::new(),
            details: String::new(),
            contact: String::new(),
            status: String::new(),
            sending: false,
        }
    }
}

pub fn view(state: &FeedbackState) -> Element<'_, Message> {
    let title = text("Send Feedback").size(24);
    let close_btn = button(text("×").size(20))
        .on_press(Message::CloseFeedback)
        .style(button::secondary);

    let header = row![title, Space::new().width(Length::Fill), close_btn]
        .align_y(Alignment::Center)
        .width(Length::Fill);

    let kind_row = row![
        kind_button(ReportKind::Bug, state.kind),
        kind_button(ReportKind::Feature, state.kind),
    ]
    .spacing(4);

    let summary_input = text_input("One-line summary", &state.summary)
        .on_input(Message::FeedbackSummaryChanged);
    let details_input = text_input("Details (optional)", &state.details)
        .on_input(Message::FeedbackDetailsChanged);
    let contact_input = text_input("Contact email (optional)", &state.contact)
        .on_input(Message::FeedbackContactChanged);

    let status: Element<Message> = if !state.status.is_empty() {
        text(&state.status).size(13).into()
    } else {
        Space::new().height(18).into()
    };

    let submit_label = if state.sending { "Sending..." } else { "Submit" };
    let mut submit_btn = button(text(submit_label)).style(button::primary);
    if !state.sending {
        submit_btn = submit_btn.on_press(Message::SubmitFeedback);
    }

    let actions = row![Space::new().width(Length::Fill), submit_btn]
        .spacing(10)
        .width(Length::Fill);

    let content = column![
        header,
        kind_row,
        summary_input,
        details_input,
        contact_input,
        status,
        actions
    ]
    .spacing(14)
    .width(Length::Fixed(450.0));

    container(content)
        .padding(30)
        .style(container::rounded_box)
        .into()
}

fn kind_button(kind: ReportKind, selected: ReportKind) -> Element<'static, Message> {
    button(text(kind.label()).size(12))
        .on_press(Message::SetFeedbackKind(kind))
        .style(if kind == selected {
            button::primary
        } else {
            button::secondary
        })
        .into()
}
