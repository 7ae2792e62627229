//! Feedback modal handlers

use iced::Task;

use crest_core::feedback::{submit_in_background, FeedbackReport};

use crate::ui::app::PlayerApp;
use crate::ui::feedback_view::FeedbackState;
use crate::ui::message::Message;

pub fn open(app: &mut PlayerApp) -> Task<Message> {
    app.feedback = FeedbackState::default();
    app.feedback.is_open = true;
    Task::none()
}

pub fn close(app: &mut PlayerApp) -> Task<Message> {
    app.feedback.is_open = false;
    Task::none()
}

pub fn submit(app: &mut PlayerApp) -> Task<Message> {
    if app.feedback.sending {
        return Task::none();
    }
    if app.feedback.summary.trim().is_empty() {
        app.feedback.status = "Please write a short summary".to_string();
        return Task::none();
    }

    let report = FeedbackReport {
        kind: app.feedback.kind,
        summary: app.feedback.summary.clone(),
        details: app.feedback.details.clone(),
        contact: app.feedback.contact.clone(),
    };

    app.feedback.sending = true;
    app.feedback.status = String::new();
    app.feedback_rx = Some(submit_in_background(report));
    Task::none()
}
