//! Crest audio player
//!
//! Entry point for the GUI application: initializes logging, loads the
//! configuration and theme, then runs the iced application.

mod ui;

use std::cell::RefCell;

use iced::{Size, Task};

use crest_core::config::load_config;
use ui::message::Message;
use ui::{theme, PlayerApp};

fn main() -> iced::Result {
    // Set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("crest starting up");

    let config = load_config();
    theme::init_theme(config.theme.clone());

    // Wrap the config in a cell so the boot closure can be Fn (required by
    // iced); it is only called once
    let config_cell = RefCell::new(Some(config));

    iced::application(
        move || {
            let config = config_cell
                .borrow_mut()
                .take()
                .unwrap_or_default();
            let app = PlayerApp::new(config);
            (app, Task::none())
        },
        update,
        view,
    )
    .subscription(subscription)
    .theme(app_theme)
    .title("Crest")
    .window_size(Size::new(1100.0, 720.0))
    .run()
}

/// Update function for iced
fn update(app: &mut PlayerApp, message: Message) -> Task<Message> {
    app.update(message)
}

/// View function for iced
fn view(app: &PlayerApp) -> iced::Element<'_, Message> {
    app.view()
}

/// Subscription function for iced
fn subscription(app: &PlayerApp) -> iced::Subscription<Message> {
    app.subscription()
}

/// Theme function for iced
fn app_theme(app: &PlayerApp) -> iced::Theme {
    app.theme()
}
