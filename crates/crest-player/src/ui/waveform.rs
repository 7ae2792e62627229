//! Waveform canvas
//!
//! Draws the bucketed waveform as vertical peak columns, mirrored around
//! each band's center line, with a playhead overlay. Clicking the canvas
//! seeks to that fraction of the track. Progressive snapshots from the
//! worker render exactly the same way as finished data.

use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke};
use iced::{mouse, Color, Point, Rectangle, Size, Theme};

use crest_core::config::WaveformViewMode;
use crest_core::waveform::WaveformData;

use super::message::Message;
use super::theme;

pub struct WaveformView<'a> {
    data: Option<&'a WaveformData>,
    /// Playhead position as a fraction of the track (0.0 - 1.0)
    playhead: f32,
    view_mode: WaveformViewMode,
}

impl<'a> WaveformView<'a> {
    pub fn new(
        data: Option<&'a WaveformData>,
        playhead: f32,
        view_mode: WaveformViewMode,
    ) -> Self {
        Self {
            data,
            playhead: playhead.clamp(0.0, 1.0),
            view_mode,
        }
    }

    fn draw_band(
        &self,
        frame: &mut Frame,
        buckets: &[f32],
        band_top: f32,
        band_height: f32,
        played_columns: usize,
    ) {
        let width = frame.width();
        let center = band_top + band_height / 2.0;
        let half = band_height / 2.0 * 0.92;

        let accent = theme::accent();
        let dim = theme::accent_dim();

        let columns = width as usize;
        if columns == 0 || buckets.is_empty() {
            return;
        }

        for x in 0..columns {
            let bucket = x * buckets.len() / columns;
            let peak = buckets[bucket].clamp(0.0, 1.0);
            // Floor of one pixel keeps silence visible as a hairline
            let extent = (peak * half).max(0.5);
            let color = if x < played_columns { accent } else { dim };
            frame.fill_rectangle(
                Point::new(x as f32, center - extent),
                Size::new(1.0, extent * 2.0),
                color,
            );
        }
    }
}

impl<'a> Program<Message> for WaveformView<'a> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if let Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if let Some(position) = cursor.position_in(bounds) {
                if self.data.is_some() {
                    let fraction = (position.x / bounds.width).clamp(0.0, 1.0) as f64;
                    return Some(canvas::Action::publish(Message::Seek(fraction)));
                }
            }
        }
        None
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::ORIGIN,
            frame.size(),
            Color::from_rgb(0.08, 0.08, 0.10),
        );

        if let Some(data) = self.data {
            let played_columns = (self.playhead * frame.width()) as usize;

            match self.view_mode {
                WaveformViewMode::Combined => {
                    let combined = data.combined();
                    let height = frame.height();
                    self.draw_band(&mut frame, &combined, 0.0, height, played_columns);
                }
                WaveformViewMode::Channels => {
                    let bands = data.channel_count().max(1);
                    let band_height = frame.height() / bands as f32;
                    for (i, channel) in data.channels.iter().enumerate() {
                        self.draw_band(
                            &mut frame,
                            channel,
                            i as f32 * band_height,
                            band_height,
                            played_columns,
                        );
                        // Separator between channel bands
                        if i > 0 {
                            let y = i as f32 * band_height;
                            frame.stroke(
                                &Path::line(Point::new(0.0, y), Point::new(frame.width(), y)),
                                Stroke::default()
                                    .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.15))
                                    .with_width(1.0),
                            );
                        }
                    }
                }
            }

            // Playhead line
            let x = self.playhead * frame.width();
            frame.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, frame.height())),
                Stroke::default().with_color(Color::WHITE).with_width(1.5),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) && self.data.is_some() {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}
