//! Multichannel output routing
//!
//! A gain matrix maps decoded source channels onto output channels, up to
//! the 12 channels of a 7.1.4 layout. The matrix is built once per track
//! and applied per frame inside the audio callback.

use serde::{Deserialize, Serialize};

/// Hard cap on routable channels (7.1.4)
pub const MAX_ROUTING_CHANNELS: usize = 12;

/// Output channel labels for the settings grid
pub const CHANNEL_LABELS: [&str; MAX_ROUTING_CHANNELS] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Follow the source channel layout
    #[default]
    Auto,
    Stereo,
    Surround51,
    Surround71,
    Immersive714,
}

impl RoutingMode {
    pub const ALL: [RoutingMode; 5] = [
        RoutingMode::Auto,
        RoutingMode::Stereo,
        RoutingMode::Surround51,
        RoutingMode::Surround71,
        RoutingMode::Immersive714,
    ];

    /// Output channel count forced by this mode; `None` follows the source
    pub fn target_channels(self) -> Option<usize> {
        match self {
            RoutingMode::Auto => None,
            RoutingMode::Stereo => Some(2),
            RoutingMode::Surround51 => Some(6),
            RoutingMode::Surround71 => Some(8),
            RoutingMode::Immersive714 => Some(12),
        }
    }

    /// Channel count to request from the device for a given source.
    /// Auto follows the source layout, capped at the routing limit.
    pub fn desired_channels(self, source_channels: usize) -> usize {
        self.target_channels()
            .unwrap_or_else(|| source_channels.clamp(1, MAX_ROUTING_CHANNELS))
    }

    pub fn label(self) -> &'static str {
        match self {
            RoutingMode::Auto => "Auto",
            RoutingMode::Stereo => "Stereo (2.0)",
            RoutingMode::Surround51 => "Surround (5.1)",
            RoutingMode::Surround71 => "Surround (7.1)",
            RoutingMode::Immersive714 => "Immersive (7.1.4)",
        }
    }
}

/// Human-readable name for a channel count
pub fn layout_label(channels: usize) -> String {
    match channels {
        1 => "Mono (1.0)".to_string(),
        2 => "Stereo (2.0)".to_string(),
        6 => "Surround (5.1)".to_string(),
        8 => "Surround (7.1)".to_string(),
        12 => "Immersive (7.1.4)".to_string(),
        n => format!("{} channels", n),
    }
}

/// `gains[output][input]` in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingMatrix {
    gains: Vec<Vec<f32>>,
    inputs: usize,
    outputs: usize,
}

impl RoutingMatrix {
    /// Build the default matrix for a source/output channel pairing.
    ///
    /// Equal counts get identity; upmix duplicates the front pair into the
    /// extra outputs; downmix folds surplus inputs onto the front pair with
    /// equal-power scaling.
    pub fn for_layout(inputs: usize, outputs: usize) -> Self {
        let inputs = inputs.clamp(1, MAX_ROUTING_CHANNELS);
        let outputs = outputs.clamp(1, MAX_ROUTING_CHANNELS);
        let mut gains = vec![vec![0.0f32; inputs]; outputs];

        if outputs >= inputs {
            // Identity on the overlap, then repeat the source pattern into
            // the extra outputs (front L/R duplication for stereo sources)
            for (output, row) in gains.iter_mut().enumerate() {
                row[output % inputs] = 1.0;
            }
        } else {
            // Fold each surplus input onto output (input mod outputs);
            // equal-power scale per output by its contributor count
            let mut contributors = vec![0usize; outputs];
            for input in 0..inputs {
                contributors[input % outputs] += 1;
            }
            for input in 0..inputs {
                let output = input % outputs;
                gains[output][input] = 1.0 / (contributors[output] as f32).sqrt();
            }
        }

        Self {
            gains,
            inputs,
            outputs,
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn gain(&self, output: usize, input: usize) -> f32 {
        self.gains
            .get(output)
            .and_then(|row| row.get(input))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set one cell, clamped to [0, 1]
    pub fn set_gain(&mut self, output: usize, input: usize, gain: f32) {
        if let Some(slot) = self.gains.get_mut(output).and_then(|row| row.get_mut(input)) {
            *slot = gain.clamp(0.0, 1.0);
        }
    }

    /// Mix one source frame into one output frame
    pub fn apply(&self, frame_in: &[f32], frame_out: &mut [f32]) {
        for (row, out) in self.gains.iter().zip(frame_out.iter_mut()) {
            let mut acc = 0.0f32;
            for (&gain, &sample) in row.iter().zip(frame_in.iter()) {
                acc += gain * sample;
            }
            *out = acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_equal_counts() {
        let matrix = RoutingMatrix::for_layout(2, 2);
        assert_eq!(matrix.gain(0, 0), 1.0);
        assert_eq!(matrix.gain(1, 1), 1.0);
        assert_eq!(matrix.gain(0, 1), 0.0);

        let mut out = [0.0f32; 2];
        matrix.apply(&[0.3, -0.7], &mut out);
        assert_eq!(out, [0.3, -0.7]);
    }

    #[test]
    fn test_upmix_duplicates_front_pair() {
        let matrix = RoutingMatrix::for_layout(2, 6);
        // Outputs alternate L/R copies of the stereo source
        for output in 0..6 {
            assert_eq!(matrix.gain(output, output % 2), 1.0);
        }
        let mut out = [0.0f32; 6];
        matrix.apply(&[0.5, -0.5], &mut out);
        assert_eq!(out, [0.5, -0.5, 0.5, -0.5, 0.5, -0.5]);
    }

    #[test]
    fn test_downmix_is_equal_power() {
        let matrix = RoutingMatrix::for_layout(6, 2);
        // Three inputs fold onto each output
        let expected = 1.0 / 3.0f32.sqrt();
        assert!((matrix.gain(0, 0) - expected).abs() < 1e-6);
        assert!((matrix.gain(0, 2) - expected).abs() < 1e-6);
        assert!((matrix.gain(0, 4) - expected).abs() < 1e-6);
        assert_eq!(matrix.gain(0, 1), 0.0);
    }

    #[test]
    fn test_channel_cap() {
        let matrix = RoutingMatrix::for_layout(64, 64);
        assert_eq!(matrix.inputs(), MAX_ROUTING_CHANNELS);
        assert_eq!(matrix.outputs(), MAX_ROUTING_CHANNELS);
    }

    #[test]
    fn test_set_gain_clamped() {
        let mut matrix = RoutingMatrix::for_layout(2, 2);
        matrix.set_gain(0, 1, 5.0);
        assert_eq!(matrix.gain(0, 1), 1.0);
        matrix.set_gain(0, 1, -1.0);
        assert_eq!(matrix.gain(0, 1), 0.0);
        // Out-of-range cells are ignored
        matrix.set_gain(10, 10, 0.5);
    }

    #[test]
    fn test_mode_targets() {
        assert_eq!(RoutingMode::Auto.target_channels(), None);
        assert_eq!(RoutingMode::Stereo.target_channels(), Some(2));
        assert_eq!(RoutingMode::Surround51.target_channels(), Some(6));
        assert_eq!(RoutingMode::Surround71.target_channels(), Some(8));
        assert_eq!(RoutingMode::Immersive714.target_channels(), Some(12));
    }

    #[test]
    fn test_auto_mode_follows_source_layout() {
        assert_eq!(RoutingMode::Auto.desired_channels(2), 2);
        assert_eq!(RoutingMode::Auto.desired_channels(6), 6);
        assert_eq!(RoutingMode::Auto.desired_channels(16), MAX_ROUTING_CHANNELS);
        // Forced modes ignore the source
        assert_eq!(RoutingMode::Stereo.desired_channels(6), 2);
        assert_eq!(RoutingMode::Immersive714.desired_channels(2), 12);
    }

    #[test]
    fn test_layout_labels() {
        assert_eq!(layout_label(1), "Mono (1.0)");
        assert_eq!(layout_label(12), "Immersive (7.1.4)");
        assert_eq!(layout_label(3), "3 channels");
    }
}
