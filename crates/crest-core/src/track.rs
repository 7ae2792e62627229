//! Track model and file identification
//!
//! A `Track` is the immutable result of probing an audio file's container
//! metadata. Re-probing a changed file replaces the value wholesale.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::decode::DecodeError;

/// File extensions accepted into the playlist.
///
/// Everything here enters the playlist; formats symphonia cannot decode
/// (e.g. wma) fail later with a non-fatal `DecodeError::UnsupportedFormat`.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "wave", "flac", "ogg", "aiff", "aif", "mp3", "m4a", "aac", "wma",
];

/// Check whether a path has a recognized audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Probed metadata for one playlist entry
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Absolute path to the audio file
    pub path: PathBuf,
    /// Display title (file stem)
    pub title: String,
    /// Short format tag derived from the extension (e.g. "FLAC")
    pub format: String,
    /// Duration in seconds, if the container reports frame counts
    pub duration_seconds: Option<f64>,
    /// Source sample rate in Hz
    pub sample_rate: u32,
    /// Source channel count
    pub channels: usize,
    /// File size in bytes
    pub file_size: u64,
}

impl Track {
    /// Display label for playlist rows: "Title (FLAC)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.title, self.format)
    }
}

/// Probe a file's container metadata without decoding the stream
pub fn probe_track(path: &Path) -> Result<Track, DecodeError> {
    let file = std::fs::File::open(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_size = file
        .metadata()
        .map(|m| m.len())
        .unwrap_or(0);

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(44100);
    let channels = params.channels.map(|c| c.count()).unwrap_or(2);
    let duration_seconds = params
        .n_frames
        .map(|frames| frames as f64 / sample_rate as f64);

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string();
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_uppercase())
        .unwrap_or_else(|| "?".to_string());

    Ok(Track {
        path: path.to_path_buf(),
        title,
        format,
        duration_seconds,
        sample_rate,
        channels,
        file_size,
    })
}

/// Cache key component: a waveform is valid only while the file bytes and
/// the configured bucket resolution both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileSignature {
    pub file_size: u64,
    pub modified_secs: u64,
    pub resolution: usize,
}

/// Compute the cache signature for a file at the given resolution
pub fn file_signature(path: &Path, resolution: usize) -> std::io::Result<FileSignature> {
    let meta = std::fs::metadata(path)?;
    let modified_secs = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Ok(FileSignature {
        file_size: meta.len(),
        modified_secs,
        resolution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(is_audio_file(Path::new("/music/song.flac")));
        assert!(is_audio_file(Path::new("/music/SONG.WAV")));
        assert!(is_audio_file(Path::new("take.aif")));
        assert!(!is_audio_file(Path::new("/music/cover.png")));
        assert!(!is_audio_file(Path::new("noextension")));
    }

    #[test]
    fn test_signature_changes_with_resolution() {
        let a = FileSignature {
            file_size: 100,
            modified_secs: 7,
            resolution: 2000,
        };
        let b = FileSignature {
            resolution: 4000,
            ..a
        };
        assert_ne!(a, b);
    }
}
