//! Streaming symphonia decoder
//!
//! `AudioDecoder` yields planar f32 chunks one packet at a time so the
//! waveform worker can fold buckets incrementally and check for cancellation
//! between packets. `decode_all` is the convenience path for playback, which
//! needs the whole interleaved buffer up front.

use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors surfaced while probing or decoding a file.
///
/// All of these are non-fatal at the application level: the track stays in
/// the playlist, it just cannot be rendered or played.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no decodable audio track in container")]
    NoAudioTrack,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed stream: {0}")]
    Malformed(String),
}

/// Stream parameters reported by the container
#[derive(Debug, Clone, Copy)]
pub struct DecodeSpec {
    pub sample_rate: u32,
    pub channels: usize,
    /// Total frames if the container declares them (WAV/FLAC do, raw MP3
    /// streams may not)
    pub total_frames: Option<u64>,
}

/// One decoded packet's worth of planar samples
#[derive(Debug, Clone)]
pub struct DecodedChunk {
    /// Per-channel sample vectors, all the same length
    pub channels: Vec<Vec<f32>>,
    /// Frame count in this chunk
    pub frames: usize,
}

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: DecodeSpec,
    sample_buf: Option<SampleBuffer<f32>>,
}

impl AudioDecoder {
    /// Probe the container and set up a decoder for the default audio track
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let file = std::fs::File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
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

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;

        let spec = DecodeSpec {
            sample_rate: track.codec_params.sample_rate.unwrap_or(44100),
            channels: track.codec_params.channels.map(|c| c.count()).unwrap_or(2),
            total_frames: track.codec_params.n_frames,
        };

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            spec,
            sample_buf: None,
        })
    }

    pub fn spec(&self) -> DecodeSpec {
        self.spec
    }

    /// Decode the next packet into planar f32 samples.
    ///
    /// Returns `Ok(None)` at end of stream. Corrupt packets are skipped with
    /// a warning rather than aborting the whole track.
    pub fn next_chunk(&mut self) -> Result<Option<DecodedChunk>, DecodeError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => {
                    log::warn!("Packet read error, stopping decode: {}", e);
                    return Ok(None);
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping corrupt packet: {}", e);
                    continue;
                }
                Err(e) => return Err(DecodeError::Malformed(e.to_string())),
            };

            if decoded.frames() == 0 {
                continue;
            }

            // Trust the decoded buffer's spec over the container's
            let channels = decoded.spec().channels.count().max(1);
            let buf = self.sample_buf.get_or_insert_with(|| {
                SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
            });
            buf.copy_interleaved_ref(decoded);

            let frames = buf.samples().len() / channels;
            let mut planar = vec![Vec::with_capacity(frames); channels];
            for (i, &sample) in buf.samples().iter().enumerate() {
                planar[i % channels].push(sample);
            }

            return Ok(Some(DecodedChunk {
                channels: planar,
                frames,
            }));
        }
    }
}

/// Decode an entire file into an interleaved f32 buffer (for playback)
pub fn decode_all(path: &Path) -> Result<(Vec<f32>, DecodeSpec), DecodeError> {
    let mut decoder = AudioDecoder::open(path)?;
    let spec = decoder.spec();

    let mut samples = match spec.total_frames {
        Some(frames) => Vec::with_capacity(frames as usize * spec.channels),
        None => Vec::new(),
    };

    while let Some(chunk) = decoder.next_chunk()? {
        for frame in 0..chunk.frames {
            for channel in &chunk.channels {
                samples.push(channel[frame]);
            }
        }
    }

    Ok((samples, spec))
}
