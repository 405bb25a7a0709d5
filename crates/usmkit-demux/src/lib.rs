//! # usmkit-demux
//!
//! Pure Rust demultiplexer for CRI USM containers.
//!
//! A USM file is a sequence of chunks. Video data travels in `@SFV` chunks,
//! audio in `@SFA` chunks, each tagged with a channel number. This crate walks
//! the chunks and writes the stream payloads into elementary stream files next
//! to the source:
//!
//! - video → `<stem>.m2v`
//! - audio → `<stem>.adx` or `<stem>.hca`, detected from the first payload
//!
//! No container headers or playback patches are added to the output.
//!
//! ## Example
//!
//! ```no_run
//! use usmkit_demux::{demux_file, DemuxOptions};
//!
//! let summary = demux_file("movie.usm", &DemuxOptions::default()).unwrap();
//! if let Some(video) = &summary.video {
//!     println!("Video: {}", video.path.display());
//! }
//! for audio in &summary.audio {
//!     println!("Audio: {} ({})", audio.path.display(), audio.codec);
//! }
//! ```

pub mod chunk;
pub mod error;
pub mod stream;

pub use chunk::{Chunk, ChunkHeader, ChunkKind, ChunkReader, PayloadType};
pub use error::DemuxError;
pub use stream::{StreamCodec, StreamOutput};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use stream::{stream_path, StreamSink};

/// Extension of USM container files
pub const USM_EXTENSION: &str = "usm";

/// Which streams to extract and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxOptions {
    pub extract_video: bool,
    pub extract_audio: bool,
    /// Write one file per audio channel instead of a single combined stream
    pub split_audio_streams: bool,
}

impl Default for DemuxOptions {
    fn default() -> Self {
        Self {
            extract_video: true,
            extract_audio: true,
            split_audio_streams: false,
        }
    }
}

/// Result of demultiplexing one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxSummary {
    pub source: PathBuf,
    pub video: Option<StreamOutput>,
    pub audio: Vec<StreamOutput>,
    /// Number of chunks read, including headers and markers
    pub chunk_count: usize,
}

impl DemuxSummary {
    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }

    /// Extension of the video stream, if one was extracted.
    pub fn video_extension(&self) -> Option<&'static str> {
        self.video.as_ref().map(StreamOutput::extension)
    }

    /// Extension of the first (or only) audio stream.
    pub fn audio_extension(&self) -> Option<&'static str> {
        self.audio.first().map(StreamOutput::extension)
    }
}

/// Demultiplex a USM file into elementary stream files next to it.
///
/// # Arguments
///
/// * `path` - Path to the `.usm` container
/// * `options` - Which streams to extract
///
/// # Returns
///
/// A [`DemuxSummary`] describing the files written, or an error if the
/// input is missing, is not a USM container, or is malformed.
pub fn demux_file<P: AsRef<Path>>(
    path: P,
    options: &DemuxOptions,
) -> Result<DemuxSummary, DemuxError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DemuxError::FileNotFound(path.to_path_buf())
        } else {
            DemuxError::Io(e)
        }
    })?;

    let mut reader = BufReader::new(file);
    check_signature(&mut reader)?;

    let mut chunks = ChunkReader::new(reader);
    if chunks.next_chunk()?.is_none() {
        return Err(DemuxError::NotUsm("file is empty".to_string()));
    }

    let mut chunk_count = 1;
    let mut video: Option<StreamSink> = None;
    let mut audio: BTreeMap<Option<u8>, StreamSink> = BTreeMap::new();

    for chunk in chunks {
        let chunk = chunk?;
        chunk_count += 1;

        if !chunk.is_stream_data() || chunk.payload.is_empty() {
            continue;
        }

        let channel = chunk.header.channel;
        match chunk.header.kind {
            ChunkKind::Video if options.extract_video => {
                if channel != 0 {
                    tracing::trace!("Skipping video channel {}", channel);
                    continue;
                }
                if video.is_none() {
                    video = Some(StreamSink::create(
                        stream_path(path, None, StreamCodec::Mpeg2Video.extension()),
                        StreamCodec::Mpeg2Video,
                        None,
                    )?);
                }
                if let Some(sink) = video.as_mut() {
                    sink.write(&chunk.payload)?;
                }
            }
            ChunkKind::Audio if options.extract_audio => {
                let key = options.split_audio_streams.then_some(channel);
                let sink = match audio.entry(key) {
                    std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
                    std::collections::btree_map::Entry::Vacant(e) => {
                        let codec = StreamCodec::detect_audio(&chunk.payload);
                        e.insert(StreamSink::create(
                            stream_path(path, key, codec.extension()),
                            codec,
                            key,
                        )?)
                    }
                };
                sink.write(&chunk.payload)?;
            }
            ChunkKind::Unknown(sig) => {
                tracing::debug!(
                    "Skipping unknown chunk {:?} at offset {:#x}",
                    String::from_utf8_lossy(&sig),
                    chunk.header.offset
                );
            }
            _ => {}
        }
    }

    let video = video.map(StreamSink::finish).transpose()?;
    let audio = audio
        .into_values()
        .map(StreamSink::finish)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Demuxed {:?}: {} chunks, video: {}, audio streams: {}",
        path,
        chunk_count,
        video.is_some(),
        audio.len()
    );

    Ok(DemuxSummary {
        source: path.to_path_buf(),
        video,
        audio,
        chunk_count,
    })
}

/// Verify the input starts with a CRID chunk, leaving the reader rewound.
fn check_signature<R: Read + Seek>(reader: &mut R) -> Result<(), DemuxError> {
    let mut magic = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut magic) {
        return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DemuxError::NotUsm("file is too short".to_string())
        } else {
            DemuxError::Io(e)
        });
    }
    reader.rewind()?;

    let kind = ChunkKind::from_signature(magic);
    if kind != ChunkKind::Crid {
        return Err(DemuxError::NotUsm(format!("expected CRID chunk, found {kind}")));
    }
    Ok(())
}

/// Check whether a path has the `.usm` extension (case-insensitive).
pub fn is_usm_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(USM_EXTENSION))
        .unwrap_or(false)
}
