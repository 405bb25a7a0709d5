//! Elementary stream identification and output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::DemuxError;

/// Elementary stream codecs found in USM containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCodec {
    /// MPEG-1/2 video
    Mpeg2Video,
    /// CRI ADX audio
    Adx,
    /// CRI HCA audio
    Hca,
    /// Unrecognized audio payload
    UnknownAudio,
}

impl StreamCodec {
    /// File extension used for the demultiplexed stream (without a dot).
    pub fn extension(&self) -> &'static str {
        match self {
            StreamCodec::Mpeg2Video => "m2v",
            StreamCodec::Adx => "adx",
            StreamCodec::Hca => "hca",
            StreamCodec::UnknownAudio => "bin",
        }
    }

    /// Identify an audio codec from the first payload of the stream.
    pub fn detect_audio(payload: &[u8]) -> Self {
        if payload.len() >= 4 {
            // HCA headers may have the high bit of each signature byte set
            let masked = [
                payload[0] & 0x7F,
                payload[1] & 0x7F,
                payload[2] & 0x7F,
                payload[3] & 0x7F,
            ];
            if &masked == b"HCA\0" {
                return StreamCodec::Hca;
            }
        }
        if payload.len() >= 2 && payload[0] == 0x80 && payload[1] == 0x00 {
            return StreamCodec::Adx;
        }
        StreamCodec::UnknownAudio
    }
}

impl std::fmt::Display for StreamCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamCodec::Mpeg2Video => write!(f, "MPEG-2 Video"),
            StreamCodec::Adx => write!(f, "ADX"),
            StreamCodec::Hca => write!(f, "HCA"),
            StreamCodec::UnknownAudio => write!(f, "Unknown audio"),
        }
    }
}

/// An elementary stream file produced by the demuxer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutput {
    pub path: PathBuf,
    pub codec: StreamCodec,
    /// Channel number when audio streams were split, `None` for combined output
    pub channel: Option<u8>,
    pub bytes_written: u64,
}

impl StreamOutput {
    pub fn extension(&self) -> &'static str {
        self.codec.extension()
    }
}

/// Lazily created output file for one elementary stream
pub(crate) struct StreamSink {
    writer: BufWriter<File>,
    output: StreamOutput,
}

impl StreamSink {
    pub(crate) fn create(
        path: PathBuf,
        codec: StreamCodec,
        channel: Option<u8>,
    ) -> Result<Self, DemuxError> {
        tracing::debug!("Writing {} stream to {:?}", codec, path);
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            output: StreamOutput {
                path,
                codec,
                channel,
                bytes_written: 0,
            },
        })
    }

    pub(crate) fn write(&mut self, payload: &[u8]) -> Result<(), DemuxError> {
        self.writer.write_all(payload)?;
        self.output.bytes_written += payload.len() as u64;
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<StreamOutput, DemuxError> {
        self.writer.flush()?;
        Ok(self.output)
    }
}

/// Path of a demultiplexed stream: the source path with its extension replaced.
pub fn stream_path(source: &Path, channel: Option<u8>, extension: &str) -> PathBuf {
    match channel {
        None => source.with_extension(extension),
        Some(ch) => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            source.with_file_name(format!("{stem}_{ch}.{extension}"))
        }
    }
}
