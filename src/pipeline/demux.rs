//! Adapter between the pipeline and the USM demultiplexer.

use anyhow::{Context, Result};
use std::path::Path;
use usmkit_av::MediaContainer;
use usmkit_demux::{demux_file, DemuxOptions};

/// Splits one container into elementary stream files.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Demuxer: Send + Sync {
    /// Human-readable name identifying this demuxer implementation.
    fn name(&self) -> &'static str;

    /// Demultiplex `path`, writing the stream files next to it.
    fn demux(&self, path: &Path) -> Result<MediaContainer>;
}

/// Demuxer backed by `usmkit-demux`.
///
/// Extracts audio and video as raw elementary streams and keeps multiple
/// audio tracks in a single combined stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsmDemuxer;

impl Demuxer for UsmDemuxer {
    fn name(&self) -> &'static str {
        "usm"
    }

    fn demux(&self, path: &Path) -> Result<MediaContainer> {
        let options = DemuxOptions {
            extract_video: true,
            extract_audio: true,
            split_audio_streams: false,
        };

        let summary =
            demux_file(path, &options).with_context(|| format!("Failed to demux {:?}", path))?;

        let video_extension = summary
            .video_extension()
            .ok_or_else(|| anyhow::anyhow!("No video stream found in {:?}", path))?;

        let container = MediaContainer::new(path, video_extension);
        let container = match summary.audio_extension() {
            Some(ext) => container.with_audio(ext),
            None => container,
        };

        tracing::debug!(
            "Demuxed {:?}: video .{}, audio {:?}",
            path,
            container.video_extension(),
            container.final_audio_extension()
        );

        Ok(container)
    }
}
