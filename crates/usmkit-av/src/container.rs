//! Per-file stream metadata.

use crate::audio::AudioFormat;
use std::path::{Path, PathBuf};

/// Elementary streams demultiplexed from one container file.
///
/// Stream files live next to the source and share its stem: `clip.usm`
/// yields `clip.m2v` and `clip.adx`. The audio extension starts as the
/// format the demuxer produced and is rewritten when the audio is
/// converted to an intermediate format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContainer {
    source_path: PathBuf,
    video_extension: String,
    final_audio_extension: Option<String>,
}

impl MediaContainer {
    /// Create a container record for a video-only demux result.
    pub fn new(source_path: impl Into<PathBuf>, video_extension: &str) -> Self {
        Self {
            source_path: source_path.into(),
            video_extension: normalize_extension(video_extension),
            final_audio_extension: None,
        }
    }

    /// Record that an audio stream with the given extension was extracted.
    pub fn with_audio(mut self, audio_extension: &str) -> Self {
        self.final_audio_extension = Some(normalize_extension(audio_extension));
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn video_extension(&self) -> &str {
        &self.video_extension
    }

    pub fn has_audio(&self) -> bool {
        self.final_audio_extension.is_some()
    }

    /// Current audio extension, without the leading dot.
    pub fn final_audio_extension(&self) -> Option<&str> {
        self.final_audio_extension.as_deref()
    }

    /// Rewrite the audio extension after a conversion step.
    ///
    /// Has no effect on a container without audio.
    pub fn set_final_audio_extension(&mut self, extension: &str) {
        if self.final_audio_extension.is_some() {
            self.final_audio_extension = Some(normalize_extension(extension));
        }
    }

    pub fn audio_format(&self) -> Option<AudioFormat> {
        self.final_audio_extension
            .as_deref()
            .map(AudioFormat::from_extension)
    }

    /// Source file name without directory or extension.
    pub fn base_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Path of a sibling stream file with the given extension.
    pub fn stream_path(&self, extension: &str) -> PathBuf {
        self.source_path
            .with_extension(normalize_extension(extension))
    }

    pub fn video_path(&self) -> PathBuf {
        self.stream_path(&self.video_extension)
    }

    /// Path of the audio stream the join step should read, if any.
    pub fn audio_path(&self) -> Option<PathBuf> {
        self.final_audio_extension
            .as_deref()
            .map(|ext| self.stream_path(ext))
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
