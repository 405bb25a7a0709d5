//! Legacy audio handling.
//!
//! ffmpeg is not relied on to decode CRI ADX streams, so ADX audio is first
//! converted to WAV with vgmstream. HCA and WAV go to the join step as-is.

use crate::runner::ProcessRunner;
use crate::{Error, MediaContainer, Result};
use std::path::{Path, PathBuf};

/// Extension of the intermediate file produced by the legacy conversion.
pub const INTERMEDIATE_AUDIO_EXTENSION: &str = "wav";

/// Name of the vgmstream installation directory inside the tools directory.
pub const VGMSTREAM_DIR: &str = "vgmstream";

/// Executable names tried inside the vgmstream directory, in order.
const VGMSTREAM_EXECUTABLES: &[&str] = &["vgmstream-cli", "test"];

/// Audio stream formats produced by the demuxer or the conversion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// CRI ADX
    Adx,
    /// CRI HCA
    Hca,
    /// PCM WAV (conversion output)
    Wav,
    /// Anything else
    Other,
}

impl AudioFormat {
    pub fn from_extension(extension: &str) -> Self {
        match extension
            .trim_start_matches('.')
            .to_ascii_lowercase()
            .as_str()
        {
            "adx" => AudioFormat::Adx,
            "hca" => AudioFormat::Hca,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Other,
        }
    }

    /// Whether the format must be converted before joining.
    pub fn is_legacy(&self) -> bool {
        matches!(self, AudioFormat::Adx)
    }
}

/// vgmstream command-line decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAudioConverter {
    executable: PathBuf,
}

impl LegacyAudioConverter {
    /// Use a specific vgmstream executable.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find vgmstream in `<tools_dir>/vgmstream`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if the directory is missing or holds
    /// no known executable.
    pub fn locate(tools_dir: &Path) -> Result<Self> {
        let install_dir = tools_dir.join(VGMSTREAM_DIR);
        if !install_dir.is_dir() {
            return Err(Error::tool_not_found(format!(
                "vgmstream (no directory at {})",
                install_dir.display()
            )));
        }

        VGMSTREAM_EXECUTABLES
            .iter()
            .map(|name| install_dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX)))
            .find(|path| path.is_file())
            .map(Self::new)
            .ok_or_else(|| {
                Error::tool_not_found(format!(
                    "vgmstream (no executable in {})",
                    install_dir.display()
                ))
            })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Decode `input` to a WAV file at `output`.
    pub fn convert(&self, runner: &dyn ProcessRunner, input: &Path, output: &Path) -> Result<()> {
        tracing::info!("Converting {:?} to {:?}", input, output);
        runner.run(
            &self.executable,
            &[
                input.display().to_string(),
                "-o".to_string(),
                output.display().to_string(),
            ],
        )
    }
}

/// Convert the container's audio to WAV if it uses a legacy encoding.
///
/// On success the container's audio extension is rewritten so the join step
/// reads the intermediate file. Returns `true` if a conversion ran.
pub fn route_legacy_audio(
    container: &mut MediaContainer,
    converter: &LegacyAudioConverter,
    runner: &dyn ProcessRunner,
) -> Result<bool> {
    let Some(input) = container.audio_path() else {
        return Ok(false);
    };
    if !needs_conversion(container) {
        return Ok(false);
    }

    let output = container.stream_path(INTERMEDIATE_AUDIO_EXTENSION);
    converter.convert(runner, &input, &output)?;
    container.set_final_audio_extension(INTERMEDIATE_AUDIO_EXTENSION);

    Ok(true)
}

/// Whether the container carries audio in a legacy encoding.
pub fn needs_conversion(container: &MediaContainer) -> bool {
    container
        .audio_format()
        .map(|format| format.is_legacy())
        .unwrap_or(false)
}
