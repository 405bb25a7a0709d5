//! ffmpeg arguments for joining demultiplexed streams.

use crate::runner::split_args;
use crate::{Error, MediaContainer, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// User-supplied join settings.
///
/// Stored as JSON with PascalCase keys:
///
/// ```json
/// { "VideoParameter": "-c:v libx264", "AudioParameter": "-c:a aac", "OutputFormat": "mp4" }
/// ```
///
/// The parameter fragments are passed to ffmpeg verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinConfig {
    #[serde(default)]
    pub video_parameter: String,

    #[serde(default)]
    pub audio_parameter: String,

    #[serde(default)]
    pub output_format: String,
}

impl JoinConfig {
    pub fn new(video_parameter: &str, audio_parameter: &str, output_format: &str) -> Self {
        Self {
            video_parameter: video_parameter.to_string(),
            audio_parameter: audio_parameter.to_string(),
            output_format: output_format.to_string(),
        }
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce an output file name.
    pub fn validate(&self) -> Result<()> {
        if self.output_extension().is_empty() {
            return Err(Error::InvalidConfig("OutputFormat must not be empty".to_string()));
        }
        Ok(())
    }

    /// Output extension without surrounding whitespace or a leading dot.
    pub fn output_extension(&self) -> &str {
        self.output_format.trim().trim_start_matches('.')
    }
}

/// Arguments of one ffmpeg join invocation.
///
/// The order is fixed: video input, audio input, video parameters, audio
/// parameters, output path. ffmpeg maps the inputs positionally, so the
/// parameter fragments apply to the inputs that precede them.
///
/// `Display` renders the arguments as one line with paths quoted:
///
/// ```
/// use usmkit_av::{JoinArguments, JoinConfig, MediaContainer};
///
/// let container = MediaContainer::new("clip.usm", "m2v").with_audio("hca");
/// let config = JoinConfig::new("-c:v libx264", "-c:a aac", "mp4");
/// let args = JoinArguments::build(&container, "clip", None, &config);
///
/// assert_eq!(
///     args.to_string(),
///     r#"-i "clip.m2v" -i "clip.hca" -c:v libx264 -c:a aac "clip.mp4""#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinArguments {
    video_input: PathBuf,
    audio_input: Option<PathBuf>,
    video_parameter: String,
    audio_parameter: Option<String>,
    output: PathBuf,
}

impl JoinArguments {
    /// Build the join arguments for a container.
    ///
    /// The output is `<output_dir>/<base_name>.<output format>`; without an
    /// output directory the bare file name is used, which resolves against
    /// the tool's working directory.
    pub fn build(
        container: &MediaContainer,
        base_name: &str,
        output_dir: Option<&Path>,
        config: &JoinConfig,
    ) -> Self {
        let file_name = format!("{}.{}", base_name, config.output_extension());
        let output = match output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        };

        let audio_input = container.audio_path();
        let audio_parameter = audio_input
            .as_ref()
            .map(|_| config.audio_parameter.trim().to_string());

        Self {
            video_input: container.video_path(),
            audio_input,
            video_parameter: config.video_parameter.trim().to_string(),
            audio_parameter,
            output,
        }
    }

    pub fn video_input(&self) -> &Path {
        &self.video_input
    }

    pub fn audio_input(&self) -> Option<&Path> {
        self.audio_input.as_deref()
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The arguments as an argv list, ready for [`std::process::Command::args`].
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-i".to_string(), self.video_input.display().to_string()];

        if let Some(audio) = &self.audio_input {
            args.push("-i".to_string());
            args.push(audio.display().to_string());
        }

        args.extend(split_args(&self.video_parameter));

        if let Some(fragment) = &self.audio_parameter {
            args.extend(split_args(fragment));
        }

        args.push(self.output.display().to_string());
        args
    }
}

impl fmt::Display for JoinArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-i \"{}\"", self.video_input.display())?;

        if let Some(audio) = &self.audio_input {
            write!(f, " -i \"{}\"", audio.display())?;
        }

        if !self.video_parameter.is_empty() {
            write!(f, " {}", self.video_parameter)?;
        }

        if let Some(fragment) = self.audio_parameter.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " {}", fragment)?;
        }

        write!(f, " \"{}\"", self.output.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JoinConfig {
        JoinConfig::new("-c:v libx264", "-c:a aac", "mp4")
    }

    #[test]
    fn test_render_with_audio() {
        let container = MediaContainer::new("clip.usm", "m2v").with_audio("hca");
        let args = JoinArguments::build(&container, "clip", None, &config());

        assert_eq!(
            args.to_string(),
            r#"-i "clip.m2v" -i "clip.hca" -c:v libx264 -c:a aac "clip.mp4""#
        );
        assert_eq!(
            args.to_args(),
            ["-i", "clip.m2v", "-i", "clip.hca", "-c:v", "libx264", "-c:a", "aac", "clip.mp4"]
        );
    }

    #[test]
    fn test_render_without_audio() {
        let container = MediaContainer::new("clip.usm", "m2v");
        let args = JoinArguments::build(&container, "clip", None, &config());

        assert_eq!(args.to_string(), r#"-i "clip.m2v" -c:v libx264 "clip.mp4""#);
        assert!(!args.to_args().contains(&"-c:a".to_string()));
        assert_eq!(args.to_args().iter().filter(|a| *a == "-i").count(), 1);
    }

    #[test]
    fn test_output_dir() {
        let container = MediaContainer::new("/in/clip.usm", "m2v").with_audio("wav");
        let args = JoinArguments::build(&container, "clip", Some(Path::new("/out")), &config());

        assert_eq!(args.output(), Path::new("/out/clip.mp4"));
        assert_eq!(args.audio_input(), Some(Path::new("/in/clip.wav")));
        assert!(args.to_string().ends_with(r#""/out/clip.mp4""#));
    }

    #[test]
    fn test_empty_fragments_are_omitted() {
        let container = MediaContainer::new("clip.usm", "m2v").with_audio("hca");
        let args = JoinArguments::build(&container, "clip", None, &JoinConfig::new("", " ", "mkv"));

        assert_eq!(args.to_string(), r#"-i "clip.m2v" -i "clip.hca" "clip.mkv""#);
        assert_eq!(args.to_args().len(), 5);
    }

    #[test]
    fn test_build_is_deterministic() {
        let container = MediaContainer::new("a b/clip.usm", "m2v").with_audio("adx");
        let first = JoinArguments::build(&container, "clip", Some(Path::new("out")), &config());
        let second = JoinArguments::build(&container, "clip", Some(Path::new("out")), &config());

        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_config_json() {
        let config = JoinConfig::from_json(
            r#"{"VideoParameter":"-c:v libx264","AudioParameter":"-c:a aac","OutputFormat":"mp4"}"#,
        )
        .unwrap();
        assert_eq!(config, self::config());
    }

    #[test]
    fn test_config_requires_output_format() {
        let err = JoinConfig::from_json(r#"{"VideoParameter":"-c:v copy"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = JoinConfig::from_json(r#"{"OutputFormat":" . "}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_output_extension_normalized() {
        assert_eq!(JoinConfig::new("", "", " .mkv ").output_extension(), "mkv");
    }
}
