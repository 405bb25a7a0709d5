use crate::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

/// Settings for one pipeline run.
///
/// Each CLI verb is a preset of these options; all paths are explicit so the
/// pipeline never depends on the process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Stop after demultiplexing
    pub extract_only: bool,

    /// Join the streams into an output file
    pub join: bool,

    /// Delete intermediate stream files after a successful join
    pub cleanup: bool,

    /// Skip the join when legacy audio cannot be converted; otherwise join
    /// with the unconverted audio
    pub strict_dependencies: bool,

    /// Directory for joined files; the bare file name is used when unset
    pub output_dir: Option<PathBuf>,

    /// Join configuration file
    pub config_path: PathBuf,

    /// Directory holding `ffmpeg` and the `vgmstream` folder
    pub tools_dir: PathBuf,
}

impl PipelineOptions {
    /// Demux only.
    pub fn extract() -> Self {
        Self {
            extract_only: true,
            join: false,
            cleanup: false,
            strict_dependencies: true,
            output_dir: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            tools_dir: PathBuf::from("."),
        }
    }

    /// Demux, convert legacy audio and join.
    pub fn convert() -> Self {
        Self {
            extract_only: false,
            join: true,
            ..Self::extract()
        }
    }

    pub fn with_join(mut self, join: bool) -> Self {
        self.join = join;
        self.extract_only = !join;
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_strict_dependencies(mut self, strict: bool) -> Self {
        self.strict_dependencies = strict;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_tools_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools_dir = path.into();
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::extract()
    }
}
