use super::cleanup::{remove_intermediates, CleanupReport};
use super::demux::{Demuxer, UsmDemuxer};
use super::options::PipelineOptions;
use crate::config::load_join_config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use usmkit_av::audio::INTERMEDIATE_AUDIO_EXTENSION;
use usmkit_av::{
    ffmpeg_path, route_legacy_audio, JoinArguments, JoinConfig, LegacyAudioConverter,
    MediaContainer, ProcessRunner, SystemRunner,
};

/// Join configuration as resolved when the pipeline is built
#[derive(Debug, Clone, PartialEq, Eq)]
enum JoinSettings {
    Ready(JoinConfig),
    Unavailable(String),
    NotNeeded,
}

/// What happened to a file's audio stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioRouting {
    /// Routing was not reached (extract only)
    NotAttempted,
    /// The container has no audio stream
    NoAudio,
    /// The audio is joined as demuxed
    Passthrough { extension: String },
    /// Legacy audio was decoded to an intermediate file
    Converted { from: String, to: String },
    /// Legacy audio needed conversion but the converter is missing
    Skipped { reason: String },
}

/// Why a requested join did not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSkipReason {
    ConfigUnavailable(String),
    MissingDependency(String),
}

/// Outcome of the join step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    NotRequested,
    Joined { output: PathBuf },
    Skipped { reason: JoinSkipReason },
}

/// Terminal state of one processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub source: PathBuf,
    pub audio: AudioRouting,
    pub join: JoinOutcome,
    /// Set when intermediate files were cleaned up
    pub cleaned: Option<CleanupReport>,
}

impl FileReport {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            audio: AudioRouting::NotAttempted,
            join: JoinOutcome::NotRequested,
            cleaned: None,
        }
    }

    /// Path of the joined output, if the join ran
    pub fn joined_output(&self) -> Option<&Path> {
        match &self.join {
            JoinOutcome::Joined { output } => Some(output),
            _ => None,
        }
    }
}

/// Per-file conversion pipeline: demux, audio routing, join, cleanup.
pub struct Pipeline {
    options: PipelineOptions,
    demuxer: Arc<dyn Demuxer>,
    runner: Arc<dyn ProcessRunner>,
    join_settings: JoinSettings,
}

impl Pipeline {
    /// Build a pipeline using the USM demuxer and real child processes.
    ///
    /// The join configuration is read here, once per run. A missing or
    /// invalid file does not fail construction; every file's join is skipped
    /// instead.
    pub fn new(options: PipelineOptions) -> Self {
        let join_settings = if options.join && !options.extract_only {
            match load_join_config(&options.config_path) {
                Ok(config) => JoinSettings::Ready(config),
                Err(e) => {
                    tracing::error!("Join configuration unavailable: {:#}", e);
                    JoinSettings::Unavailable(format!("{:#}", e))
                }
            }
        } else {
            JoinSettings::NotNeeded
        };

        Self {
            options,
            demuxer: Arc::new(UsmDemuxer),
            runner: Arc::new(SystemRunner),
            join_settings,
        }
    }

    pub fn with_demuxer(mut self, demuxer: Arc<dyn Demuxer>) -> Self {
        self.demuxer = demuxer;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Process one container file.
    pub fn process(&self, path: &Path) -> Result<FileReport> {
        tracing::info!("File: {:?}", path);
        let mut report = FileReport::new(path);

        tracing::info!("Demuxing {} with {}", path.display(), self.demuxer.name());
        let mut container = self.demuxer.demux(path)?;

        if self.options.extract_only {
            return Ok(report);
        }

        // No conversion work for a join that cannot run.
        if self.options.join {
            if let JoinSettings::Unavailable(reason) = &self.join_settings {
                tracing::error!("Skipping join of {:?}: {}", path, reason);
                report.join = JoinOutcome::Skipped {
                    reason: JoinSkipReason::ConfigUnavailable(reason.clone()),
                };
                return Ok(report);
            }
        }

        report.audio = self.route_audio(&mut container)?;

        if !self.options.join {
            return Ok(report);
        }

        if let AudioRouting::Skipped { reason } = &report.audio {
            if self.options.strict_dependencies {
                report.join = JoinOutcome::Skipped {
                    reason: JoinSkipReason::MissingDependency(reason.clone()),
                };
                return Ok(report);
            }
        }

        let JoinSettings::Ready(config) = &self.join_settings else {
            return Ok(report);
        };

        let output = self.join(&container, config)?;
        report.join = JoinOutcome::Joined { output };

        if self.options.cleanup {
            tracing::info!("Cleaning up temporary files from {}", container.base_name());
            report.cleaned = Some(remove_intermediates(container.source_path()));
        }

        Ok(report)
    }

    fn route_audio(&self, container: &mut MediaContainer) -> Result<AudioRouting> {
        let Some(format) = container.audio_format() else {
            return Ok(AudioRouting::NoAudio);
        };
        let from = container.final_audio_extension().unwrap_or_default().to_string();

        if !format.is_legacy() {
            return Ok(AudioRouting::Passthrough { extension: from });
        }

        let converter = match LegacyAudioConverter::locate(&self.options.tools_dir) {
            Ok(converter) => converter,
            Err(e) => {
                let reason = e.to_string();
                if self.options.strict_dependencies {
                    tracing::error!("{} audio needs conversion: {}", from, reason);
                } else {
                    tracing::warn!("{} audio needs conversion, joining it unconverted: {}", from, reason);
                }
                return Ok(AudioRouting::Skipped { reason });
            }
        };

        tracing::info!("{} audio detected, converting to {}", from, INTERMEDIATE_AUDIO_EXTENSION);
        route_legacy_audio(container, &converter, self.runner.as_ref())
            .with_context(|| format!("Failed to convert audio of {:?}", container.source_path()))?;

        Ok(AudioRouting::Converted {
            from,
            to: INTERMEDIATE_AUDIO_EXTENSION.to_string(),
        })
    }

    fn join(&self, container: &MediaContainer, config: &JoinConfig) -> Result<PathBuf> {
        let output_dir = self.options.output_dir.as_deref();
        if let Some(dir) = output_dir {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create output directory {:?}", dir))?;
            }
        }

        let arguments = JoinArguments::build(container, &container.base_name(), output_dir, config);
        let ffmpeg = ffmpeg_path(&self.options.tools_dir).context("ffmpeg is required to join")?;

        tracing::debug!("{} {}", ffmpeg.display(), arguments);
        self.runner
            .run(&ffmpeg, &arguments.to_args())
            .with_context(|| format!("Failed to join {:?}", container.source_path()))?;

        Ok(arguments.output().to_path_buf())
    }
}
