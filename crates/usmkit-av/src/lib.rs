//! # usmkit-av
//!
//! External tool plumbing for converting demultiplexed USM streams.
//!
//! This crate provides:
//! - [`MediaContainer`]: the elementary streams produced for one input file
//! - [`JoinArguments`]: the ffmpeg arguments that join those streams
//! - [`LegacyAudioConverter`]: ADX → WAV conversion through vgmstream
//! - [`ProcessRunner`]: synchronous execution of the external tools
//! - tool lookup for ffmpeg and vgmstream
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use usmkit_av::{ffmpeg_path, JoinArguments, JoinConfig, MediaContainer, ProcessRunner, SystemRunner};
//!
//! let container = MediaContainer::new("clip.usm", "m2v").with_audio("hca");
//! let config = JoinConfig::new("-c:v libx264", "-c:a aac", "mp4");
//! let args = JoinArguments::build(&container, "clip", None, &config);
//!
//! let ffmpeg = ffmpeg_path(Path::new("."))?;
//! SystemRunner.run(&ffmpeg, &args.to_args())?;
//! # Ok::<(), usmkit_av::Error>(())
//! ```

pub mod audio;
mod container;
mod error;
pub mod join;
pub mod runner;
pub mod tools;

// Re-exports
pub use audio::{route_legacy_audio, AudioFormat, LegacyAudioConverter};
pub use container::MediaContainer;
pub use error::{Error, Result};
pub use join::{JoinArguments, JoinConfig};
pub use runner::{ProcessRunner, SystemRunner};
pub use tools::{check_tools, ffmpeg_path, require_tool, ToolInfo};
