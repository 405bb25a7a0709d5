//! External tool detection and management.

use crate::audio::LegacyAudioConverter;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Run `program version_arg` and report it available if it exits successfully.
fn check_program(name: &str, program: &Path, version_arg: &str) -> ToolInfo {
    let result = Command::new(program).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = if program.components().count() > 1 {
                Some(program.to_path_buf())
            } else {
                which::which(program).ok()
            };

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools used by the conversion pipeline.
///
/// ffmpeg is resolved like [`ffmpeg_path`]. vgmstream prints usage and
/// exits nonzero without input, so it is reported available when its
/// executable exists in `<tools_dir>/vgmstream`.
pub fn check_tools(tools_dir: &Path) -> Vec<ToolInfo> {
    let ffmpeg = match ffmpeg_path(tools_dir) {
        Ok(path) => check_program("ffmpeg", &path, "-version"),
        Err(_) => ToolInfo {
            name: "ffmpeg".to_string(),
            available: false,
            version: None,
            path: None,
        },
    };

    let vgmstream = match LegacyAudioConverter::locate(tools_dir) {
        Ok(converter) => ToolInfo {
            name: "vgmstream".to_string(),
            available: true,
            version: None,
            path: Some(converter.executable().to_path_buf()),
        },
        Err(_) => ToolInfo {
            name: "vgmstream".to_string(),
            available: false,
            version: None,
            path: None,
        },
    };

    vec![ffmpeg, vgmstream]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}

/// Locate ffmpeg: `<tools_dir>/ffmpeg` if present, otherwise `ffmpeg` on PATH.
pub fn ffmpeg_path(tools_dir: &Path) -> Result<PathBuf> {
    let local = tools_dir.join(format!("ffmpeg{}", std::env::consts::EXE_SUFFIX));
    get_tool_path("ffmpeg", Some(&local))
}
