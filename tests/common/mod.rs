//! Shared helpers for integration tests.
//!
//! Provides a [`FakeDemuxer`] that writes placeholder stream files, a
//! [`RecordingRunner`] that records tool invocations instead of spawning
//! processes, and fixture builders for tool directories, join configuration
//! and synthetic USM files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use parking_lot::Mutex;
use tempfile::TempDir;

use usmkit::pipeline::Demuxer;
use usmkit_av::runner::tool_name;
use usmkit_av::{MediaContainer, ProcessRunner};
use usmkit_demux::chunk::encode_chunk;
use usmkit_demux::{ChunkKind, PayloadType};

/// Demuxer that writes `<stem>.m2v` and optionally `<stem>.<audio>` next to
/// the input without reading it.
pub struct FakeDemuxer {
    audio: Option<&'static str>,
    failing: Vec<String>,
}

impl FakeDemuxer {
    pub fn new(audio: Option<&'static str>) -> Self {
        Self {
            audio,
            failing: Vec::new(),
        }
    }

    /// Fail for inputs with this file name
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.push(file_name.to_string());
        self
    }
}

impl Demuxer for FakeDemuxer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn demux(&self, path: &Path) -> Result<MediaContainer> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.failing.contains(&file_name) {
            anyhow::bail!("cannot demux {}", file_name);
        }

        std::fs::write(path.with_extension("m2v"), b"video")?;
        let container = MediaContainer::new(path, "m2v");

        Ok(match self.audio {
            Some(ext) => {
                std::fs::write(path.with_extension(ext), b"audio")?;
                container.with_audio(ext)
            }
            None => container,
        })
    }
}

/// One recorded tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Runner that records invocations.
///
/// A vgmstream call writes its `-o` target so the join sees the converted
/// file, mirroring the real tool.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Call>>,
    failing_tool: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a nonzero exit for every call to `tool`
    pub fn failing(tool: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_tool: Some(tool.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, tool: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.tool == tool)
            .cloned()
            .collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &Path, args: &[String]) -> usmkit_av::Result<()> {
        let tool = tool_name(program);
        self.calls.lock().push(Call {
            tool: tool.clone(),
            program: program.to_path_buf(),
            args: args.to_vec(),
        });

        if self.failing_tool.as_deref() == Some(tool.as_str()) {
            return Err(usmkit_av::Error::tool_failed(tool, "exited with exit status: 1"));
        }

        if tool == "vgmstream-cli" {
            if let Some(pos) = args.iter().position(|a| a == "-o") {
                if let Some(output) = args.get(pos + 1) {
                    std::fs::write(output, b"RIFF")?;
                }
            }
        }

        Ok(())
    }
}

/// Tools directory holding a placeholder ffmpeg and, optionally, a vgmstream
/// installation
pub fn tools_dir(with_vgmstream: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let exe = std::env::consts::EXE_SUFFIX;
    std::fs::write(dir.path().join(format!("ffmpeg{exe}")), b"").unwrap();

    if with_vgmstream {
        let vgmstream = dir.path().join("vgmstream");
        std::fs::create_dir(&vgmstream).unwrap();
        std::fs::write(vgmstream.join(format!("vgmstream-cli{exe}")), b"").unwrap();
    }

    dir
}

/// Write a join configuration file into `dir` and return its path
pub fn write_config(dir: &Path, video: &str, audio: &str, format: &str) -> PathBuf {
    let path = dir.join("config.json");
    let json = serde_json::json!({
        "VideoParameter": video,
        "AudioParameter": audio,
        "OutputFormat": format,
    });
    std::fs::write(&path, json.to_string()).unwrap();
    path
}

/// Bytes of a minimal USM file with one video chunk and, if given, one audio
/// chunk carrying `audio_payload`
pub fn usm_bytes(audio_payload: Option<&[u8]>) -> Vec<u8> {
    let mut bytes = encode_chunk(ChunkKind::Crid, 0, PayloadType::Header, b"@UTF", 0);
    bytes.extend(encode_chunk(
        ChunkKind::Video,
        0,
        PayloadType::Stream,
        &[0x00, 0x00, 0x01, 0xB3, 0x14, 0x00],
        0,
    ));
    if let Some(payload) = audio_payload {
        bytes.extend(encode_chunk(ChunkKind::Audio, 0, PayloadType::Stream, payload, 0));
    }
    bytes.extend(encode_chunk(
        ChunkKind::Video,
        0,
        PayloadType::SectionEnd,
        b"#CONTENTS END   ===============",
        0,
    ));
    bytes
}

/// ADX stream header bytes
pub const ADX_PAYLOAD: &[u8] = &[0x80, 0x00, 0x00, 0x24, 0x03, 0x12, 0x04, 0x02];

/// HCA stream header bytes
pub const HCA_PAYLOAD: &[u8] = &[b'H', b'C', b'A', 0x00, 0x02, 0x00, 0x00, 0x60];
