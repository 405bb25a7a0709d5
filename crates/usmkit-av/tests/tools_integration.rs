//! Integration tests running stand-in tool scripts through the system runner

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use usmkit_av::{
    check_tools, ffmpeg_path, route_legacy_audio, JoinArguments, JoinConfig,
    LegacyAudioConverter, MediaContainer, ProcessRunner, SystemRunner,
};

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Tools directory whose vgmstream copies its input and whose ffmpeg writes
/// its argument list to the output path
fn fake_tools(dir: &Path) -> PathBuf {
    let tools = dir.join("tools");
    std::fs::create_dir_all(tools.join("vgmstream")).unwrap();
    write_script(&tools.join("vgmstream/vgmstream-cli"), r#"cp "$1" "$3""#);
    write_script(
        &tools.join("ffmpeg"),
        r#"[ $# -gt 1 ] || exit 0; for last; do :; done; printf '%s\n' "$@" > "$last""#,
    );
    tools
}

#[test]
fn test_adx_conversion_and_join() {
    let dir = tempdir().unwrap();
    let tools = fake_tools(dir.path());
    let source = dir.path().join("event 01.usm");
    std::fs::write(dir.path().join("event 01.m2v"), b"video").unwrap();
    std::fs::write(dir.path().join("event 01.adx"), b"adx-audio").unwrap();

    let mut container = MediaContainer::new(&source, "m2v").with_audio("adx");
    let converter = LegacyAudioConverter::locate(&tools).unwrap();

    assert!(route_legacy_audio(&mut container, &converter, &SystemRunner).unwrap());
    assert_eq!(container.final_audio_extension(), Some("wav"));
    assert_eq!(
        std::fs::read(dir.path().join("event 01.wav")).unwrap(),
        b"adx-audio"
    );

    let config = JoinConfig::new("-c:v libx264 -vf \"scale=1280:-2\"", "-c:a aac", "mp4");
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();
    let args = JoinArguments::build(&container, &container.base_name(), Some(&out_dir), &config);

    let ffmpeg = ffmpeg_path(&tools).unwrap();
    SystemRunner.run(&ffmpeg, &args.to_args()).unwrap();

    let recorded = std::fs::read_to_string(out_dir.join("event 01.mp4")).unwrap();
    let lines: Vec<_> = recorded.lines().collect();
    assert_eq!(lines[1], dir.path().join("event 01.m2v").display().to_string());
    assert_eq!(lines[3], dir.path().join("event 01.wav").display().to_string());
    assert!(lines.contains(&"scale=1280:-2"));
}

#[test]
fn test_failing_tool_is_reported() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("broken");
    write_script(&script, "exit 3");

    let err = SystemRunner.run(&script, &[]).unwrap_err();
    assert!(err.to_string().contains("broken"));
    assert!(!err.is_tool_not_found());
}

#[test]
fn test_check_tools_reports_local_installation() {
    let dir = tempdir().unwrap();
    let tools = fake_tools(dir.path());

    let report = check_tools(&tools);
    let vgmstream = report.iter().find(|t| t.name == "vgmstream").unwrap();
    assert!(vgmstream.available);
    assert_eq!(
        vgmstream.path.as_deref(),
        Some(tools.join("vgmstream/vgmstream-cli").as_path())
    );
}
