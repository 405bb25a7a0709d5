pub use usmkit_av::JoinConfig;

use anyhow::{Context, Result};
use std::path::Path;

/// Join configuration file name, resolved against the current directory by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Dependency manifest file name, resolved against the current directory by the CLI
pub const DEFAULT_MANIFEST_FILE: &str = "deps.json";

/// Load the join configuration from a JSON file
pub fn load_join_config(path: &Path) -> Result<JoinConfig> {
    if !path.exists() {
        anyhow::bail!("{} not found", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    JoinConfig::from_json(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_join_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "VideoParameter": "-c:v libx264 -crf 18",
                "AudioParameter": "-c:a aac -b:a 192k",
                "OutputFormat": "mp4"
            }"#,
        )
        .unwrap();

        let config = load_join_config(&path).unwrap();
        assert_eq!(config.video_parameter, "-c:v libx264 -crf 18");
        assert_eq!(config.audio_parameter, "-c:a aac -b:a 192k");
        assert_eq!(config.output_format, "mp4");
    }

    #[test]
    fn test_missing_config() {
        let dir = tempdir().unwrap();
        let err = load_join_config(&dir.path().join("config.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_join_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_empty_output_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"VideoParameter": "-c:v copy", "OutputFormat": ""}"#).unwrap();

        let err = load_join_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("OutputFormat"));
    }
}
