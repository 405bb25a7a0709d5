//! Dependency provisioner
//!
//! Downloads the ffmpeg and vgmstream bundles named in the dependency
//! manifest and unpacks them into the tools directory:
//!
//! - `<dest>/ffmpeg` (`ffmpeg.exe` on Windows), the only entry taken from the
//!   ffmpeg archive
//! - `<dest>/vgmstream/`, the whole vgmstream archive

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const FFMPEG_ARCHIVE: &str = "ffmpeg.zip";
const VGMSTREAM_ARCHIVE: &str = "vgmstream.zip";

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to extract {archive}: {reason}")]
    Extract { archive: PathBuf, reason: String },

    #[error("{archive} has no entry named {entry}")]
    MissingEntry { archive: PathBuf, entry: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Download locations of the external tools
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyManifest {
    #[serde(rename = "FFmpeg", alias = "Ffmpeg")]
    pub ffmpeg: String,

    #[serde(rename = "Vgmstream")]
    pub vgmstream: String,
}

impl DependencyManifest {
    /// Load the manifest from a JSON file.
    ///
    /// A missing file is reported as [`crate::Error::FileNotFound`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        if !path.exists() {
            return Err(crate::Error::file_not_found(path).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;

        serde_json::from_str(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
    }
}

/// Files produced by [`provision`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub ffmpeg: PathBuf,
    pub vgmstream_dir: PathBuf,
    /// Number of files unpacked into `vgmstream_dir`
    pub vgmstream_files: usize,
}

/// Fetch and unpack both tool bundles into `dest_dir`.
///
/// Existing files are overwritten. Both archives are deleted afterwards.
pub async fn provision(
    manifest: &DependencyManifest,
    dest_dir: &Path,
) -> Result<ProvisionReport, ProvisionError> {
    fs::create_dir_all(dest_dir)?;
    let client = reqwest::Client::new();

    info!("Downloading ffmpeg from {}", manifest.ffmpeg);
    let ffmpeg_archive = dest_dir.join(FFMPEG_ARCHIVE);
    download(&client, &manifest.ffmpeg, &ffmpeg_archive).await?;

    info!("Extracting ffmpeg...");
    let ffmpeg_name = format!("ffmpeg{}", std::env::consts::EXE_SUFFIX);
    let ffmpeg = dest_dir.join(&ffmpeg_name);
    let extracted = extract_entry(&ffmpeg_archive, &ffmpeg_name, &ffmpeg);
    fs::remove_file(&ffmpeg_archive).ok();
    extracted?;

    info!("Downloading vgmstream from {}", manifest.vgmstream);
    let vgmstream_archive = dest_dir.join(VGMSTREAM_ARCHIVE);
    download(&client, &manifest.vgmstream, &vgmstream_archive).await?;

    info!("Extracting vgmstream...");
    let vgmstream_dir = dest_dir.join(usmkit_av::audio::VGMSTREAM_DIR);
    let extracted = extract_all(&vgmstream_archive, &vgmstream_dir);
    fs::remove_file(&vgmstream_archive).ok();
    let vgmstream_files = extracted?;

    info!("Done");
    Ok(ProvisionReport {
        ffmpeg,
        vgmstream_dir,
        vgmstream_files,
    })
}

/// Download `url` to `dest`. A partially written file is removed on failure.
async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64, ProvisionError> {
    let result = write_download(client, url, dest).await;
    if result.is_err() {
        fs::remove_file(dest).ok();
    }
    result
}

async fn write_download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, ProvisionError> {
    use futures::StreamExt;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ProvisionError::Download {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let mut file = fs::File::create(dest)?;
    let mut downloaded: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
    }
    file.flush()?;

    debug!("Downloaded {} bytes to {:?}", downloaded, dest);
    Ok(downloaded)
}

/// Extract the first file whose name (ignoring directories) is `name`.
fn extract_entry(archive_path: &Path, name: &str, dest: &Path) -> Result<(), ProvisionError> {
    let mut archive = zip::ZipArchive::new(fs::File::open(archive_path)?)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let matches = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n == name))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let mut out = fs::File::create(dest)?;
        io::copy(&mut entry, &mut out)?;
        set_executable(dest, entry.unix_mode().unwrap_or(0o755))?;
        return Ok(());
    }

    Err(ProvisionError::MissingEntry {
        archive: archive_path.to_path_buf(),
        entry: name.to_string(),
    })
}

/// Extract every entry of the archive under `dest_dir`. Returns the number
/// of files written.
fn extract_all(archive_path: &Path, dest_dir: &Path) -> Result<usize, ProvisionError> {
    let mut archive = zip::ZipArchive::new(fs::File::open(archive_path)?)?;
    fs::create_dir_all(dest_dir)?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive entry {:?}", entry.name());
            continue;
        };
        let target = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target).map_err(|e| ProvisionError::Extract {
            archive: archive_path.to_path_buf(),
            reason: format!("{}: {}", target.display(), e),
        })?;
        io::copy(&mut entry, &mut out)?;

        if let Some(mode) = entry.unix_mode() {
            set_executable(&target, mode)?;
        }
        written += 1;
    }

    Ok(written)
}

#[cfg(unix)]
fn set_executable(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    // Keep the permission bits and make sure the owner can run it.
    let mode = (mode & 0o777) | 0o700;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
