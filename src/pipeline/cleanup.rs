//! Removal of intermediate stream files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extensions of every stream file a conversion can leave next to its source
pub const INTERMEDIATE_EXTENSIONS: [&str; 4] = ["wav", "adx", "hca", "m2v"];

/// Files removed by [`remove_intermediates`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
}

/// Delete the intermediate stream files of `source`.
///
/// Files that do not exist are skipped. Other failures are logged and do not
/// stop the remaining deletions.
pub fn remove_intermediates(source: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();

    for ext in INTERMEDIATE_EXTENSIONS {
        let path = source.with_extension(ext);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                report.removed.push(path);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
        }
    }

    report
}
