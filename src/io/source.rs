//! Master-image loading and image discovery on disk.
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::types::SourceImage;

/// Extensions accepted as master images.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Decodes any supported image file into an RGBA8 `SourceImage`.
pub fn load_source(path: &Path) -> Result<SourceImage> {
    let decoded = image::open(path)?.to_rgba8();
    info!(
        "Loaded {:?} ({}x{})",
        path,
        decoded.width(),
        decoded.height()
    );
    SourceImage::from_rgba_image(decoded)
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Sorted list of files under `dir` with one of `extensions`.
/// Unreadable entries are logged and skipped.
pub fn collect_images(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir).min_depth(1);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut paths: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_extension(p, extensions))
        .collect();
    paths.sort();
    paths
}
