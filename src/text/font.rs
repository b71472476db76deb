use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    File(PathBuf),
    /// No candidate file exists.
    Unavailable,
}

impl FontChoice {
    pub fn load(&self, family: &str) -> Result<FontVec> {
        match self {
            FontChoice::File(path) => load_font(path),
            FontChoice::Unavailable => Err(Error::MissingFont {
                family: family.to_string(),
            }),
        }
    }
}

pub trait FontResolver {
    fn resolve(&self, family: &str) -> FontChoice;
}

/// Tries candidate paths in order; the first existing file wins.
#[derive(Debug, Clone)]
pub struct CandidateFontResolver {
    candidates: Vec<PathBuf>,
}

impl CandidateFontResolver {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Common locations of the fonts the ad templates use, across platforms.
    pub fn system_default() -> Self {
        Self::new(
            [
                "/usr/share/fonts/truetype/msttcorefonts/Comic_Sans_MS.ttf",
                "/System/Library/Fonts/Supplemental/Comic Sans MS.ttf",
                "C:\\Windows\\Fonts\\comic.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/Library/Fonts/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
        )
    }

    /// `path` alone when given, otherwise the platform defaults.
    pub fn with_override(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::new(vec![path.to_path_buf()]),
            None => Self::system_default(),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl FontResolver for CandidateFontResolver {
    fn resolve(&self, family: &str) -> FontChoice {
        match self.candidates.iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!("Font {:?} resolved to {:?}", family, path);
                FontChoice::File(path.clone())
            }
            None => {
                warn!("No font file found for {:?}", family);
                FontChoice::Unavailable
            }
        }
    }
}

/// Reads a .ttf/.otf file, or the first face of a .ttc collection.
pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path)?;
    FontVec::try_from_vec_and_index(bytes, 0).map_err(|_| Error::InvalidFont {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_takes_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second.ttf");
        let third = dir.path().join("third.ttf");
        fs::write(&second, b"font").unwrap();
        fs::write(&third, b"font").unwrap();

        let resolver =
            CandidateFontResolver::new(vec![dir.path().join("missing.ttf"), second.clone(), third]);
        assert_eq!(resolver.resolve("Comic Sans"), FontChoice::File(second));

        let empty = CandidateFontResolver::new(vec![dir.path().join("none.ttf")]);
        assert_eq!(empty.resolve("Arial"), FontChoice::Unavailable);
        assert!(matches!(
            empty.resolve("Arial").load("Arial"),
            Err(Error::MissingFont { .. })
        ));
        assert!(!CandidateFontResolver::system_default().candidates().is_empty());
    }

    #[test]
    fn override_replaces_defaults() {
        let custom = PathBuf::from("/fonts/brand.otf");
        let resolver = CandidateFontResolver::with_override(Some(custom.as_path()));
        assert_eq!(resolver.candidates(), &[custom]);
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(load_font(&path), Err(Error::InvalidFont { .. })));
    }
}
