//! Keep/delete review of generated images as an explicit state machine.
//!
//! A front end feeds `ReviewAction`s into `ReviewSession::apply` and renders whatever
//! `current()` points at; animated previews are driven by an `AnimationClock` that the
//! front end advances from its own timer. Decisions persist to a versioned JSON ledger
//! so already reviewed files are not shown again.
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::io::source::collect_images;

/// Extensions offered for review; GIF pans included.
pub const REVIEW_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

pub const LEDGER_VERSION: u32 = 1;

/// Frame time used when an animation does not specify one.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(100);

fn ledger_version() -> u32 {
    LEDGER_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(default = "ledger_version")]
    version: u32,
    #[serde(default)]
    checked: BTreeSet<String>,
}

/// Older ledgers were a bare JSON array of paths.
#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    Versioned(LedgerRecord),
    Legacy(Vec<String>),
}

/// Set of files that already received a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedLedger {
    checked: BTreeSet<String>,
}

impl CheckedLedger {
    fn key(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let checked = match serde_json::from_str::<LedgerFile>(text)? {
            LedgerFile::Versioned(record) => {
                if record.version > LEDGER_VERSION {
                    warn!(
                        "Ledger version {} is newer than {}, reading known fields only",
                        record.version, LEDGER_VERSION
                    );
                }
                record.checked
            }
            LedgerFile::Legacy(paths) => paths.into_iter().collect(),
        };
        Ok(Self { checked })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&LedgerRecord {
            version: LEDGER_VERSION,
            checked: self.checked.clone(),
        })?)
    }

    /// A missing or unreadable ledger starts a fresh review.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No ledger at {:?}, starting fresh", path);
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|text| Self::from_json(&text))
        {
            Ok(ledger) => {
                info!("Loaded {} checked images from {:?}", ledger.len(), path);
                ledger
            }
            Err(e) => {
                warn!("Error loading ledger {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.checked.contains(&Self::key(path))
    }

    pub fn insert(&mut self, path: &Path) -> bool {
        self.checked.insert(Self::key(path))
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }
}

/// Reviewable images under `base_dir` that the ledger has not seen, sorted.
pub fn collect_pending(base_dir: &Path, ledger: &CheckedLedger) -> Vec<PathBuf> {
    let all = collect_images(base_dir, REVIEW_EXTENSIONS, true);
    let total = all.len();
    let pending: Vec<PathBuf> = all.into_iter().filter(|p| !ledger.contains(p)).collect();
    info!(
        "Found {} images, {} already checked, {} remaining",
        total,
        total - pending.len(),
        pending.len()
    );
    pending
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ReviewAction {
    Keep,
    Delete,
    /// The image could not be shown; record it and move on.
    Skip,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Kept,
    Deleted,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    Decided { path: PathBuf, decision: Decision },
    /// Every queued image has a decision.
    Finished,
}

/// Review progress: the queue, the cursor into it, and the persisted ledger.
#[derive(Debug)]
pub struct ReviewSession {
    queue: Vec<PathBuf>,
    cursor: usize,
    ledger: CheckedLedger,
    ledger_path: PathBuf,
}

impl ReviewSession {
    pub fn open(base_dir: &Path, ledger_path: &Path) -> Result<Self> {
        if !base_dir.is_dir() {
            return Err(Error::invalid_argument("base_dir", base_dir.display()));
        }
        let ledger = CheckedLedger::load(ledger_path);
        let queue = collect_pending(base_dir, &ledger);
        Ok(Self::with_queue(queue, ledger, ledger_path.to_path_buf()))
    }

    pub fn with_queue(queue: Vec<PathBuf>, ledger: CheckedLedger, ledger_path: PathBuf) -> Self {
        Self {
            queue,
            cursor: 0,
            ledger,
            ledger_path,
        }
    }

    pub fn current(&self) -> Option<&Path> {
        self.queue.get(self.cursor).map(PathBuf::as_path)
    }

    /// `(position, total)`, 1-based, for a counter display.
    pub fn progress(&self) -> (usize, usize) {
        ((self.cursor + 1).min(self.queue.len()), self.queue.len())
    }

    pub fn remaining(&self) -> usize {
        self.queue.len() - self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn ledger(&self) -> &CheckedLedger {
        &self.ledger
    }

    /// Applies a decision to the current image and advances.
    /// A failed delete leaves the cursor where it was.
    pub fn apply(&mut self, action: ReviewAction) -> Result<ReviewEvent> {
        let Some(path) = self.queue.get(self.cursor).cloned() else {
            return Ok(ReviewEvent::Finished);
        };

        let decision = match action {
            ReviewAction::Keep => {
                info!("Kept: {:?}", path);
                Decision::Kept
            }
            ReviewAction::Delete => {
                fs::remove_file(&path)?;
                info!("Deleted: {:?}", path);
                Decision::Deleted
            }
            ReviewAction::Skip => {
                warn!("Skipped unreadable image: {:?}", path);
                Decision::Skipped
            }
        };

        self.ledger.insert(&path);
        self.ledger.save(&self.ledger_path)?;
        self.cursor += 1;
        Ok(ReviewEvent::Decided { path, decision })
    }

    pub fn keep(&mut self) -> Result<ReviewEvent> {
        self.apply(ReviewAction::Keep)
    }

    /// Removes the current image from disk.
    pub fn delete(&mut self) -> Result<ReviewEvent> {
        self.apply(ReviewAction::Delete)
    }

    pub fn skip(&mut self) -> Result<ReviewEvent> {
        self.apply(ReviewAction::Skip)
    }
}

/// Timer-driven frame cursor for animated previews.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    durations: Vec<Duration>,
    current: usize,
    elapsed: Duration,
}

impl AnimationClock {
    /// Missing or zero durations fall back to `DEFAULT_FRAME_DURATION`.
    pub fn new<I>(durations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<Duration>>,
    {
        let durations: Vec<Duration> = durations
            .into_iter()
            .map(|d| match d {
                Some(d) if !d.is_zero() => d,
                _ => DEFAULT_FRAME_DURATION,
            })
            .collect();
        if durations.is_empty() {
            return Err(Error::InvalidFrameCount { frames: 0 });
        }
        Ok(Self {
            durations,
            current: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.durations.len()
    }

    pub fn is_animated(&self) -> bool {
        self.durations.len() > 1
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Time left before the next frame should be shown.
    pub fn time_to_next_frame(&self) -> Duration {
        self.durations[self.current].saturating_sub(self.elapsed)
    }

    /// Moves time forward, wrapping past the last frame. Returns the frame to show.
    pub fn advance(&mut self, delta: Duration) -> usize {
        if !self.is_animated() {
            return self.current;
        }
        self.elapsed += delta;
        while self.elapsed >= self.durations[self.current] {
            self.elapsed -= self.durations[self.current];
            self.current = (self.current + 1) % self.durations.len();
        }
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn ledger_reads_legacy_array_and_versioned_record() {
        let legacy = CheckedLedger::from_json(r#"["/a.png", "/b.gif"]"#).unwrap();
        assert_eq!(legacy.len(), 2);
        assert!(legacy.contains(Path::new("/a.png")));

        let versioned = CheckedLedger::from_json(
            r#"{ "version": 1, "checked": ["/a.png"], "reviewer": "someone" }"#,
        )
        .unwrap();
        assert!(versioned.contains(Path::new("/a.png")));

        let future = CheckedLedger::from_json(r#"{ "version": 7, "checked": ["/c.jpg"] }"#);
        assert!(future.unwrap().contains(Path::new("/c.jpg")));

        assert!(CheckedLedger::from_json("42").is_err());
    }

    #[test]
    fn ledger_writes_versioned_record() {
        let mut ledger = CheckedLedger::default();
        ledger.insert(Path::new("/x.png"));
        let value: serde_json::Value = serde_json::from_str(&ledger.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["checked"][0], "/x.png");
    }

    #[test]
    fn corrupt_ledger_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checked.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(CheckedLedger::load(&path).is_empty());
        assert!(CheckedLedger::load(&dir.path().join("missing.json")).is_empty());
    }

    #[test]
    fn session_walks_queue_and_persists_decisions() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir_all(images.join("nested")).unwrap();
        for name in ["a.png", "b.jpg", "nested/c.gif", "notes.txt"] {
            fs::write(images.join(name), b"x").unwrap();
        }
        let ledger_path = dir.path().join("checked.json");

        let mut session = ReviewSession::open(&images, &ledger_path).unwrap();
        assert_eq!(session.progress(), (1, 3));
        assert_eq!(session.current(), Some(images.join("a.png").as_path()));

        let event = session.apply(ReviewAction::Keep).unwrap();
        assert_eq!(
            event,
            ReviewEvent::Decided {
                path: images.join("a.png"),
                decision: Decision::Kept
            }
        );

        session.apply(ReviewAction::Delete).unwrap();
        assert!(!images.join("b.jpg").exists());
        assert_eq!(session.remaining(), 1);

        // A fresh session only sees what is left.
        let reopened = ReviewSession::open(&images, &ledger_path).unwrap();
        assert_eq!(reopened.progress(), (1, 1));
        assert_eq!(
            reopened.current(),
            Some(images.join("nested").join("c.gif").as_path())
        );

        session.apply(ReviewAction::Skip).unwrap();
        assert!(session.is_complete());
        assert_eq!(session.apply(ReviewAction::Keep).unwrap(), ReviewEvent::Finished);
        assert_eq!(CheckedLedger::load(&ledger_path).len(), 3);
    }

    #[test]
    fn failed_delete_keeps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("checked.json");
        let mut session = ReviewSession::with_queue(
            vec![dir.path().join("gone.png")],
            CheckedLedger::default(),
            ledger_path,
        );
        assert!(session.apply(ReviewAction::Delete).is_err());
        assert_eq!(session.remaining(), 1);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn clock_advances_and_wraps() {
        let mut clock = AnimationClock::new([Some(ms(300)), None, Some(ms(50))]).unwrap();
        assert!(clock.is_animated());
        assert_eq!(clock.time_to_next_frame(), ms(300));
        assert_eq!(clock.advance(ms(299)), 0);
        assert_eq!(clock.advance(ms(1)), 1);
        // Frame 1 fell back to the default duration.
        assert_eq!(clock.time_to_next_frame(), ms(100));
        assert_eq!(clock.advance(ms(140)), 2);
        assert_eq!(clock.time_to_next_frame(), ms(10));
        assert_eq!(clock.advance(ms(9)), 2);
        assert_eq!(clock.advance(ms(1)), 0);
        clock.reset();
        assert_eq!(clock.current(), 0);
    }

    #[test]
    fn still_image_clock_never_moves() {
        let mut clock = AnimationClock::new([Some(ms(10))]).unwrap();
        assert!(!clock.is_animated());
        assert_eq!(clock.advance(ms(1000)), 0);
        assert!(AnimationClock::new(Vec::new()).is_err());
    }
}
