//! Path resolution rooted under the log directory
//!
//! Pure derivation: a date key (plus optional session number and artifact
//! kind) maps to exactly one normalized path. Anything that would escape
//! the root fails with `Error::PathSecurity` before touching the filesystem.

use std::path::{Component, Path, PathBuf};

use dailygym_core::{parse_date_key, Error, Result, DAY_FILE_EXT, RECORDING_EXT, TTS_SUFFIX};

/// Artifact kinds stored next to a day-file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioKind {
    /// The learner's own recording (`<date>-<session>.webm`)
    Recording,
    /// Synthesized speech for the session (`<date>-<session>-tts.mp3`)
    Tts,
}

impl AudioKind {
    /// Sidecar file name for a session. The two kinds never collide with
    /// each other or with the day-file.
    pub fn file_name(&self, date: &str, session_number: usize) -> String {
        match self {
            AudioKind::Recording => format!("{date}-{session_number}{RECORDING_EXT}"),
            AudioKind::Tts => format!("{date}-{session_number}{TTS_SUFFIX}"),
        }
    }
}

/// The fixed directory all log artifacts live under
#[derive(Debug, Clone)]
pub struct LogRoot {
    root: PathBuf,
}

impl LogRoot {
    /// Create a log root. Relative paths are anchored at the process
    /// working directory so the escape check has a stable base.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&root))
                .unwrap_or(root)
        };
        Self {
            root: normalize(&root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Month bucket directory for a validated date key (`YYYY-MM`)
    pub fn month_dir_for(&self, date: &str) -> Result<PathBuf> {
        parse_date_key(date)?;
        self.join_checked(&date[..7])
    }

    /// Month bucket directory from numeric year/month
    pub fn month_dir(&self, year: i32, month: u32) -> Result<PathBuf> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation("month", "Month must be between 1 and 12"));
        }
        if !(1..=9999).contains(&year) {
            return Err(Error::validation("year", "Year out of range"));
        }
        self.join_checked(&format!("{year:04}-{month:02}"))
    }

    /// Day-file path: `<root>/YYYY-MM/YYYY-MM-DD.md`
    pub fn day_file(&self, date: &str) -> Result<PathBuf> {
        parse_date_key(date)?;
        self.join_checked(&format!("{}/{date}{DAY_FILE_EXT}", &date[..7]))
    }

    /// Audio sidecar path for `(date, session, kind)`
    pub fn audio_file(&self, date: &str, session_number: usize, kind: AudioKind) -> Result<PathBuf> {
        parse_date_key(date)?;
        let name = kind.file_name(date, session_number);
        self.join_checked(&format!("{}/{name}", &date[..7]))
    }

    /// Join a relative path onto the root, normalize, and verify the result
    /// still lies inside the root.
    fn join_checked(&self, relative: &str) -> Result<PathBuf> {
        let candidate = normalize(&self.root.join(relative));
        if candidate.starts_with(&self.root) {
            Ok(candidate)
        } else {
            Err(Error::PathSecurity(candidate))
        }
    }
}

/// Lexical normalization: resolves `.` and `..` without touching the
/// filesystem, so non-existent paths can be checked too.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // Walked above the filesystem root; keep the component
                    // so the prefix check fails.
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}
