//! Video database enumeration.
//!
//! The database is a directory tree, one entry per video:
//!
//! ```text
//! <root>/<group>/real/<stem>
//! <root>/<group>/attack/<support>/<stem>
//! <root>/<group>/enroll/<stem>
//! ```
//!
//! with groups `train`, `devel` and `test`, and attack supports `fixed`
//! (tripod-mounted replay device) and `hand` (hand-held). A leaf entry is
//! either a directory of frame images (the raw video stage) or a `.json`
//! series file (every later stage), so each pipeline stage opens the tree
//! it actually reads and fails fast on a missing or empty input.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database directory does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to read database directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database contains no video entries under {0}")]
    Empty(PathBuf),

    #[error("cannot parse a client id from entry name: {0}")]
    MalformedName(PathBuf),
}

/// Evaluation group a video belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Train,
    Devel,
    Test,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Train, Group::Devel, Group::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Train => "train",
            Group::Devel => "devel",
            Group::Test => "test",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a video is a genuine access, an attack, or enrollment footage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoClass {
    Real,
    Attack,
    Enroll,
}

impl VideoClass {
    pub const ALL: [VideoClass; 3] = [VideoClass::Real, VideoClass::Attack, VideoClass::Enroll];

    fn dir_name(&self) -> &'static str {
        match self {
            VideoClass::Real => "real",
            VideoClass::Attack => "attack",
            VideoClass::Enroll => "enroll",
        }
    }
}

/// Attack support: how the spoofing medium was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Fixed,
    Hand,
}

impl Support {
    fn dir_name(&self) -> &'static str {
        match self {
            Support::Fixed => "fixed",
            Support::Hand => "hand",
        }
    }
}

/// Which attack supports a query admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportFilter {
    Fixed,
    Hand,
    #[default]
    Both,
}

impl SupportFilter {
    fn admits(&self, support: Support) -> bool {
        match self {
            SupportFilter::Fixed => support == Support::Fixed,
            SupportFilter::Hand => support == Support::Hand,
            SupportFilter::Both => true,
        }
    }
}

impl FromStr for SupportFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(SupportFilter::Fixed),
            "hand" => Ok(SupportFilter::Hand),
            "hand+fixed" => Ok(SupportFilter::Both),
            other => Err(format!(
                "unknown support '{other}' (expected fixed, hand or hand+fixed)"
            )),
        }
    }
}

/// Attack-type protocol. Real and enrollment videos belong to every
/// protocol; attacks are matched by the medium token in their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Grandtest,
    Print,
    Mobile,
    Highdef,
    Photo,
    Video,
}

impl Protocol {
    fn token(&self) -> Option<&'static str> {
        match self {
            Protocol::Grandtest => None,
            Protocol::Print => Some("print"),
            Protocol::Mobile => Some("mobile"),
            Protocol::Highdef => Some("highdef"),
            Protocol::Photo => Some("photo"),
            Protocol::Video => Some("video"),
        }
    }

    fn admits(&self, entry: &VideoEntry) -> bool {
        if entry.class != VideoClass::Attack {
            return true;
        }
        match self.token() {
            None => true,
            Some(token) => entry.name().split('_').any(|t| t == token),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grandtest" => Ok(Protocol::Grandtest),
            "print" => Ok(Protocol::Print),
            "mobile" => Ok(Protocol::Mobile),
            "highdef" => Ok(Protocol::Highdef),
            "photo" => Ok(Protocol::Photo),
            "video" => Ok(Protocol::Video),
            other => Err(format!("unknown protocol '{other}'")),
        }
    }
}

/// One video in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    /// Path relative to the database root, extension stripped. Stable
    /// across pipeline stages: the same stem addresses the frame
    /// directory, the feature file, the score file and the count file.
    pub stem: PathBuf,
    pub group: Group,
    pub class: VideoClass,
    /// Present for attacks only.
    pub support: Option<Support>,
    pub client_id: u32,
}

impl VideoEntry {
    /// The entry's file name (last stem component).
    pub fn name(&self) -> &str {
        self.stem
            .file_name()
            .map(|n| n.to_str().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Resolve this entry under another stage's directory.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.stem)
    }

    /// Resolve this entry's series file under a stage directory.
    pub fn series_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.stem).with_extension("json")
    }
}

/// An enumerated database tree.
#[derive(Debug)]
pub struct Database {
    root: PathBuf,
    entries: Vec<VideoEntry>,
}

impl Database {
    /// Scan `root`, collecting every video entry. Fails when the root is
    /// missing, unreadable, holds no entries, or holds an entry whose
    /// name carries no client id.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DbError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DbError::MissingRoot(root));
        }

        let mut entries = Vec::new();
        for group in Group::ALL {
            let group_dir = root.join(group.as_str());
            if !group_dir.is_dir() {
                continue;
            }
            for class in VideoClass::ALL {
                let class_dir = group_dir.join(class.dir_name());
                if !class_dir.is_dir() {
                    continue;
                }
                if class == VideoClass::Attack {
                    for support in [Support::Fixed, Support::Hand] {
                        let support_dir = class_dir.join(support.dir_name());
                        if support_dir.is_dir() {
                            scan_leaves(
                                &root,
                                &support_dir,
                                group,
                                class,
                                Some(support),
                                &mut entries,
                            )?;
                        }
                    }
                } else {
                    scan_leaves(&root, &class_dir, group, class, None, &mut entries)?;
                }
            }
        }

        if entries.is_empty() {
            return Err(DbError::Empty(root));
        }
        entries.sort_by(|a, b| a.stem.cmp(&b.stem));

        tracing::info!(root = %root.display(), videos = entries.len(), "database opened");
        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn all(&self) -> &[VideoEntry] {
        &self.entries
    }

    /// Entries admitted by the given protocol, support, groups and classes.
    pub fn videos(
        &self,
        protocol: Protocol,
        support: SupportFilter,
        groups: &[Group],
        classes: &[VideoClass],
    ) -> Vec<&VideoEntry> {
        self.entries
            .iter()
            .filter(|e| groups.contains(&e.group))
            .filter(|e| classes.contains(&e.class))
            .filter(|e| match e.support {
                Some(s) => support.admits(s),
                None => true,
            })
            .filter(|e| protocol.admits(e))
            .collect()
    }
}

/// Collect the leaf entries of one class directory. A leaf is a frame
/// directory or a `.json` series file; anything else is ignored.
fn scan_leaves(
    root: &Path,
    dir: &Path,
    group: Group,
    class: VideoClass,
    support: Option<Support>,
    entries: &mut Vec<VideoEntry>,
) -> Result<(), DbError> {
    let read = std::fs::read_dir(dir).map_err(|source| DbError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    for item in read {
        let item = item.map_err(|source| DbError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = item.path();

        let is_series_file = path.is_file() && path.extension().is_some_and(|e| e == "json");
        if !path.is_dir() && !is_series_file {
            continue;
        }

        let stem = path
            .with_extension("")
            .strip_prefix(root)
            .expect("leaf paths live under the scanned root")
            .to_path_buf();
        let client_id =
            parse_client_id(&stem).ok_or_else(|| DbError::MalformedName(stem.clone()))?;

        entries.push(VideoEntry {
            stem,
            group,
            class,
            support,
            client_id,
        });
    }
    Ok(())
}

/// Extract NNN from the first `clientNNN` token of the entry name.
fn parse_client_id(stem: &Path) -> Option<u32> {
    let name = stem.file_name()?.to_str()?;
    name.split('_')
        .find_map(|token| token.strip_prefix("client"))
        .and_then(|digits| digits.parse().ok())
}
