//! Store configuration.
//!
//! A workspace may carry a `.codenotes.yaml` next to its notes. Every key is
//! optional; missing keys fall back to [`StoreConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::DEFAULT_COLOR;
use crate::error::Result;

pub const CONFIG_FILE: &str = ".codenotes.yaml";
pub const DEFAULT_NOTES_FILE: &str = ".vscode/notes.json";

/// How the store treats a notes file it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Reads fail with `CorruptStore`.
    #[default]
    Strict,
    /// Reads log a warning and see an empty collection. Writes still refuse
    /// to replace the unreadable file.
    Lenient,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Strict => write!(f, "strict"),
            ParseMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl std::str::FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ParseMode::Strict),
            "lenient" => Ok(ParseMode::Lenient),
            _ => Err(format!("Invalid parse mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Workspace root. `None` means no workspace is open.
    #[serde(skip)]
    pub root: Option<PathBuf>,
    /// Notes file, relative to `root` unless absolute.
    pub notes_file: PathBuf,
    pub parse_mode: ParseMode,
    /// Reject a commit when the notes file changed after it was read.
    pub detect_conflicts: bool,
    pub default_color: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            parse_mode: ParseMode::Strict,
            detect_conflicts: false,
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Configuration for `root`, overlaid with `<root>/.codenotes.yaml` when present.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&raw)?
            }
        } else {
            Self::default()
        };
        config.root = Some(root.to_path_buf());
        Ok(config)
    }

    /// Absolute location of the notes file, if a workspace is configured.
    pub fn notes_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(&self.notes_file))
    }
}
