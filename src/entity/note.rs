use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Color given to notes that were persisted without one.
pub const DEFAULT_COLOR: &str = "#FFD600";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Render a timestamp the way notes record `created`: UTC, millisecond precision.
pub fn format_created(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A sticky note anchored to one line of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(alias = "file")]
    pub file_path: String,
    pub line: u32,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub created: String,
    /// Fields written by other tools; carried through rewrites untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Note {
    pub fn new(file_path: impl Into<String>, line: u32, content: impl Into<String>) -> Self {
        Self::with_created(file_path, line, content, format_created(Utc::now()))
    }

    pub fn with_created(
        file_path: impl Into<String>,
        line: u32,
        content: impl Into<String>,
        created: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            content: content.into(),
            title: None,
            color: default_color(),
            created: created.into(),
            extra: Map::new(),
        }
    }

    pub fn key(&self) -> NoteKey {
        NoteKey {
            file_path: self.file_path.clone(),
            line: self.line,
            created: self.created.clone(),
        }
    }

    pub fn matches(&self, key: &NoteKey) -> bool {
        self.line == key.line && self.file_path == key.file_path && self.created == key.created
    }

    /// Parsed creation time, if `created` holds a valid RFC 3339 timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Move `created` one millisecond forward. Used to keep keys unique when
    /// two notes land on the same line within the same millisecond.
    pub(crate) fn bump_created(&mut self) {
        let at = self.created_at().unwrap_or_else(Utc::now);
        self.created = format_created(at + Duration::milliseconds(1));
    }
}

/// Identity of a note: `(file_path, line, created)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteKey {
    pub file_path: String,
    pub line: u32,
    pub created: String,
}

impl NoteKey {
    pub fn new(file_path: impl Into<String>, line: u32, created: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            created: created.into(),
        }
    }

    /// The key the same note has after being moved to `line`.
    pub fn with_line(&self, line: u32) -> Self {
        Self {
            line,
            ..self.clone()
        }
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.created)
    }
}
