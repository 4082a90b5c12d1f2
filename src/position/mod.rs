//! Maps notes onto an open document.
//!
//! Anchors are absolute line numbers. A note whose line lies past the end of
//! the document is a stale anchor: it is hidden from the document view but
//! stays in the store untouched.

use serde::Serialize;

use crate::entity::{Note, NoteKey};

/// Marker appended to a summary when the note has more lines.
pub const ELLIPSIS: &str = "…";

/// A note placed in a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentNote<'a> {
    pub note: &'a Note,
    pub display_line: u32,
}

/// Where a host should put the cursor to reveal a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealTarget {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

/// Notes anchored inside a document of `line_count` lines, in collection order.
pub fn notes_for_document<'a>(
    notes: &'a [Note],
    file_path: &str,
    line_count: u32,
) -> Vec<DocumentNote<'a>> {
    notes
        .iter()
        .filter(|n| n.file_path == file_path && n.line < line_count)
        .map(|note| DocumentNote {
            note,
            display_line: note.line,
        })
        .collect()
}

/// Notes of `file_path` whose anchor lies at or past `line_count`.
pub fn stale_anchors<'a>(notes: &'a [Note], file_path: &str, line_count: u32) -> Vec<&'a Note> {
    notes
        .iter()
        .filter(|n| n.file_path == file_path && n.line >= line_count)
        .collect()
}

/// First line of `content`, with [`ELLIPSIS`] appended if anything follows it.
pub fn summarize(content: &str) -> String {
    let mut lines = content.lines();
    let first = lines.next().unwrap_or_default();
    if lines.next().is_some() {
        format!("{}{}", first, ELLIPSIS)
    } else {
        first.to_string()
    }
}

/// Resolve a note by its full key. Views may be filtered or reordered, so
/// positions in them are never used as identity.
pub fn find_by_key<'a>(notes: &'a [Note], key: &NoteKey) -> Option<&'a Note> {
    notes.iter().find(|n| n.matches(key))
}

pub fn reveal_target(note: &Note) -> RevealTarget {
    RevealTarget {
        file_path: note.file_path.clone(),
        line: note.line,
        column: 0,
    }
}
