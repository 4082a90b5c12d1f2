//! Query engine: filtering, sorting and grouping over a loaded collection.
//!
//! Nothing here touches the store. Every function takes the collection by
//! value and hands back a derived one.

use std::collections::BTreeMap;

use crate::entity::Note;

/// Keep notes matching `query`.
///
/// A note matches when its content or file path contains the trimmed query
/// (case-insensitive), or when its 1-based line number equals the query.
/// A blank query keeps everything.
///
/// # Examples
///
/// ```ignore
/// let hits = filter(notes, "TODO");   // content/path substring
/// let hits = filter(notes, "42");     // also every note on line 42
/// ```
pub fn filter(notes: Vec<Note>, query: &str) -> Vec<Note> {
    let query = query.trim();
    if query.is_empty() {
        return notes;
    }

    let needle = query.to_lowercase();
    notes
        .into_iter()
        .filter(|note| matches_query(note, query, &needle))
        .collect()
}

fn matches_query(note: &Note, query: &str, needle: &str) -> bool {
    note.content.to_lowercase().contains(needle)
        || note.file_path.to_lowercase().contains(needle)
        || (u64::from(note.line) + 1).to_string() == query
}

/// Stable sort by file path, then line.
pub fn sort_by_file_then_line(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.line.cmp(&b.line)));
    notes
}

/// Group notes per file. Files come out in path order; notes within a file
/// are ordered by line, keeping insertion order on ties.
pub fn group_by_file(notes: Vec<Note>) -> BTreeMap<String, Vec<Note>> {
    let mut groups: BTreeMap<String, Vec<Note>> = BTreeMap::new();
    for note in notes {
        groups.entry(note.file_path.clone()).or_default().push(note);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|n| n.line);
    }
    groups
}
