use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::entity::{Note, NoteKey};

/// Two-level presentation of the notes: files, then their notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotesTree {
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub file_path: String,
    pub label: String,
    pub description: String,
    pub notes: Vec<NoteNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteNode {
    pub id: String,
    pub key: NoteKey,
    pub label: String,
    pub description: String,
    pub tooltip: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl NotesTree {
    /// Build from groups as produced by `search::group_by_file`.
    pub fn build(groups: BTreeMap<String, Vec<Note>>) -> Self {
        let files = groups
            .into_iter()
            .map(|(file_path, notes)| FileNode {
                label: basename(&file_path),
                description: note_count(notes.len()),
                notes: notes.iter().map(NoteNode::from).collect(),
                file_path,
            })
            .collect();
        Self { files }
    }

    pub fn note_count(&self) -> usize {
        self.files.iter().map(|f| f.notes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<&Note> for NoteNode {
    fn from(note: &Note) -> Self {
        let key = note.key();
        Self {
            id: key.to_string(),
            label: note.content.clone(),
            description: format!("#{}", note.line + 1),
            tooltip: format!("{}\n{}:{}", note.content, note.file_path, note.line + 1),
            color: note.color.clone(),
            title: note.title.clone(),
            key,
        }
    }
}

/// Label for picking a note from a flat list.
pub fn pick_label(note: &Note) -> String {
    format!(
        "{}:{} - {}",
        basename(&note.file_path),
        note.line + 1,
        note.content
    )
}

fn basename(file_path: &str) -> String {
    Path::new(file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string())
}

fn note_count(count: usize) -> String {
    format!("{} note{}", count, if count == 1 { "" } else { "s" })
}
