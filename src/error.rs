use std::path::PathBuf;

use thiserror::Error;

use crate::entity::NoteKey;

#[derive(Error, Debug)]
pub enum CodenotesError {
    #[error("No workspace folder found.")]
    NoWorkspace,

    #[error("Notes file {} is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Note content cannot be empty")]
    EmptyContent,

    #[error("Note not found: {0}")]
    NoteNotFound(NoteKey),

    #[error("Note already exists: {0}")]
    DuplicateNote(NoteKey),

    #[error("Notes file {} changed since it was read", .path.display())]
    Conflict { path: PathBuf },

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CodenotesError>;
