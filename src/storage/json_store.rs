use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{ParseMode, StoreConfig};
use crate::entity::{Note, NoteKey};
use crate::error::{CodenotesError, Result};
use crate::events::{ChangeBus, SubscriptionId};

/// Update payload for a note
#[derive(Debug, Default, Clone)]
pub struct NoteUpdate {
    pub content: Option<String>,
    pub color: Option<String>,
    pub title: Option<Option<String>>, // Some(None) to clear, Some(Some(s)) to set
}

/// A snapshot of the notes file taken by [`NoteStore::begin`].
///
/// Holds the parsed notes plus the exact bytes they came from, so that
/// [`NoteStore::commit`] can tell whether someone else wrote in between.
#[derive(Debug)]
pub struct Transaction {
    path: PathBuf,
    notes: Vec<Note>,
    base: Option<Vec<u8>>,
}

impl Transaction {
    pub fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }

    pub fn contains(&self, key: &NoteKey) -> bool {
        self.notes.iter().any(|n| n.matches(key))
    }

    fn position(&self, key: &NoteKey) -> Option<usize> {
        self.notes.iter().position(|n| n.matches(key))
    }
}

/// Note repository backed by a single JSON file.
///
/// Every mutation re-reads the file, applies the change and rewrites the
/// whole collection, then fires the change bus.
#[derive(Debug, Clone)]
pub struct NoteStore {
    config: StoreConfig,
    bus: ChangeBus,
}

impl NoteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            bus: ChangeBus::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn subscribe(&self, handler: impl Fn() + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    /// Location of the notes file
    pub fn notes_path(&self) -> Result<PathBuf> {
        self.config.notes_path().ok_or(CodenotesError::NoWorkspace)
    }

    /// Read the whole collection.
    ///
    /// A missing file is an empty collection. An unparsable file is an error
    /// in strict mode and an empty collection in lenient mode.
    pub fn load(&self) -> Result<Vec<Note>> {
        let path = self.notes_path()?;
        let bytes = read_raw(&path)?;
        match parse_notes(&path, bytes.as_deref()) {
            Ok(notes) => {
                tracing::debug!(path = %path.display(), count = notes.len(), "loaded notes");
                Ok(notes)
            }
            Err(CodenotesError::CorruptStore { path, source })
                if self.config.parse_mode == ParseMode::Lenient =>
            {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "notes file is unreadable, treating it as empty"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Get a note by key
    pub fn get(&self, key: &NoteKey) -> Result<Option<Note>> {
        Ok(self.load()?.into_iter().find(|n| n.matches(key)))
    }

    /// Replace the whole collection.
    ///
    /// Rejects the collection if any note has blank content or if two notes
    /// share a key; nothing is written in that case.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let path = self.notes_path()?;
        validate_collection(notes)?;
        write_atomic(&path, notes)?;
        tracing::debug!(path = %path.display(), count = notes.len(), "saved notes");
        self.bus.fire();
        Ok(())
    }

    /// Snapshot the current collection for a read-modify-write.
    ///
    /// Always parses strictly: a file that cannot be read must not be
    /// replaced by whatever the caller builds on top of an empty snapshot.
    pub fn begin(&self) -> Result<Transaction> {
        let path = self.notes_path()?;
        let base = read_raw(&path)?;
        let notes = parse_notes(&path, base.as_deref())?;
        Ok(Transaction { path, notes, base })
    }

    /// Write a transaction back and notify subscribers.
    pub fn commit(&self, tx: Transaction) -> Result<()> {
        if self.config.detect_conflicts {
            let current = read_raw(&tx.path)?;
            if current != tx.base {
                tracing::warn!(path = %tx.path.display(), "notes file changed during transaction");
                return Err(CodenotesError::Conflict { path: tx.path });
            }
        }

        write_atomic(&tx.path, &tx.notes)?;
        tracing::debug!(path = %tx.path.display(), count = tx.notes.len(), "committed notes");
        self.bus.fire();
        Ok(())
    }

    /// Add a note to the store
    pub fn add(&self, note: Note) -> Result<()> {
        validate_content(&note.content)?;

        let mut tx = self.begin()?;
        let key = note.key();
        if tx.contains(&key) {
            return Err(CodenotesError::DuplicateNote(key));
        }
        tx.notes.push(note);
        self.commit(tx)?;

        tracing::info!(key = %key, "added note");
        Ok(())
    }

    /// Create a note stamped with the current time and add it.
    ///
    /// If another note already owns the resulting key, `created` is advanced
    /// a millisecond at a time until the key is free.
    pub fn create(
        &self,
        file_path: impl Into<String>,
        line: u32,
        content: impl Into<String>,
        title: Option<String>,
        color: Option<String>,
    ) -> Result<Note> {
        let content = content.into();
        validate_content(&content)?;

        let mut note = Note::new(file_path, line, content);
        note.title = normalize_title(title);
        note.color = color.unwrap_or_else(|| self.config.default_color.clone());

        let mut tx = self.begin()?;
        while tx.contains(&note.key()) {
            note.bump_created();
        }
        tx.notes.push(note.clone());
        self.commit(tx)?;

        tracing::info!(key = %note.key(), "created note");
        Ok(note)
    }

    /// Update the mutable fields of an existing note
    pub fn edit(&self, key: &NoteKey, updates: NoteUpdate) -> Result<()> {
        if let Some(ref content) = updates.content {
            validate_content(content)?;
        }

        let mut tx = self.begin()?;
        let idx = tx
            .position(key)
            .ok_or_else(|| CodenotesError::NoteNotFound(key.clone()))?;
        let note = &mut tx.notes[idx];

        if let Some(content) = updates.content {
            note.content = content;
        }

        if let Some(color) = updates.color {
            note.color = color;
        }

        if let Some(title) = updates.title {
            note.title = normalize_title(title);
        }

        self.commit(tx)?;
        tracing::info!(key = %key, "edited note");
        Ok(())
    }

    /// Re-anchor a note to another line. Returns the note's new key.
    pub fn move_note(&self, key: &NoteKey, new_line: u32) -> Result<NoteKey> {
        let mut tx = self.begin()?;
        let idx = tx
            .position(key)
            .ok_or_else(|| CodenotesError::NoteNotFound(key.clone()))?;

        let moved = key.with_line(new_line);
        if let Some(other) = tx.position(&moved) {
            if other != idx {
                return Err(CodenotesError::DuplicateNote(moved));
            }
        }

        tx.notes[idx].line = new_line;
        self.commit(tx)?;

        tracing::info!(from = %key, to = new_line, "moved note");
        Ok(moved)
    }

    /// Delete a note by key. Deleting a note that is not there is not an
    /// error; nothing is written and nobody is notified.
    pub fn delete(&self, key: &NoteKey) -> Result<bool> {
        let mut tx = self.begin()?;
        let Some(idx) = tx.position(key) else {
            tracing::debug!(key = %key, "delete skipped, note not found");
            return Ok(false);
        };

        tx.notes.remove(idx);
        self.commit(tx)?;

        tracing::info!(key = %key, "deleted note");
        Ok(true)
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(CodenotesError::EmptyContent);
    }
    Ok(())
}

fn validate_collection(notes: &[Note]) -> Result<()> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        validate_content(&note.content)?;
        let key = note.key();
        if seen.contains(&key) {
            return Err(CodenotesError::DuplicateNote(key));
        }
        seen.insert(key);
    }
    Ok(())
}

fn normalize_title(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.trim().is_empty())
}

fn read_raw(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_notes(path: &Path, bytes: Option<&[u8]>) -> Result<Vec<Note>> {
    let Some(bytes) = bytes else {
        return Ok(Vec::new());
    };
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes).map_err(|source| CodenotesError::CorruptStore {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a sibling temp file and rename it into place, so a failed write
/// never leaves a truncated notes file behind.
fn write_atomic(path: &Path, notes: &[Note]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(notes)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
