//! Presentation models that stay in step with the store.
//!
//! A [`NotesView`] subscribes to the store's change bus and rebuilds its
//! state on every notification. Changes to its own context (filter query,
//! active document) go through the same bus, so the tree and the document
//! markers are always derived from one consistent read.

mod tree;

pub use tree::{pick_label, FileNode, NoteNode, NotesTree};

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::entity::{Note, NoteKey};
use crate::events::SubscriptionId;
use crate::position::{notes_for_document, summarize};
use crate::search;
use crate::storage::NoteStore;

/// Title shown on the inline marker of every note.
pub const MARKER_TITLE: &str = "Open Sticky Note";

/// The document the host currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub file_path: String,
    pub line_count: u32,
}

impl ActiveDocument {
    pub fn new(file_path: impl Into<String>, line_count: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line_count,
        }
    }
}

/// Inline marker for a note in the active document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMarker {
    pub key: NoteKey,
    pub display_line: u32,
    pub summary: String,
    pub title: &'static str,
    pub color: String,
}

/// Build markers for `doc`. Stale anchors are left out.
pub fn document_markers(notes: &[Note], doc: &ActiveDocument) -> Vec<DocumentMarker> {
    notes_for_document(notes, &doc.file_path, doc.line_count)
        .into_iter()
        .map(|placed| DocumentMarker {
            key: placed.note.key(),
            display_line: placed.display_line,
            summary: summarize(&placed.note.content),
            title: MARKER_TITLE,
            color: placed.note.color.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub query: String,
    pub active_document: Option<ActiveDocument>,
    pub tree: NotesTree,
    pub markers: Vec<DocumentMarker>,
    /// Message of the last failed refresh, cleared by the next good one.
    pub error: Option<String>,
    pub refreshes: u64,
}

struct ViewInner {
    store: NoteStore,
    state: RefCell<ViewState>,
}

impl ViewInner {
    fn refresh(&self) {
        let (query, doc) = {
            let state = self.state.borrow();
            (state.query.clone(), state.active_document.clone())
        };

        let loaded = self.store.load();
        let mut state = self.state.borrow_mut();
        state.refreshes += 1;
        match loaded {
            Ok(notes) => {
                state.markers = doc
                    .map(|doc| document_markers(&notes, &doc))
                    .unwrap_or_default();
                state.tree = NotesTree::build(search::group_by_file(search::filter(notes, &query)));
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "view refresh failed");
                state.tree = NotesTree::default();
                state.markers.clear();
                state.error = Some(e.to_string());
            }
        }
    }
}

/// Notes tree plus markers for the active document.
pub struct NotesView {
    inner: Rc<ViewInner>,
    subscription: SubscriptionId,
}

impl NotesView {
    pub fn new(store: NoteStore) -> Self {
        let inner = Rc::new(ViewInner {
            store,
            state: RefCell::new(ViewState::default()),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = inner.store.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.refresh();
            }
        });
        inner.refresh();

        Self {
            inner,
            subscription,
        }
    }

    /// Snapshot of the current state. Holding it never blocks a refresh.
    pub fn state(&self) -> ViewState {
        self.inner.state.borrow().clone()
    }

    pub fn store(&self) -> &NoteStore {
        &self.inner.store
    }

    pub fn set_filter(&self, query: impl Into<String>) {
        self.inner.state.borrow_mut().query = query.into();
        self.inner.store.bus().fire();
    }

    pub fn set_active_document(&self, doc: Option<ActiveDocument>) {
        self.inner.state.borrow_mut().active_document = doc;
        self.inner.store.bus().fire();
    }

    /// Resolve a note shown in this view by key.
    pub fn note(&self, key: &NoteKey) -> Option<NoteNode> {
        self.inner
            .state
            .borrow()
            .tree
            .files
            .iter()
            .flat_map(|f| f.notes.iter())
            .find(|n| &n.key == key)
            .cloned()
    }
}

impl Drop for NotesView {
    fn drop(&mut self) {
        self.inner.store.bus().unsubscribe(self.subscription);
    }
}
