pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod position;
pub mod search;
pub mod storage;
pub mod view;
pub mod warnings;

pub use config::{ParseMode, StoreConfig};
pub use entity::{Note, NoteKey};
pub use error::{CodenotesError, Result};
pub use events::{ChangeBus, SubscriptionId};
pub use storage::{NoteStore, NoteUpdate};
pub use view::NotesView;
