mod note;

pub use note::{format_created, Note, NoteKey, DEFAULT_COLOR};
