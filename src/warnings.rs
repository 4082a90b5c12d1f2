//! Advisory warnings about the note collection.
//!
//! Nothing here changes state; callers decide whether to show the warnings.

use crate::entity::Note;
use crate::position::stale_anchors;

/// Collections above this size still work but every refresh re-reads the
/// whole file.
pub const COLLECTION_WARNING_THRESHOLD: usize = 1000;

/// A warning about a note or the collection as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A note is anchored past the end of its file.
    StaleAnchor {
        file_path: String,
        line: u32,
        line_count: u32,
    },
    /// Note count exceeds recommended threshold.
    LargeCollection { count: usize, threshold: usize },
}

/// Check a document of `line_count` lines for notes it can no longer show.
pub fn check_document(notes: &[Note], file_path: &str, line_count: u32) -> Vec<Warning> {
    stale_anchors(notes, file_path, line_count)
        .into_iter()
        .map(|n| Warning::StaleAnchor {
            file_path: n.file_path.clone(),
            line: n.line,
            line_count,
        })
        .collect()
}

/// Check collection-wide thresholds.
pub fn check_collection(notes: &[Note]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if notes.len() > COLLECTION_WARNING_THRESHOLD {
        warnings.push(Warning::LargeCollection {
            count: notes.len(),
            threshold: COLLECTION_WARNING_THRESHOLD,
        });
    }

    warnings
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::StaleAnchor {
            file_path,
            line,
            line_count,
        } => {
            format!(
                "Warning: note at {}:{} is past the end of the file ({} lines) and is hidden",
                file_path,
                line + 1,
                line_count
            )
        }
        Warning::LargeCollection { count, threshold } => {
            format!(
                "Warning: {} notes exceeds recommended {} - refreshes may slow down",
                count, threshold
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(count: usize) -> Vec<Note> {
        (0..count)
            .map(|i| Note::with_created("/a.rs", i as u32, "x", "2025-01-01T00:00:00.000Z"))
            .collect()
    }

    #[test]
    fn test_no_warnings_under_threshold() {
        assert!(check_collection(&notes(10)).is_empty());
    }

    #[test]
    fn test_large_collection_warning() {
        let warnings = check_collection(&notes(COLLECTION_WARNING_THRESHOLD + 1));
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            Warning::LargeCollection { count, threshold } => {
                assert_eq!(*count, 1001);
                assert_eq!(*threshold, COLLECTION_WARNING_THRESHOLD);
            }
            _ => panic!("Expected LargeCollection warning"),
        }
    }

    #[test]
    fn test_stale_anchor_warnings() {
        let warnings = check_document(&notes(5), "/a.rs", 3);
        assert_eq!(
            warnings,
            vec![
                Warning::StaleAnchor {
                    file_path: "/a.rs".to_string(),
                    line: 3,
                    line_count: 3
                },
                Warning::StaleAnchor {
                    file_path: "/a.rs".to_string(),
                    line: 4,
                    line_count: 3
                },
            ]
        );
        assert!(check_document(&notes(5), "/other.rs", 0).is_empty());
    }

    #[test]
    fn test_format_stale_anchor() {
        let msg = format_warning(&Warning::StaleAnchor {
            file_path: "/a.rs".to_string(),
            line: 9,
            line_count: 4,
        });
        assert!(msg.contains("/a.rs:10"));
        assert!(msg.contains("4 lines"));
    }

    #[test]
    fn test_format_large_collection() {
        let msg = format_warning(&Warning::LargeCollection {
            count: 1500,
            threshold: 1000,
        });
        assert!(msg.contains("1500"));
        assert!(msg.contains("1000"));
    }
}
