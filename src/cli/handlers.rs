use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use crate::cli::commands::{KeyArgs, StoreArgs};
use crate::config::StoreConfig;
use crate::entity::NoteKey;
use crate::error::{CodenotesError, Result};
use crate::position::{find_by_key, reveal_target, summarize};
use crate::search;
use crate::storage::{NoteStore, NoteUpdate};
use crate::view::{document_markers, ActiveDocument, NotesTree};
use crate::warnings::{check_collection, check_document, format_warning};

/// Find the workspace root by looking for .vscode/ or .git/
fn find_project_root(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let cwd = env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        if current.join(".vscode").exists() || current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Without a workspace the store still opens, but every operation reports
/// `NoWorkspace`.
fn open_store(args: &StoreArgs) -> Result<NoteStore> {
    let Some(root) = find_project_root(args.root.clone()) else {
        return Ok(NoteStore::new(StoreConfig::default()));
    };

    let mut config = StoreConfig::load(&root)?;
    if let Some(mode) = args.parse_mode {
        config.parse_mode = mode;
    }
    tracing::debug!(root = %root.display(), parse_mode = %config.parse_mode, "opened workspace");
    Ok(NoteStore::new(config))
}

/// The one spelling of `file` that note keys use: absolute, symlinks
/// resolved when the file exists, `.` and `..` folded away otherwise.
fn absolute_file(file: &Path) -> Result<String> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        env::current_dir()?.join(file)
    };
    let path = match fs::canonicalize(&path) {
        Ok(resolved) => resolved,
        Err(_) => normalize_lexically(&path),
    };
    Ok(path.to_string_lossy().into_owned())
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn key_from_args(args: &KeyArgs) -> Result<NoteKey> {
    Ok(NoteKey::new(
        absolute_file(&args.file)?,
        args.line - 1,
        args.created.clone(),
    ))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

/// Line count as an editor reports it: one more than the number of newlines.
fn document_line_count(path: &Path) -> Result<u32> {
    let bytes = fs::read(path)?;
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    Ok(u32::try_from(newlines + 1).unwrap_or(u32::MAX))
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    args: &StoreArgs,
    file: PathBuf,
    line: u32,
    content: Option<String>,
    title: Option<String>,
    color: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let store = open_store(args)?;

    let content = if stdin {
        read_stdin()?
    } else {
        content.unwrap_or_default()
    };

    let note = store.create(absolute_file(&file)?, line - 1, content, title, color)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Sticky note added at {}:{}", note.file_path, note.line + 1);
        println!("  created: {}", note.created);
    }

    Ok(())
}

pub fn handle_list(args: &StoreArgs, filter: Option<String>, json: bool) -> Result<()> {
    let store = open_store(args)?;
    let notes = store.load()?;

    for warning in check_collection(&notes) {
        eprintln!("{}", format_warning(&warning));
    }

    let query = filter.unwrap_or_default();
    let tree = NotesTree::build(search::group_by_file(search::filter(notes, &query)));

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else if tree.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for file in &tree.files {
            println!("  {} ({})  {}", file.label, file.description, file.file_path);
            for note in &file.notes {
                let title = note
                    .title
                    .as_deref()
                    .map(|t| format!("[{}] ", t))
                    .unwrap_or_default();
                println!(
                    "    {:>5}  {}{}  ({})",
                    note.description,
                    title,
                    summarize(&note.label),
                    note.key.created
                );
            }
        }
    }

    Ok(())
}

pub fn handle_show(args: &StoreArgs, file: PathBuf, json: bool) -> Result<()> {
    let store = open_store(args)?;
    let file_path = absolute_file(&file)?;
    let line_count = document_line_count(Path::new(&file_path))?;

    let notes = store.load()?;
    let markers = document_markers(&notes, &ActiveDocument::new(file_path.clone(), line_count));

    if json {
        println!("{}", serde_json::to_string_pretty(&markers)?);
    } else if markers.is_empty() {
        println!("No notes in {}.", file_path);
    } else {
        for marker in &markers {
            println!(
                "  {:>5}: {}  ({})",
                marker.display_line + 1,
                marker.summary,
                marker.key.created
            );
        }
    }

    for warning in check_document(&notes, &file_path, line_count) {
        eprintln!("{}", format_warning(&warning));
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    args: &StoreArgs,
    key: KeyArgs,
    content: Option<String>,
    title: Option<String>,
    clear_title: bool,
    color: Option<String>,
    stdin: bool,
) -> Result<()> {
    let store = open_store(args)?;
    let key = key_from_args(&key)?;

    let content = if stdin { Some(read_stdin()?) } else { content };
    let title = if clear_title { Some(None) } else { title.map(Some) };

    store.edit(
        &key,
        NoteUpdate {
            content,
            color,
            title,
        },
    )?;

    println!("Sticky note updated.");
    Ok(())
}

pub fn handle_move(args: &StoreArgs, key: KeyArgs, new_line: u32) -> Result<()> {
    let store = open_store(args)?;
    let key = key_from_args(&key)?;

    let moved = store.move_note(&key, new_line - 1)?;
    println!(
        "Moved note to {}:{} (created {})",
        moved.file_path,
        moved.line + 1,
        moved.created
    );
    Ok(())
}

pub fn handle_delete(args: &StoreArgs, key: KeyArgs, force: bool) -> Result<()> {
    let store = open_store(args)?;
    let key = key_from_args(&key)?;

    let notes = store.load()?;
    let Some(note) = find_by_key(&notes, &key) else {
        println!("No matching note; nothing deleted.");
        return Ok(());
    };

    // Confirm deletion unless --force is used
    if !force {
        eprintln!(
            "Delete note at {}:{} - {}? [y/N] ",
            note.file_path,
            note.line + 1,
            note.content
        );

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(CodenotesError::ConfirmationRequired);
        }
    }

    if store.delete(&key)? {
        println!("Sticky note deleted.");
    } else {
        println!("No matching note; nothing deleted.");
    }
    Ok(())
}

pub fn handle_reveal(args: &StoreArgs, key: KeyArgs) -> Result<()> {
    let store = open_store(args)?;
    let key = key_from_args(&key)?;

    let note = store
        .get(&key)?
        .ok_or_else(|| CodenotesError::NoteNotFound(key.clone()))?;
    let target = reveal_target(&note);

    println!(
        "{}:{}:{}",
        target.file_path,
        target.line + 1,
        target.column + 1
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseMode;
    use tempfile::TempDir;

    #[test]
    fn test_document_line_count_matches_editor() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.txt");

        fs::write(&path, "").unwrap();
        assert_eq!(document_line_count(&path).unwrap(), 1);

        fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(document_line_count(&path).unwrap(), 3);

        fs::write(&path, "a\r\nb").unwrap();
        assert_eq!(document_line_count(&path).unwrap(), 2);
    }

    #[test]
    fn test_explicit_root_wins() {
        let root = PathBuf::from("/somewhere/else");
        assert_eq!(find_project_root(Some(root.clone())), Some(root));
    }

    #[test]
    fn test_absolute_file_keeps_absolute_paths() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.rs");
        let expected = fs::canonicalize(tmp.path()).unwrap().join("x.rs");
        assert_eq!(absolute_file(&path).unwrap(), expected.to_string_lossy());
    }

    #[test]
    fn test_absolute_file_resolves_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("a.rs"), "").unwrap();

        let canonical = fs::canonicalize(tmp.path().join("a.rs")).unwrap();
        let spelled = tmp.path().join("src/.././a.rs");
        assert_eq!(absolute_file(&spelled).unwrap(), canonical.to_string_lossy());
    }

    #[test]
    fn test_normalize_lexically_folds_dots() {
        assert_eq!(
            normalize_lexically(Path::new("/p/./src/../lib/a.rs")),
            PathBuf::from("/p/lib/a.rs")
        );
        assert_eq!(normalize_lexically(Path::new("/../a.rs")), PathBuf::from("/a.rs"));
    }

    #[test]
    fn test_parse_mode_override_beats_config_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".codenotes.yaml"), "parse_mode: strict\n").unwrap();

        let args = StoreArgs {
            root: Some(tmp.path().to_path_buf()),
            parse_mode: Some(ParseMode::Lenient),
        };
        assert_eq!(open_store(&args).unwrap().config().parse_mode, ParseMode::Lenient);
    }
}
