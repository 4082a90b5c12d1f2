use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ParseMode;

#[derive(Parser, Debug)]
#[command(name = "codenotes")]
#[command(version, about = "Sticky notes anchored to lines of your project files")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the notes live and how to read them.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Workspace root (default: nearest directory with .vscode/ or .git/)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Handling of an unreadable notes file: strict or lenient (overrides .codenotes.yaml)
    #[arg(long, global = true, value_name = "MODE")]
    pub parse_mode: Option<ParseMode>,
}

/// Identifies one note: file, 1-based line and creation timestamp.
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Annotated file
    pub file: PathBuf,

    /// Line number (1-based)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub line: u32,

    /// Creation timestamp of the note, as shown by `list`
    pub created: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach a sticky note to a line
    Add {
        /// File to annotate
        file: PathBuf,

        /// Line number (1-based)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,

        /// Note text
        content: Option<String>,

        /// Short label
        #[arg(long)]
        title: Option<String>,

        /// Color token, e.g. "#FFD600"
        #[arg(long)]
        color: Option<String>,

        /// Read content from stdin
        #[arg(long, conflicts_with = "content")]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes grouped by file
    List {
        /// Keep notes whose text or path contains this, or whose line equals it
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the notes placed in one file
    Show {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the text, title or color of a note
    Edit {
        #[command(flatten)]
        key: KeyArgs,

        /// New note text
        #[arg(long)]
        content: Option<String>,

        /// New title
        #[arg(long, conflicts_with = "clear_title")]
        title: Option<String>,

        /// Remove the title
        #[arg(long)]
        clear_title: bool,

        /// New color token
        #[arg(long)]
        color: Option<String>,

        /// Read new content from stdin
        #[arg(long, conflicts_with = "content")]
        stdin: bool,
    },

    /// Re-anchor a note to another line
    Move {
        #[command(flatten)]
        key: KeyArgs,

        /// Target line number (1-based)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        new_line: u32,
    },

    /// Delete a note
    Delete {
        #[command(flatten)]
        key: KeyArgs,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Print the location of a note as path:line:column
    Reveal {
        #[command(flatten)]
        key: KeyArgs,
    },
}
