use clap::Parser;
use codenotes::cli::{
    handle_add, handle_delete, handle_edit, handle_list, handle_move, handle_reveal, handle_show,
    Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let args = cli.store;

    let result = match cli.command {
        Commands::Add {
            file,
            line,
            content,
            title,
            color,
            stdin,
            json,
        } => handle_add(&args, file, line, content, title, color, stdin, json),
        Commands::List { filter, json } => handle_list(&args, filter, json),
        Commands::Show { file, json } => handle_show(&args, file, json),
        Commands::Edit {
            key,
            content,
            title,
            clear_title,
            color,
            stdin,
        } => handle_edit(&args, key, content, title, clear_title, color, stdin),
        Commands::Move { key, new_line } => handle_move(&args, key, new_line),
        Commands::Delete { key, force } => handle_delete(&args, key, force),
        Commands::Reveal { key } => handle_reveal(&args, key),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
