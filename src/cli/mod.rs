mod commands;
mod handlers;

pub use commands::{Cli, Commands, KeyArgs, StoreArgs};
pub use handlers::{
    handle_add, handle_delete, handle_edit, handle_list, handle_move, handle_reveal, handle_show,
};
