pub mod commands;
pub mod core;
mod help;
mod io;
pub mod output;
mod render;
mod shell;

pub use self::core::{CliError, CommandError};
pub use shell::run_cli;
