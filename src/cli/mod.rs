pub mod commands;
pub mod hooks;

pub use commands::{Cli, Commands, SyncCommand, run};
