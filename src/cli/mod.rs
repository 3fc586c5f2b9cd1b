mod commands;

pub use commands::{execute, BuildArgs, CleanArgs, Cli, Commands, ListArgs, NewPostArgs, ServeArgs};
