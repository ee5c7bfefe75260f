//! Subcommand implementations behind the command-line interface.

pub mod init;
pub mod run;
