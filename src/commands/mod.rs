//! # CLI Subcommands
//!
//! Contains modules that run the subcommands.

pub mod get;
pub mod unpack;
pub mod convert;
pub mod dump;
pub mod completions;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One of the parameters was out of range")]
    OutOfRange,
    #[error("Input source could not be interpreted")]
    UnknownFormat,
    #[error("File not found")]
    FileNotFound
}
