//! Command-line front end for adbloader.
//!
//! Parsing lives in [`cli`], the subcommand handlers in [`commands`].
//! Exposed as a library so the handlers can be exercised from tests.

pub mod cli;
pub mod commands;
pub mod prompt;
