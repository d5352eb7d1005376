//! CLI module for aiwall.
//!
//! The command-line interface is the presentation layer: it parses
//! arguments, builds the application context, and renders pipeline progress
//! and results.

mod commands;
pub mod output;

pub use commands::Cli;
