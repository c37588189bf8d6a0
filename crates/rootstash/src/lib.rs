//! Rootstash CLI library.
//!
//! This crate provides the command-line interface over `rootstash-core`:
//! argument parsing and the `save`, `list` and `run` handlers.

pub mod cli;
pub mod commands;
