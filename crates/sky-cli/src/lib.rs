//! Command implementations behind the `sky` binary.
pub mod cli;
pub mod commands;
