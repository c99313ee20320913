//! dbmeta CLI - Command-line interface for dbmeta.
//!
//! This crate provides the `dbmeta` tool for building a database from a
//! script directory, updating an existing database, and exporting a
//! database back into scripts.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
