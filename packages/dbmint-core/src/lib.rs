//! Core of dbmint: SQL dump parsing, CSV table directories and insert merging.
//!
//! Provides the line-oriented dump parser and its inverse serializer, the
//! per-table CSV store, duplicate filtering against a baseline database, and
//! the `gen` / `export_data` workflows that drive the external toolchain.

pub mod config;
pub mod csv_dir;
pub mod dedup;
pub mod dump;
pub mod error;
pub mod paths;
pub mod toolchain;
pub mod workflow;

pub use dump::{InsertRow, TableColumns};
pub use error::{ErrorCategory, MintError};
