//! Error types.
//!
//! Every failure belongs to one coarse [`ErrorCategory`] and carries a
//! specific reason code (see [`MintError::code`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::dump::InsertRow;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed dump text
    DumpParse,
    /// CSV table directory export/import
    TableCsvDir,
    /// External process failure
    Toolchain,
    /// Invalid command-line input
    Input,
    /// Filesystem failure outside the CSV store
    Io,
}

/// Dump parser errors. Both abort the whole parse pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DumpParseError {
    /// Table block line without at least a column name and type
    #[error("line {line_no}: need at least varname vartype in table block, got '{line}'")]
    TableParse { line_no: usize, line: String },

    /// INSERT statement not framed as `VALUES(...);`
    #[error("line {line_no}: expected VALUES(...); in insert '{line}'")]
    InsertParse { line_no: usize, line: String },
}

impl DumpParseError {
    /// Reason code.
    pub fn code(&self) -> &'static str {
        match self {
            DumpParseError::TableParse { .. } => "TableParseError",
            DumpParseError::InsertParse { .. } => "InsertParseError",
        }
    }
}

/// CSV table directory errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableCsvDirError {
    /// Table definition has no columns
    #[error("Table '{table}' has no columns")]
    TableWithNoColumns { table: String },

    /// Row value count differs from the table column count
    #[error("Row {row:?} of table '{table}' has {got} values, expected {expected}")]
    ValuesOfDiffLenToCols {
        table: String,
        row: InsertRow,
        expected: usize,
        got: usize,
    },

    /// CSV path from which no table name can be recovered
    #[error("Invalid CSV table file '{}'", path.display())]
    InvalidCsvTable { path: PathBuf },

    /// I/O failure on a CSV file or directory
    #[error("Failed to {action} '{}': {message}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl TableCsvDirError {
    /// Reason code.
    pub fn code(&self) -> &'static str {
        match self {
            TableCsvDirError::TableWithNoColumns { .. } => "TableWithNoColumns",
            TableCsvDirError::ValuesOfDiffLenToCols { .. } => "ValuesOfDiffLenToCols",
            TableCsvDirError::InvalidCsvTable { .. } => "InvalidCsvTable",
            TableCsvDirError::Io { .. } => "Io",
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        TableCsvDirError::Io {
            action,
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// External collaborator failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Process could not be started
    #[error("Failed to run '{program}': {message}")]
    Spawn { program: String, message: String },

    /// Process exited unsuccessfully
    #[error("'{program}' exited unsuccessfully: {status}\nstderr: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Process printed something that is not UTF-8
    #[error("'{program}' produced non UTF-8 output")]
    NonUtf8Output { program: String },

    /// Scratch file handling around a process failed
    #[error("Scratch file '{}' for '{program}': {message}", path.display())]
    Scratch {
        program: String,
        path: PathBuf,
        message: String,
    },
}

impl ToolError {
    /// Reason code.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Spawn { .. } => "Spawn",
            ToolError::Failed { .. } => "Failed",
            ToolError::NonUtf8Output { .. } => "NonUtf8Output",
            ToolError::Scratch { .. } => "Scratch",
        }
    }
}

/// Command-line input validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// File does not carry the required extension
    #[error("Please select a *.{expected} file, got '{name}'")]
    WrongExtension { name: String, expected: &'static str },

    /// Name contains directory components
    #[error("Please specify a file in the specified mountpoint with no folders, got '{name}'")]
    NotBareFilename { name: String },
}

impl InputError {
    /// Reason code.
    pub fn code(&self) -> &'static str {
        match self {
            InputError::WrongExtension { .. } => "WrongExtension",
            InputError::NotBareFilename { .. } => "NotBareFilename",
        }
    }
}

/// Any dbmint error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error(transparent)]
    DumpParse(#[from] DumpParseError),

    #[error(transparent)]
    TableCsvDir(#[from] TableCsvDirError),

    #[error(transparent)]
    Toolchain(#[from] ToolError),

    #[error(transparent)]
    Input(#[from] InputError),

    /// Filesystem failure in a workflow step
    #[error("Failed to {action} '{}': {message}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl MintError {
    /// Coarse category of the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MintError::DumpParse(_) => ErrorCategory::DumpParse,
            MintError::TableCsvDir(_) => ErrorCategory::TableCsvDir,
            MintError::Toolchain(_) => ErrorCategory::Toolchain,
            MintError::Input(_) => ErrorCategory::Input,
            MintError::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Specific reason code within the category.
    pub fn code(&self) -> &'static str {
        match self {
            MintError::DumpParse(e) => e.code(),
            MintError::TableCsvDir(e) => e.code(),
            MintError::Toolchain(e) => e.code(),
            MintError::Input(e) => e.code(),
            MintError::Io { .. } => "Io",
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        MintError::Io {
            action,
            path: path.into(),
            message: err.to_string(),
        }
    }
}
