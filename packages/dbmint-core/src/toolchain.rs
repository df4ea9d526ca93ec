//! External collaborators: schema preprocessing, DBML to SQL generation and
//! the SQL engine CLI.
//!
//! The workflows only see the [`SchemaCompiler`] and [`SqlEngine`] traits;
//! [`DbmlCompiler`] and [`SqliteCli`] back them with child processes.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::config::MintConfig;
use crate::error::ToolError;

/// Turns a schema file into SQL DDL.
pub trait SchemaCompiler {
    /// Preprocesses the schema file and returns the expanded schema text.
    fn preprocess(&self, schema: &Path) -> Result<String, ToolError>;

    /// Generates SQL DDL from preprocessed schema text.
    ///
    /// `scratch` is a path the implementation may use for an intermediate
    /// file; it must not be left behind.
    fn generate_sql(&self, preprocessed: &str, scratch: &Path) -> Result<String, ToolError>;
}

/// Runs SQL against database files.
pub trait SqlEngine {
    /// Executes SQL text (statements or a dump) against `db`, creating it if
    /// missing.
    fn execute(&self, db: &Path, sql: &str) -> Result<(), ToolError>;

    /// Returns the full dump text of `db`.
    fn dump(&self, db: &Path) -> Result<String, ToolError>;
}

/// `cpp -P` followed by `dbml_sqlite -f`.
#[derive(Debug, Clone)]
pub struct DbmlCompiler {
    preprocessor: String,
    generator: String,
}

impl DbmlCompiler {
    pub fn new(preprocessor: impl Into<String>, generator: impl Into<String>) -> Self {
        Self {
            preprocessor: preprocessor.into(),
            generator: generator.into(),
        }
    }

    pub fn from_config(config: &MintConfig) -> Self {
        Self::new(&config.preprocessor, &config.schema_generator)
    }
}

impl SchemaCompiler for DbmlCompiler {
    fn preprocess(&self, schema: &Path) -> Result<String, ToolError> {
        let mut cmd = Command::new(&self.preprocessor);
        cmd.arg(schema).arg("-P");
        run(cmd, &self.preprocessor, None)
    }

    fn generate_sql(&self, preprocessed: &str, scratch: &Path) -> Result<String, ToolError> {
        fs::write(scratch, preprocessed).map_err(|e| ToolError::Scratch {
            program: self.generator.clone(),
            path: scratch.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut cmd = Command::new(&self.generator);
        cmd.arg(scratch).arg("-f");
        let result = run(cmd, &self.generator, None);

        if let Err(e) = fs::remove_file(scratch) {
            tracing::warn!("Failed to remove {}: {}", scratch.display(), e);
        }

        result
    }
}

/// The `sqlite3` command line shell.
#[derive(Debug, Clone)]
pub struct SqliteCli {
    program: String,
}

impl SqliteCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &MintConfig) -> Self {
        Self::new(&config.sql_engine)
    }
}

impl SqlEngine for SqliteCli {
    fn execute(&self, db: &Path, sql: &str) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(db);
        run(cmd, &self.program, Some(sql)).map(|_| ())
    }

    fn dump(&self, db: &Path) -> Result<String, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(db).arg(".dump");
        run(cmd, &self.program, None)
    }
}

/// Runs `cmd` to completion, optionally feeding `stdin`, and returns stdout.
fn run(mut cmd: Command, program: &str, stdin: Option<&str>) -> Result<String, ToolError> {
    tracing::debug!("Running {:?}", cmd);

    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let spawn_error = |e: std::io::Error| ToolError::Spawn {
        program: program.to_string(),
        message: e.to_string(),
    };

    let mut child = cmd.spawn().map_err(spawn_error)?;

    // Fed from its own thread so a child filling stdout/stderr while still
    // reading input cannot deadlock against us
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_string();
            Some(thread::spawn(move || pipe.write_all(input.as_bytes())))
        }
        _ => None,
    };

    let output = child.wait_with_output().map_err(spawn_error)?;
    let write_result = match writer {
        Some(handle) => handle.join().unwrap_or_else(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "stdin writer thread panicked",
            ))
        }),
        None => Ok(()),
    };

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }
    // A child that exits early closes its stdin; its exit status wins
    write_result.map_err(spawn_error)?;
    if !stderr.is_empty() {
        tracing::warn!("{}: {}", program, stderr);
    }

    String::from_utf8(output.stdout).map_err(|_| ToolError::NonUtf8Output {
        program: program.to_string(),
    })
}
