//! The `gen` and `export_data` pipelines.
//!
//! Both resolve user supplied names against [`MintConfig::mount_dir`] and
//! talk to the external tools only through [`SchemaCompiler`] and
//! [`SqlEngine`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::MintConfig;
use crate::csv_dir::{export_directory, import_directory};
use crate::dedup::filter_new;
use crate::dump::{parse_inserts, parse_tables_and_columns, serialize_inserts};
use crate::error::{MintError, TableCsvDirError};
use crate::paths::{file_stem, validate_bare_filename, DBML_EXTENSION, DB_EXTENSION};
use crate::toolchain::{SchemaCompiler, SqlEngine};

/// Input of [`generate_database`].
#[derive(Debug, Clone)]
pub struct GenRequest {
    /// Bare `*.dbml` schema file name
    pub schema_file: String,
    /// Bare `*.db` output file name
    pub output_file: String,
    /// Keep the generated `<stem>.sql` next to the database
    pub keep_sql: bool,
    /// Directory of table CSV files to merge into the new database
    pub data_dir: Option<String>,
}

/// Outcome of [`generate_database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenReport {
    /// Path of the generated database
    pub database: PathBuf,
    /// Path of the kept SQL file, if any
    pub sql_file: Option<PathBuf>,
    /// Row counts of the data directory merge, if one was requested
    pub merge: Option<MergeReport>,
}

/// Row counts of a data directory merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows read from the CSV files
    pub imported: usize,
    /// Imported rows already present in the fresh database
    pub duplicates: usize,
    /// Rows replayed into the database
    pub replayed: usize,
}

/// Builds a database from a DBML schema, optionally merging a data
/// directory into it.
///
/// An existing database with the same name is replaced.
pub fn generate_database<C, E>(
    config: &MintConfig,
    compiler: &C,
    engine: &E,
    request: &GenRequest,
) -> Result<GenReport, MintError>
where
    C: SchemaCompiler + ?Sized,
    E: SqlEngine + ?Sized,
{
    let output = validate_bare_filename(&request.output_file, DB_EXTENSION)?;
    let schema = validate_bare_filename(&request.schema_file, DBML_EXTENSION)?;

    let db_path = config.resolve(output);
    match fs::remove_file(&db_path) {
        Ok(()) => tracing::debug!("Removed existing database {}", db_path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(MintError::io("remove existing database", &db_path, e)),
    }

    let preprocessed = compiler.preprocess(&config.resolve(schema))?;
    let scratch = config.resolve(format!("{}.proc.{}", file_stem(schema), DBML_EXTENSION));
    let sql = compiler.generate_sql(&preprocessed, &scratch)?;

    let sql_file = if request.keep_sql {
        let path = config.resolve(format!("{}.sql", file_stem(output)));
        fs::write(&path, &sql).map_err(|e| MintError::io("write", &path, e))?;
        tracing::info!("Wrote schema SQL to {}", path.display());
        Some(path)
    } else {
        None
    };

    engine.execute(&db_path, &sql)?;
    tracing::info!("Generated database {}", db_path.display());

    let merge = match &request.data_dir {
        Some(dir) => Some(merge_data_dir(engine, &db_path, &config.resolve(dir))?),
        None => None,
    };

    Ok(GenReport {
        database: db_path,
        sql_file,
        merge,
    })
}

/// Replays the rows of a CSV data directory into `db`, skipping rows the
/// database already holds.
pub fn merge_data_dir<E>(engine: &E, db: &Path, data_dir: &Path) -> Result<MergeReport, MintError>
where
    E: SqlEngine + ?Sized,
{
    let baseline = parse_inserts(&engine.dump(db)?)?;
    let candidates = import_directory(data_dir)?;
    let imported = candidates.len();

    let rows = filter_new(&baseline, candidates);
    let report = MergeReport {
        imported,
        duplicates: imported - rows.len(),
        replayed: rows.len(),
    };

    if !rows.is_empty() {
        engine.execute(db, &serialize_inserts(&rows))?;
    }

    tracing::info!(
        "Merged {}: {} rows imported, {} already present, {} replayed",
        data_dir.display(),
        report.imported,
        report.duplicates,
        report.replayed
    );
    Ok(report)
}

/// Dumps a database and writes one CSV file per table into `data_dir`.
///
/// # Returns
/// One result per table; failed tables are also logged. Dump, parse and
/// directory creation failures abort with an error instead.
pub fn export_data<E>(
    config: &MintConfig,
    engine: &E,
    db_file: &str,
    data_dir: &str,
) -> Result<Vec<Result<PathBuf, TableCsvDirError>>, MintError>
where
    E: SqlEngine + ?Sized,
{
    let db_file = validate_bare_filename(db_file, DB_EXTENSION)?;
    let db_path = config.resolve(db_file);
    if !db_path.is_file() {
        return Err(MintError::io(
            "open database",
            &db_path,
            std::io::Error::from(ErrorKind::NotFound),
        ));
    }

    let dump = engine.dump(&db_path)?;
    let tables = parse_tables_and_columns(&dump)?;
    let inserts = parse_inserts(&dump)?;
    tracing::debug!(
        "Parsed {} tables and {} rows from {}",
        tables.len(),
        inserts.len(),
        db_path.display()
    );

    Ok(export_directory(&config.resolve(data_dir), &tables, &inserts)?)
}
