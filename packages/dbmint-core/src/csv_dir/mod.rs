//! CSV table directories: one `<table>.csv` per table.
//!
//! The header line holds the column names, every further line one row of
//! raw dump values joined by commas. Values are never quoted, so a value
//! containing a comma does not survive a round trip.
//!
//! Export validates row widths against the table definition; import does
//! not validate anything beyond reading the file.


use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::dump::{InsertRow, TableColumns};
use crate::error::TableCsvDirError;

const CSV_SUFFIX: &str = ".csv";

/// Path of the CSV file holding `table` inside `dir`.
pub fn table_csv_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}{}", table, CSV_SUFFIX))
}

/// Writes the rows of one table to `<dir>/<table>.csv`.
///
/// The file content is built in memory first and moved into place with an
/// atomic rename, so a failed export leaves no file behind.
///
/// # Arguments
/// * `dir` - Target directory, must exist
/// * `table` - Table definition providing the header
/// * `inserts` - Rows of all tables; only rows of `table` are written
///
/// # Returns
/// `Result<PathBuf, TableCsvDirError>` with the path of the written file.
pub fn export_table(
    dir: &Path,
    table: &TableColumns,
    inserts: &[InsertRow],
) -> Result<PathBuf, TableCsvDirError> {
    let content = render_table(table, inserts)?;

    let final_path = table_csv_path(dir, &table.name);
    let temp_path = dir.join(format!("{}{}.tmp", table.name, CSV_SUFFIX));

    let written = write_file(&temp_path, &content).and_then(|()| {
        // Atomic rename
        fs::rename(&temp_path, &final_path)
            .map_err(|e| TableCsvDirError::io("rename into", &final_path, e))
    });
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            tracing::debug!("No temp file {} to remove: {}", temp_path.display(), cleanup);
        }
        return Err(e);
    }

    tracing::debug!("Wrote table '{}' to {}", table.name, final_path.display());
    Ok(final_path)
}

fn write_file(path: &Path, content: &str) -> Result<(), TableCsvDirError> {
    let mut file =
        File::create(path).map_err(|e| TableCsvDirError::io("create temp file", path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| TableCsvDirError::io("write", path, e))?;
    file.sync_all()
        .map_err(|e| TableCsvDirError::io("sync", path, e))
}

fn render_table(table: &TableColumns, inserts: &[InsertRow]) -> Result<String, TableCsvDirError> {
    if table.varnames.is_empty() {
        return Err(TableCsvDirError::TableWithNoColumns {
            table: table.name.clone(),
        });
    }

    let mut content = table.varnames.join(",");
    content.push('\n');

    for row in inserts.iter().filter(|row| row.table_name == table.name) {
        if row.values.len() != table.column_count() {
            return Err(TableCsvDirError::ValuesOfDiffLenToCols {
                table: table.name.clone(),
                row: row.clone(),
                expected: table.column_count(),
                got: row.values.len(),
            });
        }
        content.push_str(&row.values.join(","));
        content.push('\n');
    }

    Ok(content)
}

/// Exports every table into `dir`, creating it if needed.
///
/// A failing table is logged and reported in the returned list but does not
/// stop the remaining tables. Only failing to create `dir` aborts.
///
/// # Returns
/// One result per table, in the order of `tables`.
pub fn export_directory(
    dir: &Path,
    tables: &[TableColumns],
    inserts: &[InsertRow],
) -> Result<Vec<Result<PathBuf, TableCsvDirError>>, TableCsvDirError> {
    fs::create_dir_all(dir).map_err(|e| TableCsvDirError::io("create directory", dir, e))?;

    let results = tables
        .iter()
        .map(|table| {
            let result = export_table(dir, table, inserts);
            if let Err(e) = &result {
                tracing::error!("Failed to export table '{}': {}", table.name, e);
            }
            result
        })
        .collect();

    Ok(results)
}

/// Reads the rows of one CSV file.
///
/// The table name is the file stem. The first line is the header and is
/// always skipped; every other line becomes one row, unvalidated.
pub fn import_table(path: &Path) -> Result<Vec<InsertRow>, TableCsvDirError> {
    let table_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TableCsvDirError::InvalidCsvTable {
            path: path.to_path_buf(),
        })?;

    let content =
        fs::read_to_string(path).map_err(|e| TableCsvDirError::io("read", path, e))?;

    let mut lines = content.lines();
    if lines.next().is_none() {
        tracing::warn!("CSV file {} is empty, no header found", path.display());
    }

    Ok(lines
        .map(|line| {
            let values = line.split(',').map(|v| v.trim().to_string()).collect();
            InsertRow::new(table_name, values)
        })
        .collect())
}

/// Reads every `*.csv` file of `dir`, in file name order.
pub fn import_directory(dir: &Path) -> Result<Vec<InsertRow>, TableCsvDirError> {
    let entries = fs::read_dir(dir).map_err(|e| TableCsvDirError::io("list", dir, e))?;

    let mut csv_paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TableCsvDirError::io("list", dir, e))?;
        let path = entry.path();
        let is_csv = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CSV_SUFFIX));
        if is_csv && path.is_file() {
            csv_paths.push(path);
        }
    }
    csv_paths.sort();

    let mut rows = Vec::new();
    for path in csv_paths {
        let table_rows = import_table(&path)?;
        tracing::debug!("Imported {} rows from {}", table_rows.len(), path.display());
        rows.extend(table_rows);
    }

    Ok(rows)
}
