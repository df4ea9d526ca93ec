//! Dump parser: two independent line passes, one for table blocks and one
//! for inserts.

use crate::error::DumpParseError;

use super::{InsertRow, TableColumns};

const TABLE_START: &str = "CREATE TABLE ";
const TABLE_START_END: &str = "(";
const TABLE_END: &str = ");";
// Whole first token only; a column named `IN` or `FOR` is still a column
const FOREIGN_KEY_MARKER: &str = "FOREIGN";

const INSERT_PREFIX: &str = "INSERT INTO ";
const VALUES_START: &str = "VALUES(";
const VALUES_END: &str = ");";

#[derive(Debug, Default)]
enum ScanState {
    #[default]
    Idle,
    InTable {
        name: String,
        varnames: Vec<String>,
        vartypes: Vec<String>,
    },
}

/// Line-by-line state machine collecting `CREATE TABLE` blocks.
///
/// Feed trimmed lines with [`TableScanner::feed`]; a closed block with at
/// least one column is returned as a [`TableColumns`]. A block still open
/// when input ends is dropped.
#[derive(Debug, Default)]
pub struct TableScanner {
    state: ScanState,
}

impl TableScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while inside a table block.
    pub fn in_table(&self) -> bool {
        matches!(self.state, ScanState::InTable { .. })
    }

    /// Consumes one line.
    ///
    /// # Arguments
    /// * `line_no` - 1-based line number, used for error reporting
    /// * `line` - the line, already trimmed
    ///
    /// # Returns
    /// The finished table when `line` closes a non-empty block.
    pub fn feed(
        &mut self,
        line_no: usize,
        line: &str,
    ) -> Result<Option<TableColumns>, DumpParseError> {
        if self.in_table() && line == TABLE_END {
            return Ok(self.close_block());
        }

        match &mut self.state {
            ScanState::Idle => {
                if let Some(name) = line
                    .strip_prefix(TABLE_START)
                    .and_then(|rest| rest.strip_suffix(TABLE_START_END))
                {
                    self.state = ScanState::InTable {
                        name: name.trim().to_string(),
                        varnames: Vec::new(),
                        vartypes: Vec::new(),
                    };
                }
                Ok(None)
            }
            ScanState::InTable {
                varnames, vartypes, ..
            } => {
                let words: Vec<&str> = line.split(' ').collect();
                if words.len() < 2 {
                    return Err(DumpParseError::TableParse {
                        line_no,
                        line: line.to_string(),
                    });
                }

                // Key constraint lines declare no column
                if words[0] == FOREIGN_KEY_MARKER {
                    return Ok(None);
                }

                varnames.push(words[0].to_string());
                vartypes.push(words[1].to_string());
                Ok(None)
            }
        }
    }

    fn close_block(&mut self) -> Option<TableColumns> {
        let ScanState::InTable {
            name,
            varnames,
            vartypes,
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        if varnames.is_empty() || vartypes.is_empty() || name.is_empty() {
            tracing::debug!("Skipping table block '{}' without columns", name);
            return None;
        }

        Some(TableColumns {
            name,
            varnames,
            vartypes,
        })
    }
}

/// Extracts the column definitions of every `CREATE TABLE` block.
///
/// Fails on the first malformed column line; no partial result is returned.
pub fn parse_tables_and_columns(dump: &str) -> Result<Vec<TableColumns>, DumpParseError> {
    let mut scanner = TableScanner::new();
    let mut tables = Vec::new();

    for (idx, line) in dump.lines().enumerate() {
        if let Some(table) = scanner.feed(idx + 1, line.trim())? {
            tables.push(table);
        }
    }

    if scanner.in_table() {
        tracing::debug!("Dump ended inside a table block, discarding it");
    }

    Ok(tables)
}

/// Extracts every `INSERT INTO <table> VALUES(...);` line.
///
/// Values are split on commas and trimmed but otherwise left as written.
pub fn parse_inserts(dump: &str) -> Result<Vec<InsertRow>, DumpParseError> {
    dump.lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with(INSERT_PREFIX))
        .map(|(idx, line)| parse_insert_line(idx + 1, line))
        .collect()
}

fn parse_insert_line(line_no: usize, line: &str) -> Result<InsertRow, DumpParseError> {
    if !line.contains(VALUES_START) || !line.ends_with(VALUES_END) {
        return Err(DumpParseError::InsertParse {
            line_no,
            line: line.to_string(),
        });
    }

    let rest = &line[INSERT_PREFIX.len()..];
    let table_name = rest.split_whitespace().next().unwrap_or_default();

    let open = rest.find('(').map_or(rest.len(), |i| i + 1);
    let close = rest.find(')').unwrap_or(rest.len());
    let inner = if open <= close { &rest[open..close] } else { "" };

    let values = inner.split(',').map(|v| v.trim().to_string()).collect();

    Ok(InsertRow::new(table_name, values))
}
