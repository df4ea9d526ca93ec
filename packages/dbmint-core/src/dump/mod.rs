//! SQL dump text: table column definitions and row inserts.
//!
//! Only the line-oriented subset written by `sqlite3 <db> .dump` for
//! generated schemas is understood: one statement per line, no multi-line
//! inserts, no parentheses or commas inside quoted values.


mod parser;
mod serializer;

pub use parser::{parse_inserts, parse_tables_and_columns, TableScanner};
pub use serializer::serialize_inserts;

/// Column names and types of one `CREATE TABLE` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    /// Table name
    pub name: String,
    /// Column names, in declaration order
    pub varnames: Vec<String>,
    /// Column types, parallel to `varnames`
    pub vartypes: Vec<String>,
}

impl TableColumns {
    /// Creates a table definition from parallel name/type lists.
    pub fn new(name: impl Into<String>, varnames: Vec<String>, vartypes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            varnames,
            vartypes,
        }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.varnames.len()
    }
}

/// One row insert: target table and raw value tokens.
///
/// Values keep their dump spelling, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRow {
    /// Target table
    pub table_name: String,
    /// Raw values in column order
    pub values: Vec<String>,
}

impl InsertRow {
    pub fn new(table_name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            table_name: table_name.into(),
            values,
        }
    }
}
