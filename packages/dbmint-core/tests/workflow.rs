//! Integration tests for the `gen` and `export_data` workflows, with the
//! external tools replaced by in-memory fakes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ntest::timeout;
use tempfile::{tempdir, TempDir};

use dbmint_core::config::MintConfig;
use dbmint_core::error::{ErrorCategory, MintError, ToolError};
use dbmint_core::toolchain::{SchemaCompiler, SqlEngine};
use dbmint_core::workflow::{export_data, generate_database, GenRequest, MergeReport};

const SCHEMA_SQL: &str = "CREATE TABLE users (
  id INTEGER PRIMARY KEY,
  name TEXT
);
CREATE TABLE roles (
  id INTEGER
);
INSERT INTO roles VALUES(1);
";

/// Compiler returning fixed SQL and recording what it was asked.
#[derive(Default)]
struct FakeCompiler {
    preprocessed: RefCell<Vec<PathBuf>>,
    scratch: RefCell<Vec<PathBuf>>,
}

impl SchemaCompiler for FakeCompiler {
    fn preprocess(&self, schema: &Path) -> Result<String, ToolError> {
        self.preprocessed.borrow_mut().push(schema.to_path_buf());
        Ok("// preprocessed".to_string())
    }

    fn generate_sql(&self, preprocessed: &str, scratch: &Path) -> Result<String, ToolError> {
        assert_eq!(preprocessed, "// preprocessed");
        self.scratch.borrow_mut().push(scratch.to_path_buf());
        Ok(SCHEMA_SQL.to_string())
    }
}

/// Engine whose "database" is the concatenation of all executed SQL, so a
/// dump returns it verbatim. Also touches the database file on disk.
#[derive(Default)]
struct FakeEngine {
    databases: RefCell<HashMap<PathBuf, String>>,
}

impl FakeEngine {
    fn content(&self, db: &Path) -> String {
        self.databases.borrow().get(db).cloned().unwrap_or_default()
    }
}

impl SqlEngine for FakeEngine {
    fn execute(&self, db: &Path, sql: &str) -> Result<(), ToolError> {
        fs::write(db, "fake database").unwrap();
        self.databases
            .borrow_mut()
            .entry(db.to_path_buf())
            .or_default()
            .push_str(sql);
        Ok(())
    }

    fn dump(&self, db: &Path) -> Result<String, ToolError> {
        Ok(self.content(db))
    }
}

struct BrokenEngine;

impl SqlEngine for BrokenEngine {
    fn execute(&self, _db: &Path, _sql: &str) -> Result<(), ToolError> {
        Err(ToolError::Failed {
            program: "sqlite3".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Error: near line 1".to_string(),
        })
    }

    fn dump(&self, _db: &Path) -> Result<String, ToolError> {
        Ok(String::new())
    }
}

fn mounted() -> (TempDir, MintConfig) {
    let temp_dir = tempdir().unwrap();
    let config = MintConfig {
        mount_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    (temp_dir, config)
}

fn gen_request(data_dir: Option<&str>) -> GenRequest {
    GenRequest {
        schema_file: "schema.dbml".to_string(),
        output_file: "app.db".to_string(),
        keep_sql: true,
        data_dir: data_dir.map(str::to_string),
    }
}

#[timeout(1000)]
#[test]
fn test_gen_creates_database_and_keeps_sql() {
    let (temp_dir, config) = mounted();
    let compiler = FakeCompiler::default();
    let engine = FakeEngine::default();

    let report = generate_database(&config, &compiler, &engine, &gen_request(None)).unwrap();

    let db = temp_dir.path().join("app.db");
    assert_eq!(report.database, db);
    assert_eq!(report.merge, None);
    assert_eq!(engine.content(&db), SCHEMA_SQL);

    let sql_file = temp_dir.path().join("app.sql");
    assert_eq!(report.sql_file, Some(sql_file.clone()));
    assert_eq!(fs::read_to_string(sql_file).unwrap(), SCHEMA_SQL);

    assert_eq!(
        compiler.preprocessed.borrow().as_slice(),
        &[temp_dir.path().join("schema.dbml")]
    );
    assert_eq!(
        compiler.scratch.borrow().as_slice(),
        &[temp_dir.path().join("schema.proc.dbml")]
    );
}

#[timeout(1000)]
#[test]
fn test_gen_without_sql_file() {
    let (temp_dir, config) = mounted();
    let request = GenRequest {
        keep_sql: false,
        ..gen_request(None)
    };

    let report =
        generate_database(&config, &FakeCompiler::default(), &FakeEngine::default(), &request)
            .unwrap();
    assert_eq!(report.sql_file, None);
    assert!(!temp_dir.path().join("app.sql").exists());
}

#[timeout(1000)]
#[test]
fn test_gen_replaces_existing_database() {
    let (temp_dir, config) = mounted();
    let db = temp_dir.path().join("app.db");
    fs::write(&db, "stale").unwrap();

    generate_database(
        &config,
        &FakeCompiler::default(),
        &FakeEngine::default(),
        &gen_request(None),
    )
    .unwrap();
    assert_eq!(fs::read_to_string(db).unwrap(), "fake database");
}

#[timeout(1000)]
#[test]
fn test_gen_merges_data_dir_without_duplicates() {
    let (temp_dir, config) = mounted();
    let data = temp_dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("roles.csv"), "id\n1\n2\n").unwrap();
    fs::write(data.join("users.csv"), "id,name\n1,'ann'\n").unwrap();

    let engine = FakeEngine::default();
    let report =
        generate_database(&config, &FakeCompiler::default(), &engine, &gen_request(Some("data")))
            .unwrap();

    assert_eq!(
        report.merge,
        Some(MergeReport {
            imported: 3,
            duplicates: 1,
            replayed: 2,
        })
    );
    let content = engine.content(&temp_dir.path().join("app.db"));
    assert_eq!(
        content,
        format!(
            "{}INSERT INTO roles VALUES(2);\nINSERT INTO users VALUES(1,'ann');\n",
            SCHEMA_SQL
        )
    );
}

#[timeout(1000)]
#[test]
fn test_gen_rejects_invalid_names_before_running_tools() {
    let (_temp_dir, config) = mounted();
    let compiler = FakeCompiler::default();

    for (schema, output) in [
        ("schema.dbml", "app.sqlite"),
        ("schema.dbml", "sub/app.db"),
        ("schema.txt", "app.db"),
        ("dir/schema.dbml", "app.db"),
    ] {
        let request = GenRequest {
            schema_file: schema.to_string(),
            output_file: output.to_string(),
            keep_sql: false,
            data_dir: None,
        };
        let err = generate_database(&config, &compiler, &FakeEngine::default(), &request)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Input, "{schema} {output}");
    }
    assert!(compiler.preprocessed.borrow().is_empty());
}

#[timeout(1000)]
#[test]
fn test_gen_surfaces_engine_failure() {
    let (_temp_dir, config) = mounted();
    let err = generate_database(
        &config,
        &FakeCompiler::default(),
        &BrokenEngine,
        &gen_request(None),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Toolchain);
    assert_eq!(err.code(), "Failed");
}

#[timeout(1000)]
#[test]
fn test_export_data_writes_table_files() {
    let (temp_dir, config) = mounted();
    let engine = FakeEngine::default();
    let db = temp_dir.path().join("app.db");
    engine
        .execute(
            &db,
            &format!("{}INSERT INTO users VALUES(1,'ann');\n", SCHEMA_SQL),
        )
        .unwrap();

    let results = export_data(&config, &engine, "app.db", "out").unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(Result::is_ok));

    let out = temp_dir.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("users.csv")).unwrap(),
        "id,name\n1,'ann'\n"
    );
    assert_eq!(fs::read_to_string(out.join("roles.csv")).unwrap(), "id\n1\n");
}

#[timeout(1000)]
#[test]
fn test_export_data_reports_bad_table_and_continues() {
    let (temp_dir, config) = mounted();
    let engine = FakeEngine::default();
    engine
        .execute(
            &temp_dir.path().join("app.db"),
            &format!("{}INSERT INTO users VALUES(1);\n", SCHEMA_SQL),
        )
        .unwrap();

    let results = export_data(&config, &engine, "app.db", "out").unwrap();
    assert_eq!(results[0].as_ref().unwrap_err().code(), "ValuesOfDiffLenToCols");
    assert!(results[1].is_ok());
    assert!(!temp_dir.path().join("out").join("users.csv").exists());
}

#[timeout(1000)]
#[test]
fn test_export_data_missing_database() {
    let (_temp_dir, config) = mounted();
    let err = export_data(&config, &FakeEngine::default(), "absent.db", "out").unwrap_err();
    assert!(matches!(err, MintError::Io { action: "open database", .. }));
}

#[timeout(1000)]
#[test]
fn test_export_data_malformed_dump() {
    let (temp_dir, config) = mounted();
    let engine = FakeEngine::default();
    engine
        .execute(&temp_dir.path().join("app.db"), "INSERT INTO users 1;\n")
        .unwrap();

    let err = export_data(&config, &engine, "app.db", "out").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::DumpParse);
    assert_eq!(err.code(), "InsertParseError");
}
