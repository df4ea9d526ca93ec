//! Command line tool to interface with sqlite3 database files.
//!
//! Provides commands for:
//! - Generating a database from a DBML schema (see https://docs.dbdiagram.io/dbml),
//!   optionally merging a directory of table CSV files into it
//! - Exporting the rows of a database into a directory of table CSV files

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dbmint_core::config::MintConfig;
use dbmint_core::error::MintError;
use dbmint_core::toolchain::{DbmlCompiler, SqliteCli};
use dbmint_core::workflow::{export_data, generate_database, GenRequest};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "dbmint", author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity level (use -v, -vv, or -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory all file and directory names are relative to
    #[arg(long, default_value = "/mnt", global = true)]
    mount_dir: PathBuf,

    /// C preprocessor used on the schema
    #[arg(long, default_value = "cpp", global = true)]
    preprocessor: String,

    /// DBML to SQL generator
    #[arg(long, default_value = "dbml_sqlite", global = true)]
    schema_generator: String,

    /// SQL engine CLI
    #[arg(long, default_value = "sqlite3", global = true)]
    sql_engine: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates a new db given a dbml schema file
    #[command(name = "gen")]
    Gen {
        /// The name of the schema.dbml file to generate a db from
        dbml_schema_filename: String,

        /// The name of the file to output the *.db to
        #[arg(short, long)]
        output: String,

        /// Omits outputting the generated sql file that was used to create the db
        #[arg(long)]
        no_sql: bool,

        /// A directory that contains table row csv files. Check command export_data to generate this from a db
        #[arg(short, long)]
        datadir: Option<String>,
    },

    /// Exports data added to a sqlite3 db
    #[command(name = "export_data")]
    ExportData {
        /// The *.db file to use to check for data in
        db_filename: String,

        /// The name of the dir to output table rows to. Will create if non-existent.
        #[arg(short, long)]
        datadir: String,
    },

    /// Exports validator according to the custom EXT command checks in the schema.dbml
    #[command(name = "export_validator")]
    ExportValidator {
        /// The name of the schema.dbml file to generate a validator for
        dbml_schema_filename: String,

        /// The validator language
        #[arg(short, long, value_enum)]
        format: ValidatorFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ValidatorFormat {
    #[value(name = "Python")]
    Python,
    #[value(name = "GDScript")]
    GdScript,
}

impl Cli {
    fn config(&self) -> MintConfig {
        MintConfig {
            mount_dir: self.mount_dir.clone(),
            preprocessor: self.preprocessor.clone(),
            schema_generator: self.schema_generator.clone(),
            sql_engine: self.sql_engine.clone(),
        }
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Input validation failures end the process with exit code 1.
fn exit_on_input_error<T>(result: Result<T, MintError>) -> anyhow::Result<T> {
    match result {
        Err(MintError::Input(e)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        other => Ok(other?),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();

    match cli.command {
        Commands::Gen {
            dbml_schema_filename,
            output,
            no_sql,
            datadir,
        } => {
            let request = GenRequest {
                schema_file: dbml_schema_filename,
                output_file: output,
                keep_sql: !no_sql,
                data_dir: datadir,
            };
            let compiler = DbmlCompiler::from_config(&config);
            let engine = SqliteCli::from_config(&config);

            let report = exit_on_input_error(generate_database(
                &config, &compiler, &engine, &request,
            ))
            .with_context(|| format!("Failed to generate {}", request.output_file))?;

            tracing::info!("Database ready at {}", report.database.display());
        }
        Commands::ExportData {
            db_filename,
            datadir,
        } => {
            let engine = SqliteCli::from_config(&config);
            let results = exit_on_input_error(export_data(&config, &engine, &db_filename, &datadir))
                .with_context(|| format!("Failed to export data of {}", db_filename))?;

            let failed = results.iter().filter(|r| r.is_err()).count();
            tracing::info!(
                "Exported {} of {} tables to {}",
                results.len() - failed,
                results.len(),
                datadir
            );
        }
        Commands::ExportValidator {
            dbml_schema_filename,
            format,
        } => {
            tracing::debug!(
                "Requested {:?} validator for {}",
                format,
                dbml_schema_filename
            );
            println!("export_validator: Not implemented");
        }
    }

    Ok(())
}
