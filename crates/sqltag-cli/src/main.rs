//! sqltag CLI
//!
//! Renders SQLite build scripts from annotated schema documents.

mod document;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use document::SchemaDocument;

/// Annotation-driven SQLite schema compiler.
#[derive(Parser)]
#[command(name = "sqltag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema document (JSON). Use `-` for stdin.
    #[arg(short, long, env = "SQLTAG_SCHEMA", default_value = "-")]
    input: PathBuf,

    /// Output file (stdout if not specified).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full build script: pragmas, tables, then indexes.
    Build,

    /// Print the CREATE TABLE statement of one model.
    Table {
        /// Model name as declared in the document.
        name: String,
    },

    /// Build every model and report all errors without printing SQL.
    Check,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read schema document from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema document {}", path.display()))
}

fn write_output(path: Option<&Path>, sql: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, sql)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => std::io::stdout().write_all(sql.as_bytes())?,
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let document = SchemaDocument::from_json(&read_input(&cli.input)?)?;

    match &cli.command {
        Commands::Build => {
            let script = document.schema()?.build()?;
            write_output(cli.output.as_deref(), &script)?;
        }

        Commands::Table { name } => {
            let sql = document.table_sql(name)?;
            write_output(cli.output.as_deref(), &sql)?;
        }

        Commands::Check => {
            let failures = document.check()?;
            if !failures.is_empty() {
                for failure in &failures {
                    error!("{}: {}", failure.model, failure.error);
                }
                anyhow::bail!("{} model(s) failed to build", failures.len());
            }
            info!("All {} model(s) are valid.", document.models.len());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    run(&cli)
}
