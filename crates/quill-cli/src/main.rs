//! quill CLI
//!
//! Checks SQL files for syntax errors and prints their parsed structure.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use quill_sql_core::ast::dump;
use quill_sql_core::parser::{ParamScope, Retention};
use quill_sql_core::schema::TableSchema;
use quill_sql_core::{ParseOutput, ParserOptions, Schema};

/// SQL schema checker.
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Lifetime of named parameter type bindings.
    #[arg(long, value_enum, default_value_t = Scope::Session)]
    param_scope: Scope,

    /// Keep only CREATE TABLE statements.
    #[arg(long)]
    ddl_only: bool,

    /// Output format.
    #[arg(long, value_enum, env = "QUILL_FORMAT", default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    /// Types declared once stay visible for the whole file.
    Session,
    /// Types are forgotten after each statement.
    Statement,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Report syntax errors; exits non-zero when any file has one.
    Check {
        /// Files to check.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the syntax tree of every statement.
    Dump {
        /// File to parse.
        file: PathBuf,
    },

    /// Print the tables defined by a file.
    Schema {
        /// File to parse.
        file: PathBuf,
    },
}

impl Cli {
    fn options(&self) -> ParserOptions {
        let scope = match self.param_scope {
            Scope::Session => ParamScope::Session,
            Scope::Statement => ParamScope::Statement,
        };
        let retention = if self.ddl_only {
            Retention::DdlOnly
        } else {
            Retention::All
        };
        ParserOptions::new().param_scope(scope).retention(retention)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

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

    let options = cli.options();

    match &cli.command {
        Commands::Check { files } => {
            let mut failed = 0usize;
            let mut reports = Vec::new();
            for file in files {
                let out = parse_file(file, options)?;
                if !out.errors.is_empty() {
                    failed += 1;
                }
                match cli.format {
                    Format::Text => {
                        for error in &out.errors {
                            println!(
                                "{}:{}:{}: {}",
                                file.display(),
                                error.line,
                                error.column,
                                error.message
                            );
                        }
                    }
                    Format::Json => reports.push(serde_json::json!({
                        "file": file.display().to_string(),
                        "statements": out.statements.len(),
                        "errors": out.errors,
                    })),
                }
            }
            if cli.format == Format::Json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
            info!(files = files.len(), failed, "check finished");
            Ok(if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Dump { file } => {
            let out = parse_file(file, options)?;
            for statement in &out.statements {
                print!("{}", dump(statement));
            }
            report_errors(file, &out);
            Ok(exit_code(&out))
        }

        Commands::Schema { file } => {
            let out = parse_file(file, options)?;
            let schema = Schema::from_statements(&out.statements);
            match cli.format {
                Format::Text => {
                    for table in schema.tables() {
                        print!("{}", describe_table(table));
                    }
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
            }
            report_errors(file, &out);
            Ok(exit_code(&out))
        }
    }
}

fn parse_file(path: &Path, options: ParserOptions) -> anyhow::Result<ParseOutput> {
    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(file = %path.display(), bytes = sql.len(), "parsing");
    Ok(quill_sql_core::Parser::with_options(&sql, options).parse())
}

fn report_errors(path: &Path, out: &ParseOutput) {
    for error in &out.errors {
        eprintln!("{}:{}:{}: {}", path.display(), error.line, error.column, error.message);
    }
}

fn exit_code(out: &ParseOutput) -> ExitCode {
    if out.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn describe_table(table: &TableSchema) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", table.qualified_name());
    for column in &table.columns {
        let mut flags = Vec::new();
        if column.primary_key {
            flags.push("primary key");
        }
        if column.unique {
            flags.push("unique");
        }
        if !column.nullable {
            flags.push("not null");
        }
        if column.auto_increment {
            flags.push("auto increment");
        }
        let _ = write!(text, "  {} {}", column.name, column.type_name);
        if !flags.is_empty() {
            let _ = write!(text, " ({})", flags.join(", "));
        }
        text.push('\n');
    }
    if table.primary_key.len() > 1 {
        let _ = writeln!(text, "  primary key ({})", table.primary_key.join(", "));
    }
    for key in &table.unique_keys {
        if key.columns.len() > 1 {
            let _ = writeln!(text, "  unique ({})", key.columns.join(", "));
        }
    }
    for fk in &table.foreign_keys {
        let _ = writeln!(
            text,
            "  foreign key ({}) references {}({}) on delete {} on update {}",
            fk.columns.join(", "),
            fk.references,
            fk.referenced_columns.join(", "),
            fk.on_delete,
            fk.on_update
        );
    }
    text
}
