//! Timebound CLI
//!
//! Command-line interface for the time macro engine:
//! - Expand time macros in a query
//! - Classify a column
//! - Resolve a time range
//! - Generate a config file

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use timebound::config::{generate_default_config, Config};
use timebound::logging::init_logging;
use timebound::processor::{ProcessRequest, ProcessResult, QueryProcessor};
use timebound::range::{resolve, TimeRangeSpec};
use timebound::schema::{classify, ColumnDescriptor};

#[derive(Parser)]
#[command(name = "timebound")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve time ranges and substitute time macros in SQL queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Substitute time macros in a query
    Expand {
        /// Query text, or "-" to read from stdin
        query: String,
        /// Time column name
        #[arg(long, requires = "column_type")]
        column: Option<String>,
        /// Declared type of the time column (e.g. BIGINT, DateTime64(3))
        #[arg(long = "column-type", requires = "column")]
        column_type: Option<String>,
        /// Range start (e.g. now-1h, 2024-01-01)
        #[arg(long, default_value = "now-1h")]
        from: String,
        /// Range end
        #[arg(long, default_value = "now")]
        to: String,
        /// Timezone for absolute times (default: from config)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Classify a column by name and declared type
    Classify {
        /// Column name
        #[arg(long)]
        name: String,
        /// Declared type
        #[arg(long = "type")]
        declared_type: String,
    },

    /// Resolve a time range to concrete instants
    Resolve {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Timezone for absolute times (default: from config)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Exit code when errors keep the query from running
const BLOCKED_EXIT_CODE: i32 = 2;

/// Process a query from the command line
///
/// A range that does not parse blocks the query like any other range error.
fn expand_query(
    processor: &QueryProcessor,
    query: String,
    column: Option<(String, String)>,
    from: &str,
    to: &str,
    timezone: Option<String>,
) -> ProcessResult {
    let range = match TimeRangeSpec::parse(from, to, "") {
        Ok(range) => range,
        Err(e) => {
            return ProcessResult {
                query,
                errors: vec![format!("Invalid time range '{} to {}': {}", from, to, e)],
                warnings: Vec::new(),
                max_data_points: None,
            }
        }
    };

    let mut request = ProcessRequest::new(query, range);
    if let Some((name, declared_type)) = column {
        request = request.time_column(ColumnDescriptor::new(name, declared_type));
    }
    if let Some(tz) = timezone {
        request = request.timezone(tz);
    }
    processor.process(&request)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Expand {
            query,
            column,
            column_type,
            from,
            to,
            timezone,
        } => {
            let query = if query == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read query from stdin")?;
                buf
            } else {
                query
            };

            let processor = QueryProcessor::new(config.processor.clone());
            let column = column.zip(column_type);
            let result = expand_query(&processor, query, column, &from, &to, timezone);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Text => {
                    for warning in &result.warnings {
                        eprintln!("warning: {}", warning);
                    }
                    for error in &result.errors {
                        eprintln!("error: {}", error);
                    }
                    if !result.is_blocked() {
                        println!("{}", result.query);
                    }
                }
            }

            if result.is_blocked() {
                std::process::exit(BLOCKED_EXIT_CODE);
            }
        }

        Commands::Classify {
            name,
            declared_type,
        } => {
            let column = ColumnDescriptor::new(name, declared_type);
            let classification = classify(&column);

            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "column": column,
                        "classification": classification,
                        "filterable": classification.is_filterable(),
                    }))?
                ),
                OutputFormat::Text => println!("{}: {}", column, classification),
            }
        }

        Commands::Resolve { from, to, timezone } => {
            let timezone = timezone.unwrap_or_else(|| config.processor.default_timezone.clone());
            let spec = TimeRangeSpec::parse(&from, &to, &timezone)?;
            let range = resolve(&spec, Utc::now())?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&range)?),
                OutputFormat::Text => {
                    println!("from: {} ({} ms)", range.from.to_rfc3339(), range.from_millis());
                    println!("to:   {} ({} ms)", range.to.to_rfc3339(), range.to_millis());
                    if range.swapped {
                        println!("(start was after end; swapped)");
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_expand() {
        let cli = Cli::try_parse_from([
            "timebound",
            "--format",
            "json",
            "expand",
            "SELECT $__timeFilter",
            "--column",
            "ts_ms",
            "--column-type",
            "BIGINT",
            "--from",
            "now-5m",
        ])
        .unwrap();

        assert!(cli.format == OutputFormat::Json);
        match cli.command {
            Commands::Expand {
                column, from, to, ..
            } => {
                assert_eq!(column.as_deref(), Some("ts_ms"));
                assert_eq!(from, "now-5m");
                assert_eq!(to, "now");
            }
            _ => panic!("expected expand"),
        }
    }

    #[test]
    fn test_expand_bad_range_is_blocked() {
        let processor = QueryProcessor::default();
        let result = expand_query(
            &processor,
            "SELECT * FROM t WHERE $__timeFilter".to_string(),
            Some(("ts_ms".to_string(), "BIGINT".to_string())),
            "now-5x",
            "now",
            None,
        );

        assert!(result.is_blocked());
        assert!(result.errors[0].contains("now-5x"));
        assert_eq!(result.query, "SELECT * FROM t WHERE $__timeFilter");

        // Same JSON shape as any other result
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_expand_substitutes_column() {
        let processor = QueryProcessor::default();
        let result = expand_query(
            &processor,
            "SELECT $__timeField FROM t".to_string(),
            Some(("ts_ms".to_string(), "BIGINT".to_string())),
            "now-1h",
            "now",
            Some("UTC".to_string()),
        );

        assert!(!result.is_blocked());
        assert_eq!(result.query, "SELECT ts_ms FROM t");
    }

    #[test]
    fn test_column_requires_type() {
        let result = Cli::try_parse_from(["timebound", "expand", "SELECT 1", "--column", "ts"]);
        assert!(result.is_err());
    }
}
