use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use schemaviz::classify::TableRole;
use schemaviz::layout::{LayoutConfig, LayoutKind};
use schemaviz::sql::{normalize_ddl, parse_sql_with_diagnostics};
use schemaviz::{build_diagram, DiagramOptions};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Turn SQL DDL into a schema graph and a diagram layout.
#[derive(Parser, Debug)]
#[command(name = "schemaviz", author, version, about, long_about = None)]
struct Cli {
    /// Output file (default: stdout)
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed schema as JSON
    Parse {
        /// SQL file, or - for stdin
        input: PathBuf,
    },

    /// Print the schema, table positions and edge connections as JSON
    Layout {
        /// SQL file, or - for stdin
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the CREATE TABLE statements in normalized form
    Normalize {
        /// SQL file, or - for stdin
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Layout algorithm: grid, hierarchical, circular, modular or force
    #[arg(short, long, default_value_t = LayoutKind::Hierarchical)]
    layout: LayoutKind,

    /// Distance between neighbouring tables in pixels
    #[arg(long, default_value_t = 450.0)]
    spacing: f64,

    /// Canvas margin in pixels
    #[arg(long, default_value_t = 100.0)]
    padding: f64,

    #[arg(long, default_value_t = 1920.0)]
    viewport_width: f64,

    #[arg(long, default_value_t = 1080.0)]
    viewport_height: f64,

    /// Seed for the force layout
    #[arg(long)]
    seed: Option<u64>,

    /// Snap tables onto an even grid after layout
    #[arg(long)]
    distribute: bool,

    /// Push overlapping tables apart after layout
    #[arg(long)]
    resolve_overlaps: bool,

    /// Leave a table out of the diagram (repeatable)
    #[arg(long, value_name = "TABLE")]
    hide: Vec<String>,

    /// Keep only tables with this role: junction, lookup, core, standard (repeatable)
    #[arg(long, value_name = "ROLE")]
    role: Vec<TableRole>,
}

impl LayoutArgs {
    fn options(self) -> DiagramOptions {
        let mut config = LayoutConfig::default()
            .with_spacing(self.spacing)
            .with_padding(self.padding)
            .with_viewport(self.viewport_width, self.viewport_height);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        DiagramOptions {
            kind: self.layout,
            config,
            hidden: self.hide,
            roles: self.role,
            distribute: self.distribute,
            resolve_overlaps: self.resolve_overlaps,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let text = match cli.command {
        Command::Parse { input } => {
            let output = parse_sql_with_diagnostics(&read_input(&input)?);
            info!(
                tables = output.schema.tables.len(),
                relationships = output.schema.relationships.len(),
                "parsed"
            );
            if output.schema.is_empty() {
                warn!("no CREATE TABLE statements found");
            }
            to_json(&output.schema)?
        }
        Command::Layout { input, layout } => {
            let schema = parse_sql_with_diagnostics(&read_input(&input)?).schema;
            let diagram = build_diagram(&schema, &layout.options())?;
            to_json(&diagram)?
        }
        Command::Normalize { input } => normalize_ddl(&read_input(&input)?),
    };

    write_output(cli.output.as_deref(), &text)
}
