//! Command-line interface for the drawbridge utility
//!
//! Provides a CLI to turn symbolic flowcharts and Gantt task tables into
//! draw.io files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use drawbridge::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use drawbridge::plugins::gantt::GanttRenderOptions;
use drawbridge::{DiagramError, DiagramKind, FileMeta, Orchestrator};

/// Drawbridge - Convert symbolic diagrams to draw.io files
#[derive(Parser)]
#[command(name = "drawbridge")]
#[command(about = "Convert symbolic flowcharts and Gantt task tables into draw.io files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error|off) [default: warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json) [default: compact]
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Pick the level and format handed to the subscriber
///
/// An explicit flag wins; otherwise `DRAWBRIDGE_LOG_LEVEL`, then `RUST_LOG`,
/// then `warn`. The format falls back to `DRAWBRIDGE_LOG_FORMAT`, then
/// `compact`.
pub fn resolve_log_settings(
    level: Option<LogLevel>,
    format: Option<LogFormat>,
    env: impl Fn(&str) -> Option<String>,
) -> (String, String) {
    let level = level
        .map(|l| l.as_str().to_string())
        .or_else(|| env(LOG_LEVEL_ENV))
        .or_else(|| env("RUST_LOG"))
        .unwrap_or_else(|| LogLevel::Warn.as_str().to_string());
    let format = format
        .map(|f| f.as_str().to_string())
        .or_else(|| env(LOG_FORMAT_ENV))
        .unwrap_or_else(|| LogFormat::Compact.as_str().to_string());
    (level, format)
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Diagram kind accepted by `inspect`
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum KindChoice {
    Flowchart,
    Gantt,
}

impl From<KindChoice> for DiagramKind {
    fn from(value: KindChoice) -> Self {
        match value {
            KindChoice::Flowchart => DiagramKind::Flowchart,
            KindChoice::Gantt => DiagramKind::Gantt,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert stage notation to a draw.io flowchart
    Flowchart {
        /// Input file (use - for stdin; omit to type the diagram interactively)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "flowchart.drawio")]
        output: PathBuf,
    },

    /// Convert a task table to a draw.io Gantt chart
    Gantt {
        /// Input file (use - for stdin; omit to paste the table interactively)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "gantt.drawio")]
        output: PathBuf,

        /// Draw arrows from each predecessor to its dependent task
        #[arg(long)]
        show_dependencies: bool,
    },

    /// Print the parsed model as JSON without rendering
    Inspect {
        /// Diagram kind of the input
        #[arg(value_enum)]
        kind: KindChoice,

        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Current UTC time in the format draw.io writes to `mxfile/@modified`
pub fn utc_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Read lines until the first blank line or end of input
pub fn read_until_blank<R: BufRead>(reader: R) -> io::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Main CLI application
pub struct DrawbridgeApp {
    orchestrator: Orchestrator,
}

impl DrawbridgeApp {
    /// Create a new application instance stamping documents with the current time
    pub fn new() -> Self {
        Self::with_orchestrator(
            Orchestrator::new().with_meta(FileMeta::default().with_modified(utc_timestamp())),
        )
    }

    /// Create a new application instance around a configured orchestrator
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        let (log_level, log_format) =
            resolve_log_settings(cli.log_level, cli.log_format, |key| std::env::var(key).ok());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Drawbridge v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Flowchart { input, output } => {
                self.flowchart_command(input, &output, cli.verbose)
            }
            Commands::Gantt {
                input,
                output,
                show_dependencies,
            } => self.gantt_command(input, &output, show_dependencies, cli.verbose),
            Commands::Inspect { kind, input } => {
                self.inspect_command(kind.into(), input, cli.verbose)
            }
        }
    }

    /// Handle the flowchart command
    fn flowchart_command(
        &self,
        input: Option<PathBuf>,
        output: &Path,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input, DiagramKind::Flowchart)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let conversion = self
            .orchestrator
            .convert(DiagramKind::Flowchart, &content, Some(output))?;

        if verbose {
            eprintln!("Placed {} nodes", conversion.element_count);
        }
        println!("Wrote draw.io file: {}", output.display());
        Ok(())
    }

    /// Handle the gantt command
    fn gantt_command(
        &self,
        input: Option<PathBuf>,
        output: &Path,
        show_dependencies: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input, DiagramKind::Gantt)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let orchestrator = self.orchestrator.clone().with_gantt_options(
            GanttRenderOptions::default().with_dependencies(show_dependencies),
        );
        let conversion = orchestrator.convert(DiagramKind::Gantt, &content, Some(output))?;

        println!("Wrote draw.io file: {}", output.display());
        println!("Tasks: {}", conversion.element_count);
        Ok(())
    }

    /// Handle the inspect command
    fn inspect_command(
        &self,
        kind: DiagramKind,
        input: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input, kind)?;

        if verbose {
            eprintln!("Inspecting {} bytes as {}", content.len(), kind);
        }

        let json = self.inspect(kind, &content)?;
        println!("{}", json);
        Ok(())
    }

    /// Parse `content` and describe the resulting model as pretty JSON
    pub fn inspect(&self, kind: DiagramKind, content: &str) -> Result<String> {
        let model = match kind {
            DiagramKind::Flowchart => serde_json::to_value(
                self.orchestrator
                    .parse::<drawbridge::plugins::flowchart::FlowchartDiagram>(content)?,
            )?,
            DiagramKind::Gantt => serde_json::to_value(
                self.orchestrator
                    .parse::<drawbridge::plugins::gantt::GanttDiagram>(content)?,
            )?,
        };
        let report = serde_json::json!({
            "kind": kind.as_str(),
            "model": model,
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Read input from a file, from stdin (`-`), or interactively
    pub fn read_input(&self, input: Option<PathBuf>, kind: DiagramKind) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() == "-" => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read standard input")?;
                Ok(content)
            }
            Some(path) => {
                if !path.exists() {
                    return Err(DiagramError::input_not_found(path).into());
                }
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read input file '{}'", path.display()))
            }
            None => {
                if crossterm::tty::IsTty::is_tty(&io::stdin()) {
                    eprintln!("Enter the {} input; finish with an empty line:", kind);
                    io::stderr().flush()?;
                }
                read_until_blank(io::stdin().lock()).context("Failed to read standard input")
            }
        }
    }

    /// Get a reference to the orchestrator (for testing)
    #[cfg(test)]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

impl Default for DrawbridgeApp {
    fn default() -> Self {
        Self::new()
    }
}
