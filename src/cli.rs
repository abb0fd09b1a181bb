use crate::config::load_config;
use crate::ir::DiagramKind;
use crate::pipeline::Pipeline;
use crate::text_metrics::FontTextMeasurer;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mmdl",
    version,
    about = "Lay out Mermaid diagram models and dump the geometry as JSON"
)]
pub struct Args {
    /// Input diagram model (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Diagram kind; read from the model's "kind" field when omitted
    #[arg(short = 'k', long = "kind")]
    pub kind: Option<String>,

    /// Measure text with this installed font family instead of the built-in table
    #[arg(long = "font")]
    pub font: Option<String>,

    /// Log at info level regardless of RUST_LOG
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    // A second init (e.g. when embedded in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let kind = match args.kind.as_deref() {
        Some(name) => DiagramKind::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown diagram kind '{name}'"))?,
        None => detect_kind(&input)?,
    };

    let mut pipeline = Pipeline::json(config);
    if let Some(family) = args.font {
        let mut measurer = FontTextMeasurer::new(family);
        measurer.line_height = pipeline.config().label_line_height;
        pipeline = pipeline.with_measurer(Arc::new(measurer));
    }
    tracing::info!(%kind, "laying out diagram");
    let output = pipeline.run(kind, &input)?;
    write_output(&output, args.output.as_deref())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        None => read_stdin(),
        Some(path) if path == Path::new("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display())),
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn detect_kind(input: &str) -> Result<DiagramKind> {
    let value: serde_json::Value =
        serde_json::from_str(input).context("input is not a JSON diagram model")?;
    let name = value
        .get("kind")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("diagram model has no \"kind\" field; pass --kind"))?;
    DiagramKind::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown diagram kind '{name}'"))
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{output}")?;
            Ok(())
        }
    }
}
