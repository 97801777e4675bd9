//! # tabset-cli
//!
//! Convert tabular data between formats.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tabset_core::{Databook, Dataset, FormatOptions, Payload, Registry};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// tabset - convert tabular data between formats
#[derive(Parser)]
#[command(name = "tabset")]
#[command(author, version, about = "Convert tabular data between formats", long_about = None)]
struct Cli {
    /// Input file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Input format (detected when omitted)
    #[arg(short = 'f', long = "from", value_name = "FORMAT")]
    from: Option<String>,

    /// Output format (taken from the output file extension when omitted)
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    to: Option<String>,

    /// Write to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Treat the first input row as data, not headers
    #[arg(long = "no-headers")]
    no_headers: bool,

    /// Convert every sheet of a workbook
    #[arg(short = 'b', long = "book")]
    book: bool,

    /// Pretty-print structured output
    #[arg(long)]
    pretty: bool,

    /// List the available formats and exit
    #[arg(long = "list-formats")]
    list_formats: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let registry = Registry::global();

    if cli.list_formats {
        list_formats(registry);
        return Ok(());
    }

    let to = output_format(&cli, registry)?;
    let input = read_input(cli.file.as_deref())?;
    let from = cli.from.clone().or_else(|| {
        cli.file
            .as_deref()
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .and_then(|ext| registry.for_extension(ext))
            .map(|h| h.name.to_string())
    });

    let options = FormatOptions::new()
        .with_headers(!cli.no_headers)
        .with_pretty(cli.pretty);

    let payload = if cli.book {
        let book = Databook::load_with(registry, &input, from.as_deref(), &options)
            .context("Failed to load input as a databook")?;
        info!(sheets = book.size(), "loaded databook");
        book.export_with(registry, &to, &options)
            .with_context(|| format!("Failed to export databook as {to}"))?
    } else {
        let dataset = Dataset::load_with(registry, &input, from.as_deref(), &options)
            .context("Failed to load input")?;
        info!(rows = dataset.height(), cols = dataset.width(), "loaded dataset");
        dataset
            .export_with(registry, &to, &options)
            .with_context(|| format!("Failed to export as {to}"))?
    };

    write_output(cli.output.as_deref(), &payload)
}

fn list_formats(registry: &Registry) {
    for name in registry.names() {
        let Some(handler) = registry.get(name) else {
            continue;
        };
        let mut abilities = Vec::new();
        if handler.import_set.is_some() {
            abilities.push("import");
        }
        if handler.export_set.is_some() {
            abilities.push("export");
        }
        if handler.supports_book() {
            abilities.push("book");
        }
        println!("{name:<8} {}", abilities.join(", "));
    }
}

fn output_format(cli: &Cli, registry: &Registry) -> Result<String> {
    if let Some(to) = &cli.to {
        return Ok(to.clone());
    }
    let from_extension = cli
        .output
        .as_deref()
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| registry.for_extension(ext))
        .map(|h| h.name.to_string());
    match from_extension {
        Some(name) => Ok(name),
        None => bail!("No output format: pass --to FORMAT or an --output file with a known extension"),
    }
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(output: Option<&Path>, payload: &Payload) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, payload.as_bytes())
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload.as_bytes())?;
            if matches!(payload, Payload::Text(text) if !text.ends_with('\n')) {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
