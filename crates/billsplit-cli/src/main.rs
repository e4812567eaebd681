// CLI tool has numeric conversions for progress display.
// These are safe because counts and sizes are well within representable ranges.
#![allow(
    clippy::cast_precision_loss,       // f64 sufficient for display purposes
    clippy::needless_pass_by_value,    // clap requires owned values
    clippy::fn_params_excessive_bools, // CLI commands have many boolean flags
    clippy::must_use_candidate,        // CLI functions don't need must_use
)]

//! Billsplit CLI - rename and inspect travel bill PDFs
//!
//! Reads e-ticket itineraries and bills, extracts passenger names and
//! invoice identifiers, and renames documents to `{name}_{suffix}.pdf`.

mod config;

use anyhow::{Context, Result};
use billsplit_archive::{walk_archive, WalkOptions, DEFAULT_MAX_DEPTH};
use billsplit_backend::{
    extract_bill_records, failure_outcomes, process_document, rename_batch, BatchItem,
    DocumentRenderer, ItemOutcome, ItemStatus, PipelineOptions, DEFAULT_OUTPUT_NAME,
};
use billsplit_core::{
    discard, render_report, EntryKind, PipelineEvent, RawDocument, ReportOptions,
    Total,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Format bytes as human-readable size (e.g., "1.5 MB")
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Default `env_logger` filter for this verbosity
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Resolve output format from CLI, config, or default
    fn resolve(cli_value: Option<Self>, config_value: Option<&str>) -> Self {
        if let Some(format) = cli_value {
            return format;
        }
        match config_value.map(str::to_lowercase).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "billsplit")]
#[command(author, version, about = "Rename and inspect travel bill PDFs", long_about = None)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the text and entities of a PDF
    Parse {
        /// Input PDF
        input: PathBuf,

        /// Maximum pages to process
        #[arg(long)]
        max_pages: Option<usize>,

        /// Join pages with a blank line instead of the page marker
        #[arg(long)]
        no_separator: bool,

        /// Log every raw text fragment
        #[arg(long)]
        debug: bool,

        /// Print the complete joined text after the page previews
        #[arg(long)]
        full_text: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Rename PDFs to {name}_{suffix}.pdf and package them into a ZIP
    #[command(long_about = "Rename PDFs to {name}_{suffix}.pdf and package them into a ZIP.\n\
                      \n\
                      Inputs may be ZIP archives (nested ZIPs are searched) or PDF files.\n\
                      Documents whose passenger name or file suffix cannot be found are\n\
                      left out of the output and reported as skipped.")]
    Rename {
        /// Input ZIP archives or PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output ZIP path
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        output: PathBuf,

        /// Maximum pages to process per document
        #[arg(long)]
        max_pages: Option<usize>,

        /// Deepest nested ZIP level to open
        #[arg(long)]
        max_depth: Option<usize>,

        /// Exit successfully even if some documents fail
        #[arg(long)]
        continue_on_error: bool,

        /// Output format for the per-item report
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Extract per-page ticket and invoice numbers from a bill PDF
    Invoices {
        /// Input PDF
        input: PathBuf,

        /// Maximum pages to process
        #[arg(long)]
        max_pages: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List the PDFs found inside a ZIP archive
    List {
        /// Input ZIP archive
        input: PathBuf,

        /// Deepest nested ZIP level to open
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn main() -> Result<()> {
    // Load configuration files
    let (user_config, project_config) = Config::discover_configs();
    let config = Config::merge(user_config, project_config);

    let args = Args::parse();

    // Extract global verbosity settings
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .init();

    match args.command {
        Commands::Parse {
            input,
            max_pages,
            no_separator,
            debug,
            full_text,
            format,
        } => {
            let options = pipeline_options(&config, max_pages, no_separator, debug);
            let format = OutputFormat::resolve(format, config.output_format());
            parse_command(&input, &options, full_text, format, verbosity)
        }

        Commands::Rename {
            inputs,
            output,
            max_pages,
            max_depth,
            continue_on_error,
            format,
        } => {
            let options = pipeline_options(&config, max_pages, false, false);
            let walk = walk_options(&config, max_depth);
            let format = OutputFormat::resolve(format, config.output_format());
            rename_command(&inputs, &output, &options, &walk, continue_on_error, format, verbosity)
        }

        Commands::Invoices {
            input,
            max_pages,
            format,
        } => {
            let options = pipeline_options(&config, max_pages, false, false);
            let format = OutputFormat::resolve(format, config.output_format());
            invoices_command(&input, &options, format)
        }

        Commands::List {
            input,
            max_depth,
            format,
        } => {
            let walk = walk_options(&config, max_depth);
            let format = OutputFormat::resolve(format, config.output_format());
            list_command(&input, &walk, format, verbosity)
        }
    }
}

/// Resolve pipeline options with precedence: CLI > config > defaults
fn pipeline_options(
    config: &Config,
    max_pages: Option<usize>,
    no_separator: bool,
    debug: bool,
) -> PipelineOptions {
    let pipeline = config.pipeline();
    PipelineOptions::default()
        .with_separator(!no_separator && pipeline.include_separator.unwrap_or(true))
        .with_max_pages(max_pages.or(pipeline.max_pages))
        .with_debug(debug || pipeline.debug.unwrap_or(false))
}

/// Resolve archive traversal options with precedence: CLI > config > defaults
fn walk_options(config: &Config, max_depth: Option<usize>) -> WalkOptions {
    WalkOptions::default().with_max_depth(
        max_depth
            .or_else(|| config.max_depth())
            .unwrap_or(DEFAULT_MAX_DEPTH),
    )
}

#[cfg(feature = "pdfium")]
fn create_renderer() -> Result<Box<dyn DocumentRenderer>> {
    let renderer = billsplit_backend::PdfiumRenderer::new()
        .context("PDF text extraction needs the pdfium shared library")?;
    Ok(Box::new(renderer))
}

#[cfg(not(feature = "pdfium"))]
fn create_renderer() -> Result<Box<dyn DocumentRenderer>> {
    anyhow::bail!("billsplit was built without the `pdfium` feature; PDF text extraction is unavailable")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| billsplit_core::DEFAULT_DOCUMENT_NAME.to_string(), |n| n.to_string_lossy().into_owned())
}

fn read_document(path: &Path) -> Result<RawDocument> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(RawDocument::new(file_name_of(path), bytes))
}

fn spinner(verbosity: Verbosity) -> ProgressBar {
    if verbosity.should_show_output() {
        let sp = ProgressBar::new_spinner();
        sp.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("template is compile-time constant"),
        );
        sp
    } else {
        ProgressBar::hidden()
    }
}

fn parse_command(
    input: &Path,
    options: &PipelineOptions,
    full_text: bool,
    format: OutputFormat,
    verbosity: Verbosity,
) -> Result<()> {
    let doc = read_document(input)?;
    let renderer = create_renderer()?;

    let progress = spinner(verbosity);
    let sink = |event: &PipelineEvent| {
        if let PipelineEvent::PageExtracted {
            page_number,
            total: Total::Known(total),
            ..
        } = event
        {
            progress.set_message(format!("Extracting page {page_number}/{total}"));
        }
    };
    let result = process_document(renderer.as_ref(), &doc, options, &sink);
    progress.finish_and_clear();
    let outcome = result?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => {
            let report_options = ReportOptions {
                print_full_text: full_text,
                ..ReportOptions::default()
            };
            print!("{}", render_report(&outcome.parsed, &report_options));
            let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".dimmed().to_string());
            println!("{} {}", "Person name:".bold(), show(&outcome.entities.person_name));
            println!("{} {}", "Ticket number:".bold(), show(&outcome.entities.ticket_number));
            println!("{} {}", "Invoice number:".bold(), show(&outcome.entities.invoice_number));
            match &outcome.decision.new_name {
                Some(new_name) => println!("{} {}", "Rename to:".green().bold(), new_name),
                None => println!("{} keeping {}", "Rename skipped:".yellow().bold(), outcome.decision.original_name),
            }
        }
    }
    Ok(())
}

/// Documents to rename, plus outcomes for inputs that could not be read.
#[derive(Default)]
struct RenameInputs {
    items: Vec<BatchItem>,
    failures: Vec<ItemOutcome>,
}

impl RenameInputs {
    fn fail(&mut self, path: String, reason: String) {
        log::warn!("Skipping {path}: {reason}");
        self.failures.push(ItemOutcome {
            path,
            status: ItemStatus::Failed { reason },
        });
    }
}

/// Read every input; an unreadable input becomes a failed item.
fn collect_rename_inputs(inputs: &[PathBuf], walk: &WalkOptions) -> RenameInputs {
    let prefix_paths = inputs.len() > 1;
    let mut collected = RenameInputs::default();

    for input in inputs {
        let input_name = if prefix_paths {
            file_name_of(input)
        } else {
            input.display().to_string()
        };
        match EntryKind::classify(&input.to_string_lossy()) {
            EntryKind::Archive => {
                let bytes = match fs::read(input) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        collected.fail(input_name, format!("Failed to read: {e}"));
                        continue;
                    }
                };
                let result = match walk_archive(&bytes, walk, &discard) {
                    Ok(result) => result,
                    Err(e) => {
                        collected.fail(input_name, format!("Failed to open archive: {e}"));
                        continue;
                    }
                };
                let prefix = |path: String| if prefix_paths { format!("{input_name}/{path}") } else { path };
                for entry in result.entries {
                    let mut item = BatchItem::from(entry);
                    item.path = prefix(item.path);
                    collected.items.push(item);
                }
                for mut failure in failure_outcomes(result.failures) {
                    failure.path = prefix(failure.path);
                    collected.failures.push(failure);
                }
            }
            EntryKind::Document => match fs::read(input) {
                Ok(bytes) => collected
                    .items
                    .push(BatchItem::from(RawDocument::new(file_name_of(input), bytes))),
                Err(e) => collected.fail(input_name, format!("Failed to read: {e}")),
            },
            EntryKind::Other => {
                collected.fail(input_name, "Unsupported input (expected .zip or .pdf)".to_string());
            }
        }
    }
    collected
}

fn print_outcomes(items: &[ItemOutcome]) {
    for item in items {
        match &item.status {
            ItemStatus::Renamed { new_name } => {
                println!("{} {} -> {}", "✓".green(), item.path, new_name.cyan());
            }
            ItemStatus::Skipped => {
                println!("{} {} (name or suffix not found)", "-".yellow(), item.path);
            }
            ItemStatus::Failed { reason } => {
                println!("{} {}: {}", "✗".red(), item.path, reason);
            }
        }
    }
}

fn rename_command(
    inputs: &[PathBuf],
    output: &Path,
    options: &PipelineOptions,
    walk: &WalkOptions,
    continue_on_error: bool,
    format: OutputFormat,
    verbosity: Verbosity,
) -> Result<()> {
    let RenameInputs { items, mut failures } = collect_rename_inputs(inputs, walk);

    if items.is_empty() {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&failures)?),
            OutputFormat::Text => print_outcomes(&failures),
        }
        anyhow::bail!("No PDF documents found in the given inputs");
    }

    if verbosity.should_show_output() {
        eprintln!(
            "{} Processing {} documents...",
            "Info:".blue().bold(),
            items.len().to_string().cyan()
        );
    }

    let renderer = create_renderer()?;

    // Create progress bar (hidden in quiet mode)
    let progress = if verbosity.should_show_output() {
        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .expect("template is compile-time constant")
                .progress_chars("█▓▒░  "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };
    let sink = |event: &PipelineEvent| {
        if let PipelineEvent::StateChanged { name, state } = event {
            if state.is_terminal() {
                progress.set_message(name.clone());
                progress.inc(1);
            }
        }
    };

    let mut report = rename_batch(renderer.as_ref(), items, options, &sink)?;
    progress.finish_and_clear();
    failures.append(&mut report.items);
    report.items = failures;

    fs::write(output, &report.archive)
        .with_context(|| format!("Failed to write output archive: {}", output.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_outcomes(&report.items),
    }

    if verbosity.should_show_output() {
        eprintln!(
            "{} {} renamed, {} skipped, {} failed -> {} ({})",
            "Done:".green().bold(),
            report.renamed().to_string().green(),
            report.skipped().to_string().yellow(),
            report.failed().to_string().red(),
            output.display(),
            format_bytes(report.archive.len())
        );
    }

    if report.failed() > 0 && !continue_on_error {
        anyhow::bail!(
            "{} documents failed (use --continue-on-error to ignore)",
            report.failed()
        );
    }
    Ok(())
}

fn invoices_command(input: &Path, options: &PipelineOptions, format: OutputFormat) -> Result<()> {
    let doc = read_document(input)?;
    let renderer = create_renderer()?;
    let records = extract_bill_records(renderer.as_ref(), &doc, options, &discard)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("{}", "No invoice records found".yellow());
            }
            for record in &records {
                println!(
                    "{} ticket {}  invoice {}",
                    format!("[Page {}]", record.page_number).bold(),
                    record.ticket_number.as_deref().unwrap_or("-"),
                    record.invoice_number.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn list_command(input: &Path, walk: &WalkOptions, format: OutputFormat, verbosity: Verbosity) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let progress = spinner(verbosity);
    let sink = |event: &PipelineEvent| {
        if let PipelineEvent::ArchiveEntry { current, path, .. } = event {
            progress.set_message(format!("[{current}] {path}"));
        }
    };
    let result = walk_archive(&bytes, walk, &sink);
    progress.finish_and_clear();
    let result = result.with_context(|| format!("Failed to open archive {}", input.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result.entries)?),
        OutputFormat::Text => {
            for entry in &result.entries {
                println!("{}  ({})", entry.path, format_bytes(entry.bytes.len()));
            }
            for path in &result.skipped_too_deep {
                println!("{} {} (nested deeper than {})", "-".yellow(), path, walk.max_depth);
            }
            for failure in &result.failures {
                println!("{} {}: {}", "✗".red(), failure.path, failure.reason);
            }
            if verbosity.should_show_output() {
                eprintln!(
                    "{} {} documents in {} entries",
                    "Found".green().bold(),
                    result.entries.len().to_string().cyan(),
                    result.processed
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_output_format_precedence() {
        assert_eq!(OutputFormat::resolve(Some(OutputFormat::Text), Some("json")), OutputFormat::Text);
        assert_eq!(OutputFormat::resolve(None, Some("JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::resolve(None, Some("yaml")), OutputFormat::Text);
        assert_eq!(OutputFormat::resolve(None, None), OutputFormat::Text);
    }

    #[test]
    fn test_pipeline_options_precedence() {
        let config = Config::parse("[pipeline]\ninclude_separator = false\nmax_pages = 4").unwrap();
        let options = pipeline_options(&config, None, false, false);
        assert!(!options.include_separator);
        assert_eq!(options.max_pages, Some(4));

        let options = pipeline_options(&config, Some(1), false, true);
        assert_eq!(options.max_pages, Some(1));
        assert!(options.debug_mode);

        let options = pipeline_options(&Config::default(), None, true, false);
        assert!(!options.include_separator);
    }

    #[test]
    fn test_walk_options_precedence() {
        let config = Config::parse("[archive]\nmax_depth = 1").unwrap();
        assert_eq!(walk_options(&config, None).max_depth, 1);
        assert_eq!(walk_options(&config, Some(5)).max_depth, 5);
        assert_eq!(walk_options(&Config::default(), None).max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(Verbosity::from_flags(true, false).log_filter(), "error");
        assert_eq!(Verbosity::from_flags(false, false).log_filter(), "warn");
        assert_eq!(Verbosity::from_flags(false, true).log_filter(), "debug");
    }
}
