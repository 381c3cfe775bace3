//! CLI binary for barscan.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `DetectionConfig` and prints the detection response as JSON.

use anyhow::{Context, Result};
use barscan::{decoder_from_name, detect_file, DetectionConfig, PageFailurePolicy};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan an image
  barscan label.png

  # Scan the first 3 pages of a PDF, write the result to a file
  barscan invoice.pdf -o codes.json

  # Scan up to 10 pages and keep going when a page fails
  barscan --max-pages 10 --skip-failed-pages scans.pdf

OUTPUT:
  {"detected": true, "count": 1, "barcodes": [{"index": 0, "type": "QRCODE",
   "data": "...", "rect": {...}, "location": "top-left",
   "image_base64": "...", "quality": null, "page": 1}]}

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory) for PDF input
  RUST_LOG          Log filter, overrides -v / -q
"#;

/// Extract barcodes and QR codes from images and PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "barscan",
    version,
    about = "Extract barcodes and QR codes from images and PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image or PDF file to scan.
    input: PathBuf,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "BARSCAN_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI for PDF pages (72–600).
    #[arg(long, env = "BARSCAN_DPI", default_value_t = barscan::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Maximum number of PDF pages to scan.
    #[arg(long, env = "BARSCAN_MAX_PAGES", default_value_t = barscan::DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Crop margin as a fraction of the symbol's shorter side.
    #[arg(long, env = "BARSCAN_PADDING", default_value_t = barscan::DEFAULT_PADDING_RATIO)]
    padding: f64,

    /// Report failed pages in the output instead of aborting.
    #[arg(long, env = "BARSCAN_SKIP_FAILED_PAGES")]
    skip_failed_pages: bool,

    /// Symbol decoder backend (`rqrr` needs the `rqrr` feature).
    #[arg(
        long,
        env = "BARSCAN_DECODER",
        default_value = "rxing",
        value_parser = PossibleValuesParser::new(barscan::DECODER_NAMES.iter().copied())
    )]
    decoder: String,

    /// Single-line JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BARSCAN_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "BARSCAN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run detection ────────────────────────────────────────────────────
    let response = detect_file(&cli.input, &config)
        .await
        .with_context(|| format!("Failed to scan {}", cli.input.display()))?;

    let json = if cli.compact {
        serde_json::to_string(&response)
    } else {
        serde_json::to_string_pretty(&response)
    }
    .context("Failed to serialise output")?;

    if let Some(ref path) = cli.output {
        tokio::fs::write(path, format!("{json}\n"))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{} codes → {}", response.count, path.display());
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to `DetectionConfig`.
fn build_config(cli: &Cli) -> Result<DetectionConfig> {
    let policy = if cli.skip_failed_pages {
        PageFailurePolicy::Skip
    } else {
        PageFailurePolicy::Abort
    };

    DetectionConfig::builder()
        .dpi(cli.dpi)
        .max_pages(cli.max_pages)
        .padding_ratio(cli.padding)
        .page_failure(policy)
        .decoder(decoder_from_name(&cli.decoder)?)
        .build()
        .context("Invalid configuration")
}
