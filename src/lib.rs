//! # barscan
//!
//! Find the barcodes and QR codes in an uploaded image or PDF and describe
//! each one: decoded payload, bounding rectangle, position on the page, and
//! a cropped PNG preview ready to embed in JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (bytes + filename)
//!  │
//!  ├─ 1. Input    .pdf → rasterise, anything else → decode as one image
//!  ├─ 2. Render   first 3 PDF pages at 300 DPI via pdfium
//!  ├─ 3. Decode   grayscale page → raw symbols (rxing, or rqrr)
//!  ├─ 4. Dedup    drop repeated payloads within the page
//!  ├─ 5. Annotate padded crop → base64 PNG, 3×3 page region
//!  └─ 6. Output   {detected, count, barcodes[]} with 1-based page numbers
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barscan::{detect_file, DetectionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DetectionConfig::default();
//!     let response = detect_file("invoice.pdf", &config).await?;
//!     for code in &response.barcodes {
//!         println!("page {} {} {}: {}", code.page, code.location, code.symbol_type, code.data);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `barscan` binary (clap + anyhow + tracing-subscriber) |
//! | `server` | on      | Enables the `barscan-server` HTTP binary (axum) |
//! | `rqrr`   | off     | Adds the QR-only `RqrrDecoder` backend |
//!
//! PDF input needs a pdfium shared library at runtime: either installed
//! system-wide or pointed to by `PDFIUM_LIB_PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod detect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DetectionConfig, DetectionConfigBuilder, PageFailurePolicy, DEFAULT_DPI, DEFAULT_MAX_PAGES,
    DEFAULT_PADDING_RATIO,
};
pub use detect::{detect, detect_blocking, detect_file, detect_image};
pub use error::{BarcodeError, PageError};
pub use output::{DetectionRecord, DetectionResponse, Location, Rect};
pub use pipeline::decode::{
    decoder_from_name, RawDetection, RxingDecoder, SymbolDecoder, DECODER_NAMES,
};
pub use pipeline::input::DocumentKind;
pub use pipeline::render::{PdfiumRasterizer, RasterOptions, Rasterizer};

#[cfg(feature = "rqrr")]
pub use pipeline::decode::RqrrDecoder;
