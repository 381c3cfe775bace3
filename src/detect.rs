//! Detection entry points: upload bytes → [`DetectionResponse`].
//!
//! The work is synchronous and CPU-bound (image decoding, pdfium rendering,
//! symbol decoding, PNG encoding). [`detect_blocking`] is the core;
//! [`detect`] and [`detect_file`] move it onto tokio's blocking pool so an
//! async server never stalls its worker threads.
//!
//! ## Page handling
//!
//! | Upload | Pages scanned | Numbering |
//! |--------|---------------|-----------|
//! | image (any extension but `.pdf`, or none) | 1 | `1` |
//! | `.pdf` | first `max_pages` (default 3) | `1..=n` in document order |
//!
//! Pages are processed strictly in order and their records concatenated,
//! so `page` is non-decreasing across `barcodes`.

use crate::config::{DetectionConfig, PageFailurePolicy};
use crate::error::{BarcodeError, PageError};
use crate::output::{DetectionRecord, DetectionResponse};
use crate::pipeline::decode::SymbolDecoder;
use crate::pipeline::input::DocumentKind;
use crate::pipeline::page::process_page;
use crate::pipeline::render::RasterOptions;
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scan an uploaded file for barcodes.
///
/// # Arguments
/// * `bytes`    — file contents
/// * `filename` — original filename; only its extension is used
/// * `config`   — detection configuration
///
/// # Errors
/// - [`BarcodeError::ImageDecodeFailed`] / [`BarcodeError::DocumentDecodeFailed`]
///   when the upload cannot be read as the format its name claims
/// - [`BarcodeError::PageFailed`] when a page fails and the policy is
///   [`PageFailurePolicy::Abort`]
/// - [`BarcodeError::PdfiumBindingFailed`] when no pdfium library is available
///
/// Finding no codes is not an error.
pub async fn detect(
    bytes: Vec<u8>,
    filename: Option<String>,
    config: &DetectionConfig,
) -> Result<DetectionResponse, BarcodeError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || detect_blocking(&bytes, filename.as_deref(), &config))
        .await
        .map_err(|e| BarcodeError::Internal(format!("Detection task panicked: {}", e)))?
}

/// Read a local file and scan it; the filename comes from `path`.
pub async fn detect_file(
    path: impl AsRef<Path>,
    config: &DetectionConfig,
) -> Result<DetectionResponse, BarcodeError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BarcodeError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    detect(bytes, filename, config).await
}

/// Synchronous core of [`detect`].
pub fn detect_blocking(
    bytes: &[u8],
    filename: Option<&str>,
    config: &DetectionConfig,
) -> Result<DetectionResponse, BarcodeError> {
    let start = Instant::now();
    let kind = DocumentKind::from_filename(filename);
    info!(
        "Scanning {} ({} bytes) as {}",
        filename.unwrap_or("<unnamed>"),
        bytes.len(),
        kind
    );

    // ── Step 1: Obtain page images ───────────────────────────────────────
    let mut pages = match kind {
        DocumentKind::Image => {
            let image = image::load_from_memory(bytes).map_err(|e| {
                BarcodeError::ImageDecodeFailed {
                    detail: e.to_string(),
                }
            })?;
            vec![image]
        }
        DocumentKind::Pdf => {
            let rasterizer = config.resolve_rasterizer();
            let options = RasterOptions {
                dpi: config.dpi,
                max_pages: config.max_pages,
            };
            rasterizer.rasterize(bytes, &options)?
        }
    };
    if pages.len() > config.max_pages {
        debug!(
            "Ignoring {} pages beyond the cap of {}",
            pages.len() - config.max_pages,
            config.max_pages
        );
        pages.truncate(config.max_pages);
    }

    // ── Step 2: Scan pages in order ──────────────────────────────────────
    let decoder = config.resolve_decoder();
    let response = scan_pages(&pages, decoder.as_ref(), kind, config)?;

    info!(
        "Scan complete: {} codes on {} pages, {}ms",
        response.count,
        pages.len(),
        start.elapsed().as_millis()
    );
    Ok(response)
}

/// Scan a single already-decoded image as page 1.
pub fn detect_image(
    image: &DynamicImage,
    config: &DetectionConfig,
) -> Result<DetectionResponse, BarcodeError> {
    let decoder = config.resolve_decoder();
    scan_pages(
        std::slice::from_ref(image),
        decoder.as_ref(),
        DocumentKind::Image,
        config,
    )
}

/// Run every page through [`process_page`] and assemble the response.
fn scan_pages(
    pages: &[DynamicImage],
    decoder: &dyn SymbolDecoder,
    kind: DocumentKind,
    config: &DetectionConfig,
) -> Result<DetectionResponse, BarcodeError> {
    let mut per_page: Vec<Vec<DetectionRecord>> = Vec::with_capacity(pages.len());
    let mut errors: Vec<PageError> = Vec::new();

    for (idx, image) in pages.iter().enumerate() {
        let page_num = idx + 1;
        match process_page(image, page_num, decoder, config.padding_ratio) {
            Ok(records) => per_page.push(records),
            Err(e) => match config.page_failure {
                PageFailurePolicy::Abort => {
                    return Err(BarcodeError::PageFailed { kind, source: e });
                }
                PageFailurePolicy::Skip => {
                    warn!("Skipping page {}: {}", page_num, e);
                    errors.push(e);
                }
            },
        }
    }

    Ok(DetectionResponse::from_pages(per_page).with_errors(errors))
}
