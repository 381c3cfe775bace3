//! Error types for the barscan library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BarcodeError`] — **Fatal**: the request cannot produce a response
//!   (unreadable upload, corrupt PDF, pdfium missing). Returned as
//!   `Err(BarcodeError)` from the top-level `detect*` functions.
//!
//! * [`PageError`] — a single page failed (decoder error, crop that cannot
//!   be encoded). Under [`crate::config::PageFailurePolicy::Abort`] it is
//!   wrapped in [`BarcodeError::PageFailed`] and aborts the request; under
//!   [`crate::config::PageFailurePolicy::Skip`] it is reported in
//!   [`crate::output::DetectionResponse::errors`] and the remaining pages
//!   still contribute their codes.
//!
//! [`BarcodeError::is_client_error`] splits the fatal errors into the
//! caller's fault (bad input, HTTP 400) and ours (HTTP 500).

use crate::pipeline::input::DocumentKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the barscan library.
#[derive(Debug, Error)]
pub enum BarcodeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The upload is not an image format we can decode.
    #[error("Image processing error: {detail}")]
    ImageDecodeFailed { detail: String },

    /// The PDF could not be opened or one of its pages could not be rendered.
    #[error("PDF processing error: {detail}")]
    DocumentDecodeFailed { detail: String },

    /// A page was rasterised but decoding or crop extraction failed.
    #[error("{kind} processing error: {source}")]
    PageFailed {
        kind: DocumentKind,
        #[source]
        source: PageError,
    },

    /// The request did not carry a file to scan.
    #[error("No file uploaded: expected a multipart field named '{field}'")]
    MissingUpload { field: String },

    /// A local input file could not be read.
    #[error("Failed to read '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Environment errors ────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BarcodeError {
    /// `true` when the failure is caused by the submitted content rather
    /// than by the service itself.
    pub fn is_client_error(&self) -> bool {
        match self {
            BarcodeError::ImageDecodeFailed { .. }
            | BarcodeError::DocumentDecodeFailed { .. }
            | BarcodeError::PageFailed { .. }
            | BarcodeError::MissingUpload { .. }
            | BarcodeError::FileReadFailed { .. } => true,
            BarcodeError::PdfiumBindingFailed(_)
            | BarcodeError::InvalidConfig(_)
            | BarcodeError::Internal(_) => false,
        }
    }
}

/// A failure confined to a single page.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The symbol decoder backend returned an error.
    #[error("page {page}: decoder failed: {detail}")]
    DecodeFailed { page: usize, detail: String },

    /// The crop around a detection could not be encoded.
    #[error("page {page}: crop {index} could not be encoded: {detail}")]
    CropEncodeFailed {
        page: usize,
        index: usize,
        detail: String,
    },
}

impl PageError {
    /// 1-based page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::DecodeFailed { page, .. } | PageError::CropEncodeFailed { page, .. } => {
                *page
            }
        }
    }
}
