//! Input classification: decide how an upload is turned into page images.
//!
//! The file kind comes from the filename extension alone (case-insensitive).
//! `.pdf` uploads are rasterised page by page; everything else, including
//! uploads without a filename or without an extension, is decoded as a single
//! image. Content sniffing is deliberately absent: a PNG named `scan.pdf` is
//! reported as a PDF processing error, exactly as the caller described it.

use std::fmt;
use std::path::Path;

/// How an uploaded file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A single raster image; always page 1.
    Image,
    /// A paginated PDF document.
    Pdf,
}

impl DocumentKind {
    /// Classify an upload by its (optional) filename.
    pub fn from_filename(filename: Option<&str>) -> Self {
        match filename.and_then(extension) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::Image,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Image => f.write_str("Image"),
            DocumentKind::Pdf => f.write_str("PDF"),
        }
    }
}

/// Extension of the final path component, if any.
fn extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}
