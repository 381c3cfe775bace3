//! Output types: what a detection request returns.
//!
//! [`DetectionResponse`] is the JSON body served by `POST /detect` and printed
//! by the `barscan` CLI. Field names match the wire format consumed upstream
//! (`image_base64`, `type`, `rect.width`, …).

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle in pixel coordinates of the page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Position of a symbol on its page, on a 3×3 grid.
///
/// Serialised as `"{vertical}-{horizontal}"`, e.g. `"top-left"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Location {
    /// All nine regions, row-major from the top-left.
    pub const ALL: [Location; 9] = [
        Location::TopLeft,
        Location::TopCenter,
        Location::TopRight,
        Location::MiddleLeft,
        Location::MiddleCenter,
        Location::MiddleRight,
        Location::BottomLeft,
        Location::BottomCenter,
        Location::BottomRight,
    ];

    /// Build from a row (0 = top) and column (0 = left), each in `0..3`.
    pub(crate) fn from_grid(row: usize, col: usize) -> Self {
        Self::ALL[row.min(2) * 3 + col.min(2)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::TopLeft => "top-left",
            Location::TopCenter => "top-center",
            Location::TopRight => "top-right",
            Location::MiddleLeft => "middle-left",
            Location::MiddleCenter => "middle-center",
            Location::MiddleRight => "middle-right",
            Location::BottomLeft => "bottom-left",
            Location::BottomCenter => "bottom-center",
            Location::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One distinct symbol found on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// 0-based position among the page's surviving (deduplicated) symbols.
    pub index: usize,
    /// Symbology name reported by the decoder, e.g. `QRCODE`, `EAN13`.
    #[serde(rename = "type")]
    pub symbol_type: String,
    /// Normalised payload.
    pub data: String,
    /// Original (unpadded) detection rectangle.
    pub rect: Rect,
    pub location: Location,
    /// Base64 PNG of the padded crop around the symbol.
    #[serde(alias = "image_encoded")]
    pub image_base64: String,
    /// Decoder confidence, when the backend reports one.
    pub quality: Option<f64>,
    /// 1-based page number.
    pub page: usize,
}

/// Result of scanning one upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detected: bool,
    pub count: usize,
    pub barcodes: Vec<DetectionRecord>,
    /// Pages that failed under [`crate::config::PageFailurePolicy::Skip`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PageError>,
}

impl DetectionResponse {
    /// The "nothing found" response.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Concatenate per-page records, in page order, into a response.
    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = Vec<DetectionRecord>>,
    {
        let barcodes: Vec<DetectionRecord> = pages.into_iter().flatten().collect();
        let count = barcodes.len();
        Self {
            detected: count > 0,
            count,
            barcodes,
            errors: Vec::new(),
        }
    }

    /// Attach page failures recorded under the skip policy.
    pub fn with_errors(mut self, errors: Vec<PageError>) -> Self {
        self.errors = errors;
        self
    }

    /// Records found on a given 1-based page.
    pub fn page(&self, page: usize) -> impl Iterator<Item = &DetectionRecord> {
        self.barcodes.iter().filter(move |b| b.page == page)
    }
}
