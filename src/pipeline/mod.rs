//! Pipeline stages for barcode detection.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the decoder or rasterizer backend can be
//! swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ decode ──▶ normalize ──▶ geometry ──▶ encode
//! (kind)    (pdfium)   (rxing)    (dedup)       (crop, 3×3)   (base64 PNG)
//!                      └──────────────── page ────────────────┘
//! ```
//!
//! 1. [`input`]     — classify the upload as image or PDF from its filename
//! 2. [`render`]    — rasterise the leading PDF pages
//! 3. [`decode`]    — find symbols on a grayscale page via a [`decode::SymbolDecoder`]
//! 4. [`normalize`] — payload bytes → string; drop repeats within the page
//! 5. [`geometry`]  — padded crop rectangle and page region per symbol
//! 6. [`encode`]    — crop → base64 PNG
//! 7. [`page`]      — runs steps 3–6 for one page and numbers the results

pub mod decode;
pub mod encode;
pub mod geometry;
pub mod input;
pub mod normalize;
pub mod page;
pub mod render;
