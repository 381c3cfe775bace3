//! Pipeline integration tests with stub backends.
//!
//! A stub rasterizer produces pages whose first pixel encodes the page
//! number, and a stub decoder turns that pixel into a scripted list of
//! detections. This exercises dedup, numbering, the page cap and the
//! failure policies without a pdfium library or real barcodes.

use barscan::service::{self, ServiceError};
use barscan::{
    detect, detect_blocking, BarcodeError, DetectionConfig, DetectionResponse, Location,
    PageError, PageFailurePolicy, RasterOptions, Rasterizer, RawDetection, Rect, SymbolDecoder,
};
use image::{DynamicImage, GrayImage, Luma};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ── Stubs ────────────────────────────────────────────────────────────────────

const PAGE_W: u32 = 600;
const PAGE_H: u32 = 900;

/// Pages `1..=pages`, each filled with its page number as the gray level.
struct StubRasterizer {
    pages: usize,
    honour_cap: bool,
    seen_options: Mutex<Vec<RasterOptions>>,
}

impl StubRasterizer {
    fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            honour_cap: true,
            seen_options: Mutex::new(Vec::new()),
        })
    }

    fn ignoring_cap(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            honour_cap: false,
            seen_options: Mutex::new(Vec::new()),
        })
    }
}

impl Rasterizer for StubRasterizer {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn rasterize(
        &self,
        bytes: &[u8],
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, BarcodeError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(BarcodeError::DocumentDecodeFailed {
                detail: "missing %PDF header".into(),
            });
        }
        self.seen_options.lock().unwrap().push(*options);
        let n = if self.honour_cap {
            self.pages.min(options.max_pages)
        } else {
            self.pages
        };
        Ok((1..=n)
            .map(|p| DynamicImage::ImageLuma8(GrayImage::from_pixel(PAGE_W, PAGE_H, Luma([p as u8]))))
            .collect())
    }
}

/// Returns the scripted detections for the page whose gray level matches.
#[derive(Default)]
struct ScriptedDecoder {
    by_page: HashMap<u8, Result<Vec<RawDetection>, String>>,
}

impl ScriptedDecoder {
    fn page(mut self, page: u8, detections: Vec<RawDetection>) -> Self {
        self.by_page.insert(page, Ok(detections));
        self
    }

    fn failing_page(mut self, page: u8, msg: &str) -> Self {
        self.by_page.insert(page, Err(msg.to_string()));
        self
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn decode(&self, image: &GrayImage) -> Result<Vec<RawDetection>, String> {
        let key = image.get_pixel(0, 0).0[0];
        self.by_page.get(&key).cloned().unwrap_or(Ok(Vec::new()))
    }
}

fn qr(payload: &str, x: u32, y: u32) -> RawDetection {
    RawDetection {
        symbol_type: "QRCODE".into(),
        payload: payload.as_bytes().to_vec(),
        rect: Rect::new(x, y, 100, 100),
        quality: Some(1.0),
    }
}

fn config(decoder: ScriptedDecoder, rasterizer: Arc<StubRasterizer>) -> DetectionConfig {
    DetectionConfig::builder()
        .decoder(Arc::new(decoder))
        .rasterizer(rasterizer)
        .build()
        .expect("valid config")
}

fn assert_dense_indices(resp: &DetectionResponse) {
    let mut pages: Vec<usize> = resp.barcodes.iter().map(|b| b.page).collect();
    pages.dedup();
    for page in pages {
        let idx: Vec<usize> = resp.page(page).map(|b| b.index).collect();
        assert_eq!(idx, (0..idx.len()).collect::<Vec<_>>(), "page {page}: {idx:?}");
    }
}

// ── Multi-page aggregation ───────────────────────────────────────────────────

#[test]
fn test_three_pages_one_code_each() {
    let decoder = ScriptedDecoder::default()
        .page(1, vec![qr("P1", 10, 10)])
        .page(2, vec![qr("P2", 250, 400)])
        .page(3, vec![qr("P3", 480, 780)]);
    let cfg = config(decoder, StubRasterizer::new(3));

    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();

    assert!(resp.detected);
    assert_eq!(resp.count, 3);
    let summary: Vec<(usize, usize, &str, Location)> = resp
        .barcodes
        .iter()
        .map(|b| (b.page, b.index, b.data.as_str(), b.location))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, 0, "P1", Location::TopLeft),
            (2, 0, "P2", Location::MiddleCenter),
            (3, 0, "P3", Location::BottomRight),
        ]
    );
}

#[test]
fn test_page_cap_limits_five_page_document() {
    let decoder = (1..=5u8).fold(ScriptedDecoder::default(), |d, p| {
        d.page(p, vec![qr(&format!("P{p}"), 10, 10)])
    });
    let rasterizer = StubRasterizer::new(5);
    let cfg = config(decoder, Arc::clone(&rasterizer));

    let resp = detect_blocking(b"%PDF-1.7", Some("long.PDF"), &cfg).unwrap();

    assert_eq!(resp.count, 3);
    assert!(resp.barcodes.iter().all(|b| b.page <= 3));
    let opts = rasterizer.seen_options.lock().unwrap();
    assert_eq!(opts.len(), 1);
    assert_eq!(opts[0].max_pages, 3);
    assert_eq!(opts[0].dpi, 300);
}

#[test]
fn test_page_cap_enforced_even_if_rasterizer_ignores_it() {
    let decoder = (1..=5u8).fold(ScriptedDecoder::default(), |d, p| {
        d.page(p, vec![qr(&format!("P{p}"), 10, 10)])
    });
    let cfg = config(decoder, StubRasterizer::ignoring_cap(5));

    let resp = detect_blocking(b"%PDF-1.7", Some("long.pdf"), &cfg).unwrap();

    let pages: Vec<usize> = resp.barcodes.iter().map(|b| b.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[test]
fn test_custom_page_cap() {
    let decoder = (1..=5u8).fold(ScriptedDecoder::default(), |d, p| {
        d.page(p, vec![qr(&format!("P{p}"), 10, 10)])
    });
    let cfg = DetectionConfig::builder()
        .decoder(Arc::new(decoder))
        .rasterizer(StubRasterizer::new(5))
        .max_pages(5)
        .build()
        .unwrap();

    let resp = detect_blocking(b"%PDF-1.7", Some("long.pdf"), &cfg).unwrap();
    assert_eq!(resp.count, 5);
}

// ── Dedup scope ──────────────────────────────────────────────────────────────

#[test]
fn test_dedup_is_per_page_not_per_document() {
    let decoder = ScriptedDecoder::default()
        .page(1, vec![qr("SAME", 10, 10), qr("SAME", 300, 10), qr("OTHER", 10, 500)])
        .page(2, vec![qr("SAME", 10, 10)]);
    let cfg = config(decoder, StubRasterizer::new(2));

    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();

    assert_eq!(resp.count, 3);
    let p1: Vec<&str> = resp.page(1).map(|b| b.data.as_str()).collect();
    assert_eq!(p1, vec!["SAME", "OTHER"]);
    // first occurrence wins
    assert_eq!(resp.page(1).next().unwrap().rect.x, 10);
    assert_eq!(resp.page(2).count(), 1);
    assert_dense_indices(&resp);
}

#[test]
fn test_indices_dense_after_many_duplicates() {
    let dets: Vec<RawDetection> = ["a", "b", "a", "a", "c", "b", "d", "c"]
        .iter()
        .enumerate()
        .map(|(i, p)| qr(p, (i as u32) * 60, 0))
        .collect();
    let decoder = ScriptedDecoder::default().page(1, dets);
    let cfg = config(decoder, StubRasterizer::new(1));

    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();

    let data: Vec<&str> = resp.barcodes.iter().map(|b| b.data.as_str()).collect();
    assert_eq!(data, vec!["a", "b", "c", "d"]);
    assert_dense_indices(&resp);
}

#[test]
fn test_non_utf8_payload_survives_as_escaped_text() {
    let mut det = qr("", 10, 10);
    det.payload = vec![0xde, 0xad, 0xbe, 0xef];
    let decoder = ScriptedDecoder::default().page(1, vec![det.clone(), det]);
    let cfg = config(decoder, StubRasterizer::new(1));

    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();
    assert_eq!(resp.count, 1);
    assert_eq!(resp.barcodes[0].data, "b'\\xde\\xad\\xbe\\xef'");
}

// ── Empty results ────────────────────────────────────────────────────────────

#[test]
fn test_document_without_codes_is_empty_success() {
    let cfg = config(ScriptedDecoder::default(), StubRasterizer::new(3));
    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();
    assert_eq!(resp, DetectionResponse::empty());
}

#[test]
fn test_document_with_zero_pages_is_empty_success() {
    let cfg = config(ScriptedDecoder::default(), StubRasterizer::new(0));
    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();
    assert_eq!(resp, DetectionResponse::empty());
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[test]
fn test_corrupt_pdf_is_a_client_error() {
    let cfg = config(ScriptedDecoder::default(), StubRasterizer::new(3));
    let err = detect_blocking(b"garbage", Some("doc.pdf"), &cfg).unwrap_err();
    assert!(matches!(err, BarcodeError::DocumentDecodeFailed { .. }), "got: {err:?}");

    let svc: ServiceError = err.into();
    assert_eq!(svc.status, 400);
    assert!(svc.body.detail.starts_with("PDF processing error"));
}

#[test]
fn test_failing_page_aborts_by_default() {
    let decoder = ScriptedDecoder::default()
        .page(1, vec![qr("P1", 10, 10)])
        .failing_page(2, "decoder crashed")
        .page(3, vec![qr("P3", 10, 10)]);
    let cfg = config(decoder, StubRasterizer::new(3));

    let err = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap_err();
    match err {
        BarcodeError::PageFailed { source, .. } => assert_eq!(source.page(), 2),
        other => panic!("expected PageFailed, got {other:?}"),
    }
}

#[test]
fn test_failing_page_skipped_when_requested() {
    let decoder = ScriptedDecoder::default()
        .page(1, vec![qr("P1", 10, 10)])
        .failing_page(2, "decoder crashed")
        .page(3, vec![qr("P3", 10, 10)]);
    let cfg = DetectionConfig::builder()
        .decoder(Arc::new(decoder))
        .rasterizer(StubRasterizer::new(3))
        .page_failure(PageFailurePolicy::Skip)
        .build()
        .unwrap();

    let resp = detect_blocking(b"%PDF-1.7", Some("doc.pdf"), &cfg).unwrap();

    let pages: Vec<usize> = resp.barcodes.iter().map(|b| b.page).collect();
    assert_eq!(pages, vec![1, 3]);
    assert_eq!(resp.count, 2);
    assert_eq!(
        resp.errors,
        vec![PageError::DecodeFailed {
            page: 2,
            detail: "decoder crashed".into()
        }]
    );
}

// ── Async / service boundary ─────────────────────────────────────────────────

#[tokio::test]
async fn test_async_detect_runs_the_same_pipeline() {
    let decoder = ScriptedDecoder::default().page(1, vec![qr("HELLO", 10, 10)]);
    let cfg = config(decoder, StubRasterizer::new(1));

    let resp = detect(b"%PDF-1.7".to_vec(), Some("a.pdf".into()), &cfg)
        .await
        .unwrap();
    assert_eq!(resp.count, 1);
    assert_eq!(resp.barcodes[0].data, "HELLO");
}

#[tokio::test]
async fn test_service_returns_response_json() {
    let decoder = ScriptedDecoder::default().page(1, vec![qr("HELLO", 10, 10)]);
    let cfg = config(decoder, StubRasterizer::new(1));

    let resp = service::handle_detect(Some((Some("a.pdf".into()), b"%PDF-1.7".to_vec())), &cfg)
        .await
        .unwrap();
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["detected"], true);
    assert_eq!(json["count"], 1);
    assert_eq!(json["barcodes"][0]["index"], 0);
    assert_eq!(json["barcodes"][0]["page"], 1);
    assert_eq!(json["barcodes"][0]["data"], "HELLO");
    assert_eq!(json["barcodes"][0]["type"], "QRCODE");
}
