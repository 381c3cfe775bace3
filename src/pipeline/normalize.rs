//! Payload normalisation and per-page deduplication.
//!
//! Decoders hand back raw payload bytes. The display string is the UTF-8
//! decoding when valid, otherwise an escaped byte-literal rendering
//! (`b'\xff\x00abc'`). The rendering is total and lossless: every input byte
//! is represented, and two different non-UTF-8 payloads never render the
//! same way.
//!
//! The normalised string is also the dedup key. A seen-set is created fresh
//! for every call to [`dedup_detections`], so identical codes on different
//! pages (or in different requests) are all kept.

use crate::pipeline::decode::RawDetection;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Convert raw payload bytes to a display string.
pub fn normalize_payload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => escape_bytes(bytes),
    }
}

/// Render bytes as a `b'...'` literal with printable ASCII kept verbatim.
fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('\'');
    out
}

/// Drop detections whose normalised payload was already seen on this page.
///
/// Returns the surviving detections in decoder order, each paired with its
/// normalised payload so later stages do not decode the bytes twice.
pub fn dedup_detections(detections: Vec<RawDetection>) -> Vec<(String, RawDetection)> {
    let mut seen: HashSet<String> = HashSet::with_capacity(detections.len());
    detections
        .into_iter()
        .filter_map(|det| {
            let data = normalize_payload(&det.payload);
            if seen.insert(data.clone()) {
                Some((data, det))
            } else {
                None
            }
        })
        .collect()
}
