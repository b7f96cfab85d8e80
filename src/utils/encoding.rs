//! Decoding of raw file payloads fetched from the hosting provider.
//!
//! Raw endpoints serve bytes with no reliable charset, so decoding follows the
//! usual ladder:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - strict UTF-8 fast path
//! - charset guess with chardetng, decoding with replacement characters
//!
//! Payloads that look binary are rejected instead of decoded.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Decode a raw payload into text.
///
/// Returns `None` when the payload looks binary.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return Some(String::new());
    }

    if let Some(encoding) = bom_encoding(bytes) {
        let (decoded, _, _) = encoding.decode(bytes);
        return Some(decoded.into_owned());
    }

    if is_binary(bytes) {
        return None;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let encoding = detect_encoding(bytes);
    let (decoded, _, _) = encoding.decode(bytes);
    Some(decoded.into_owned())
}

fn bom_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        Some(UTF_8)
    } else if bytes.starts_with(&[0xff, 0xfe]) {
        Some(UTF_16LE)
    } else if bytes.starts_with(&[0xfe, 0xff]) {
        Some(UTF_16BE)
    } else {
        None
    }
}

/// Guess the charset of a non-UTF-8 payload from its leading bytes.
fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

/// Binary heuristic over the leading bytes of a payload.
///
/// A null byte is a strong indicator. Otherwise, samples that are not UTF-8
/// and have under 70% printable ASCII are treated as binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }

    if sample.contains(&0) {
        return true;
    }

    // A multi-byte character may straddle the sample boundary.
    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let printable_count = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == 9 || b == 10 || b == 13)
        .count();

    (printable_count as f64 / sample.len() as f64) < 0.70
}
