//! Multi-encoding decoding of dataset files.
//!
//! Source files arrive from several pipelines and are not reliably UTF-8;
//! some carry byte-order marks, some are UTF-16, some are single-byte
//! Windows exports. A file is decoded by trying each candidate encoding
//! against the whole buffer in order, so the encoding is settled before
//! any line reaches the record layer.

use crate::error::{AnalyzerError, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// Candidate encodings, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// UTF-8, tolerating a leading byte-order mark.
    Utf8Sig,
    /// UTF-16 with BOM-sniffed endianness; little-endian when no BOM.
    Utf16,
    /// ISO-8859-1. Every byte maps to a character.
    Latin1,
    /// Windows code page 1252.
    Windows1252,
}

/// Default candidate order for dataset files.
pub const DEFAULT_CANDIDATES: &[Candidate] = &[
    Candidate::Utf8Sig,
    Candidate::Utf16,
    Candidate::Latin1,
    Candidate::Windows1252,
];

impl Candidate {
    fn name(self) -> &'static str {
        match self {
            Candidate::Utf8Sig => "utf-8-sig",
            Candidate::Utf16 => "utf-16",
            Candidate::Latin1 => "latin-1",
            Candidate::Windows1252 => "cp1252",
        }
    }

    /// Attempt a full decode of the buffer under this encoding.
    ///
    /// Returns `None` when any part of the buffer is invalid; partial
    /// output is never handed to the caller.
    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Candidate::Utf8Sig => {
                let payload = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
                std::str::from_utf8(payload).ok().map(str::to_owned)
            }
            Candidate::Utf16 => {
                let (encoding, payload) = match bytes {
                    [0xFF, 0xFE, rest @ ..] => (encoding_rs::UTF_16LE, rest),
                    [0xFE, 0xFF, rest @ ..] => (encoding_rs::UTF_16BE, rest),
                    _ => (encoding_rs::UTF_16LE, bytes),
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(payload)
                    .map(|cow| cow.into_owned())
            }
            Candidate::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Candidate::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
        }
    }
}

/// Decode a whole dataset file, trying each default candidate in order.
///
/// Each call re-reads the resource, so repeated reads of an unmodified
/// file see identical content.
pub fn decode_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AnalyzerError::io(path, e))?;
    decode_bytes(&bytes, DEFAULT_CANDIDATES)
        .ok_or_else(|| AnalyzerError::Decode(path.to_path_buf()))
}

/// Try candidate encodings in order against an in-memory buffer.
pub fn decode_bytes(bytes: &[u8], candidates: &[Candidate]) -> Option<String> {
    for candidate in candidates {
        if let Some(content) = candidate.decode(bytes) {
            return Some(content);
        }
        warn!("Failed to decode file with encoding: {}", candidate.name());
    }
    None
}
