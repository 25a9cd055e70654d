//! Text decoding for the preview fallback.
//!
//! Order: UTF-8 from the bytes, then UTF-16, then a direct read of the
//! file as text. UTF-16 honours a byte order mark and assumes little
//! endian without one; BOM-less input must then be mostly Latin script
//! to count as text.

use crate::error::PreviewError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Encoding a text preview was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Last-resort read of the file straight into a string
    Direct,
}

/// A decoded text preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub content: String,
    pub encoding: TextEncoding,
}

/// Text decode collaborator
pub trait TextDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedText, PreviewError>;
}

/// The default UTF-8 / UTF-16 / direct-read chain
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainedTextDecoder;

/// Control characters other than common whitespace mean "not text".
fn looks_like_text(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c'))
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes)
        .ok()
        .filter(|text| !text.contains('\0'))
        .map(str::to_owned)
}

/// BOM-less UTF-16 is accepted only when most code units are Latin-1.
/// Binary data read as UTF-16LE lands almost anywhere in the BMP.
fn plausible_utf16(units: &[u16]) -> bool {
    let latin = units.iter().filter(|&&unit| unit < 0x0100).count();
    !units.is_empty() && latin * 2 > units.len()
}

fn decode_utf16(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    let (body, encoding, has_bom) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, TextEncoding::Utf16Le, true),
        [0xFE, 0xFF, rest @ ..] => (rest, TextEncoding::Utf16Be, true),
        _ => (bytes, TextEncoding::Utf16Le, false),
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| match encoding {
            TextEncoding::Utf16Be => u16::from_be_bytes([pair[0], pair[1]]),
            _ => u16::from_le_bytes([pair[0], pair[1]]),
        })
        .collect();
    if !has_bom && !plausible_utf16(&units) {
        return None;
    }

    let text: String = char::decode_utf16(units.iter().copied())
        .collect::<Result<_, _>>()
        .ok()?;
    if text.contains('\0') || (!has_bom && !looks_like_text(&text)) {
        return None;
    }
    Some((text, encoding))
}

impl TextDecoder for ChainedTextDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedText, PreviewError> {
        if let Ok(bytes) = fs::read(path) {
            if let Some(content) = decode_utf8(&bytes) {
                return Ok(DecodedText {
                    content,
                    encoding: TextEncoding::Utf8,
                });
            }
            if let Some((content, encoding)) = decode_utf16(&bytes) {
                return Ok(DecodedText { content, encoding });
            }
        }

        match fs::read_to_string(path) {
            Ok(content) if !content.contains('\0') => Ok(DecodedText {
                content,
                encoding: TextEncoding::Direct,
            }),
            Ok(_) => Err(PreviewError::Undecodable {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(PreviewError::Undecodable {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(PreviewError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}
