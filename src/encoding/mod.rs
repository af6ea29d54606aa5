//! Byte-to-text decoding for document input.
//!
//! Raw bytes are decoded to UTF-8 before tokenizing. The encoding is taken,
//! in order of precedence, from an explicit label supplied by the caller,
//! a Byte Order Mark, or the `encoding="..."` pseudo-attribute of the XML
//! declaration. Without any of these the input must be UTF-8.
//!
//! Transcoding is delegated to `encoding_rs`. Malformed sequences are an
//! error rather than being replaced, so a decoding problem never turns into
//! silently altered text.

use crate::error::ParseError;

/// The encoding implied by a Byte Order Mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bom {
    /// The encoding label.
    pub label: &'static str,
    /// Length of the mark in bytes.
    pub len: usize,
}

/// Detects a UTF-8 or UTF-16 Byte Order Mark at the start of `bytes`.
///
/// ```
/// use xmlnav::encoding::sniff_bom;
///
/// assert_eq!(sniff_bom(b"\xEF\xBB\xBF<a/>").map(|b| b.len), Some(3));
/// assert!(sniff_bom(b"<a/>").is_none());
/// ```
#[must_use]
pub fn sniff_bom(bytes: &[u8]) -> Option<Bom> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some(Bom {
            label: "UTF-8",
            len: 3,
        }),
        [0xFE, 0xFF, ..] => Some(Bom {
            label: "UTF-16BE",
            len: 2,
        }),
        [0xFF, 0xFE, ..] => Some(Bom {
            label: "UTF-16LE",
            len: 2,
        }),
        _ => None,
    }
}

/// Decodes `bytes` from the encoding named by `label` (any WHATWG label,
/// case-insensitive).
///
/// A BOM matching the label's encoding is stripped.
///
/// # Errors
///
/// Returns an encoding [`ParseError`] if the label is unknown or the bytes
/// are malformed for that encoding.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, ParseError> {
    let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ParseError::encoding(format!("unsupported encoding '{label}'")))?;

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(ParseError::encoding(format!(
            "malformed byte sequence for encoding '{}'",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// Decodes `bytes`, detecting the encoding from a BOM or the XML declaration.
///
/// # Errors
///
/// Returns an encoding [`ParseError`] if the declared encoding is unknown or
/// the bytes cannot be decoded.
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, ParseError> {
    if let Some(bom) = sniff_bom(bytes) {
        // The mark wins over whatever the declaration says.
        return transcode(bytes, bom.label);
    }

    match declared_encoding(bytes) {
        Some(label) if !is_utf8_label(&label) => transcode(bytes, &label),
        _ => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| ParseError::encoding(format!("input is not valid UTF-8: {e}"))),
    }
}

/// Reads the `encoding` pseudo-attribute from a leading XML declaration.
///
/// The declaration is ASCII in every ASCII-compatible encoding, so the scan
/// works on raw bytes before any decoding.
#[must_use]
pub fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(256)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = find(head, b"?>")?;
    let decl = &head[..end];
    let after_name = &decl[find(decl, b"encoding")? + b"encoding".len()..];
    let after_eq = trim_ascii_start(trim_ascii_start(after_name).strip_prefix(b"=")?);

    let (&quote, rest) = after_eq.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &rest[..rest.iter().position(|&b| b == quote)?];
    if value.is_empty() || !value.is_ascii() {
        return None;
    }
    Some(String::from_utf8_lossy(value).into_owned())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}
