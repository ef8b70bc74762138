/// Encoding and line-ending detection for loading text from disk.
use anyhow::{Context, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encodings recognized on load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Ascii,
    /// A legacy encoding guessed by `chardetng` (e.g. "windows-1252").
    Legacy(&'static str),
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf8Bom => write!(f, "UTF-8 BOM"),
            Self::Utf16Le => write!(f, "UTF-16 LE"),
            Self::Utf16Be => write!(f, "UTF-16 BE"),
            Self::Ascii => write!(f, "ASCII"),
            Self::Legacy(name) => write!(f, "{name}"),
        }
    }
}

/// Line terminator found in the loaded text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lf => write!(f, "LF"),
            Self::CrLf => write!(f, "CRLF"),
            Self::Cr => write!(f, "CR"),
        }
    }
}

/// Decoded file content with what was detected along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Text with line endings normalized to `\n`.
    pub text: String,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
}

/// Guesses the encoding of `bytes`: BOM first, then UTF-8, then `chardetng`.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(UTF8_BOM) {
        return TextEncoding::Utf8Bom;
    }
    if bytes.starts_with(UTF16_LE_BOM) {
        return TextEncoding::Utf16Le;
    }
    if bytes.starts_with(UTF16_BE_BOM) {
        return TextEncoding::Utf16Be;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return if bytes.is_ascii() {
            TextEncoding::Ascii
        } else {
            TextEncoding::Utf8
        };
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    TextEncoding::Legacy(detector.guess(None, true).name())
}

/// Picks the dominant line terminator of `text`.
pub fn detect_line_ending(text: &str) -> LineEnding {
    if text.contains("\r\n") {
        LineEnding::CrLf
    } else if text.contains('\r') {
        LineEnding::Cr
    } else {
        LineEnding::Lf
    }
}

/// Rewrites every `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_owned();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn decode_utf16(bytes: &[u8], from_pair: fn([u8; 2]) -> u16) -> Result<String> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_pair([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).context("invalid UTF-16 content")
}

/// Decodes `bytes` as `encoding`, stripping any BOM.
///
/// # Errors
///
/// Returns an error if the bytes are not valid in that encoding.
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Ascii => {
            String::from_utf8(bytes.to_vec()).context("invalid UTF-8 content")
        }
        TextEncoding::Utf8Bom => String::from_utf8(
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes).to_vec(),
        )
        .context("invalid UTF-8 BOM content"),
        TextEncoding::Utf16Le => decode_utf16(
            bytes.strip_prefix(UTF16_LE_BOM).unwrap_or(bytes),
            u16::from_le_bytes,
        ),
        TextEncoding::Utf16Be => decode_utf16(
            bytes.strip_prefix(UTF16_BE_BOM).unwrap_or(bytes),
            u16::from_be_bytes,
        ),
        TextEncoding::Legacy(name) => {
            let encoding = encoding_rs::Encoding::for_label(name.as_bytes())
                .with_context(|| format!("unknown encoding: {name}"))?;
            let (decoded, _, had_errors) = encoding.decode(bytes);
            if had_errors {
                anyhow::bail!("encoding errors while decoding as {name}");
            }
            Ok(decoded.into_owned())
        }
    }
}

/// Detects, decodes and normalizes raw file content.
///
/// # Errors
///
/// Returns an error if decoding with the detected encoding fails.
pub fn decode_text(bytes: &[u8]) -> Result<DecodedText> {
    let encoding = detect_encoding(bytes);
    let raw = decode_bytes(bytes, encoding)?;
    Ok(DecodedText {
        line_ending: detect_line_ending(&raw),
        text: normalize_line_endings(&raw),
        encoding,
    })
}
