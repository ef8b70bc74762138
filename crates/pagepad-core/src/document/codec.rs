//! Gzip encoding of line chunks.
//!
//! A chunk is stored as its lines joined with `\n`. Chunks are never empty,
//! so the join is unambiguous on the way back.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Compresses a run of lines into a gzip byte stream.
///
/// # Errors
///
/// Returns an error if the encoder fails to write or finish the stream.
pub fn compress_lines(lines: &[String]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(lines.join("\n").as_bytes())
        .context("failed to write chunk into gzip stream")?;
    encoder.finish().context("failed to finish gzip stream")
}

/// Inflates a chunk produced by [`compress_lines`].
///
/// # Errors
///
/// Returns an error if the bytes are not a valid gzip stream of UTF-8 text.
pub fn decompress_lines(bytes: &[u8]) -> Result<Vec<String>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .context("failed to inflate chunk")?;
    Ok(text.split('\n').map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_keeps_empty_lines() {
        let lines = vec!["a".to_string(), String::new(), "  c".to_string()];
        let bytes = compress_lines(&lines).unwrap();
        assert_eq!(decompress_lines(&bytes).unwrap(), lines);
    }

    #[test]
    fn test_single_empty_line() {
        let lines = vec![String::new()];
        let bytes = compress_lines(&lines).unwrap();
        assert_eq!(decompress_lines(&bytes).unwrap(), lines);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decompress_lines(b"definitely not gzip").is_err());
    }
}
