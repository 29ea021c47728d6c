//! Payload decompression.

use crate::error::{CodecError, CodecResult};
use flate2::read::GzDecoder;
use std::io::Read;

/// Decompresses a complete gzip stream into raw bytes.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] if the stream is truncated or
/// corrupt.
pub fn gunzip(payload: &[u8]) -> CodecResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(payload);
    let mut out = Vec::with_capacity(payload.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    Ok(out)
}

/// Decompresses a complete gzip stream into a UTF-8 string.
///
/// # Errors
///
/// Returns an error if decompression fails or the content is not UTF-8.
pub fn gunzip_to_string(payload: &[u8]) -> CodecResult<String> {
    String::from_utf8(gunzip(payload)?).map_err(|_| CodecError::InvalidUtf8)
}
