use crate::error::PipelineError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress one chunk into a self-delimited gzip stream.
///
/// Writes go to an in-memory buffer, so this does not fail in practice; an
/// I/O error from the encoder is still propagated rather than swallowed.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(bytes.len() / 2 + 16),
        Compression::default(),
    );
    encoder
        .write_all(bytes)
        .map_err(|e| PipelineError::Task(format!("gzip encode: {e}")))?;
    encoder
        .finish()
        .map_err(|e| PipelineError::Task(format!("gzip encode: {e}")))
}

/// Decompress one gzip stream back into raw bytes.
///
/// Fails with [`PipelineError::Corrupt`] when the input is not a valid
/// stream. Only ever applied to whole chunks, never across chunk boundaries.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 2);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PipelineError::Corrupt {
            detail: format!("gzip decode: {e}"),
        })?;
    Ok(out)
}
