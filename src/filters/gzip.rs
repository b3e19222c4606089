use std::io::Read;

use anyhow::Context;
use flate2::read::MultiGzDecoder;

/// Decompress a complete gzip file held in memory.
///
/// Concatenated members are decoded one after the other, as `gunzip` does. A stream that ends
/// before its trailer is an error.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, anyhow::Error> {
    ensure!(compressed.starts_with(&[0x1f, 0x8b]), "not a gzip stream");

    let mut out = Vec::with_capacity(compressed.len() * 4);
    MultiGzDecoder::new(compressed)
        .read_to_end(&mut out)
        .context("could not decompress gzip stream")?;

    Ok(out)
}
