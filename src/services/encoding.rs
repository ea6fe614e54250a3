use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{Error, Result};

/// Decodes an uploaded file. A BOM decides the encoding when present,
/// otherwise it is guessed from the content.
pub fn decode_bytes(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len): (&'static Encoding, usize) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            (detector.guess(None, true), 0)
        }
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return Err(Error::InvalidInput(format!(
            "file is not valid {}",
            encoding.name().to_lowercase()
        )));
    }

    debug!(encoding = encoding.name(), bom = bom_len > 0, "decoded csv upload");
    Ok(text.into_owned())
}

pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    decode_bytes(&bytes)
}
