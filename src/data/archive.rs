//! Gzip archive input and output.
//!
//! An archive is a gzip stream of one or more members. Each member is an
//! entry whose name comes from the gzip `FNAME` header; a nameless first
//! member takes the archive's own file name minus `.gz`.

use crate::constants::MAX_CSV_SIZE_MB;
use crate::data::error::{DataError, DataResult};
use flate2::bufread::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::io::{Read, Write};

/// A decoded archive entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub text: String,
}

const MB: u64 = 1024 * 1024;

/// Find the first entry whose name ends in `.{extension}` and decode it as UTF-8
///
/// # Memory Limits
/// - A member inflating past [`MAX_CSV_SIZE_MB`]MB returns [`DataError::TooLarge`]
pub fn extract_entry(
    bytes: &[u8],
    fallback_name: &str,
    extension: &str,
) -> DataResult<ArchiveEntry> {
    extract_entry_with_limit(bytes, fallback_name, extension, MAX_CSV_SIZE_MB as u64 * MB)
}

/// [`extract_entry`] with an explicit cap on the inflated size of each member
pub fn extract_entry_with_limit(
    bytes: &[u8],
    fallback_name: &str,
    extension: &str,
    max_bytes: u64,
) -> DataResult<ArchiveEntry> {
    if bytes.is_empty() {
        return Err(DataError::Archive("archive is empty".to_string()));
    }

    let extension = extension.trim_start_matches('.').to_lowercase();
    let suffix = format!(".{}", extension);
    let mut remaining: &[u8] = bytes;
    let mut position = 0usize;

    while !remaining.is_empty() {
        let mut decoder = GzDecoder::new(remaining);
        let mut data = Vec::new();
        // Skipped members are inflated too, so every member is capped
        let read = (&mut decoder).take(max_bytes + 1).read_to_end(&mut data);
        if data.len() as u64 > max_bytes {
            return Err(DataError::TooLarge {
                size_mb: (data.len() as u64).div_ceil(MB),
                max_mb: (max_bytes / MB) as usize,
            });
        }
        if let Err(e) = read {
            if position == 0 {
                return Err(DataError::Archive(e.to_string()));
            }
            // Trailing garbage after complete members
            tracing::warn!(entries = position, error = %e, "Ignoring undecodable archive tail");
            break;
        }

        let name = decoder
            .header()
            .and_then(|h| h.filename())
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .unwrap_or_else(|| {
                if position == 0 {
                    fallback_name.to_string()
                } else {
                    String::new()
                }
            });
        remaining = decoder.into_inner();
        position += 1;

        if name.to_lowercase().ends_with(&suffix) {
            tracing::debug!(entry = %name, bytes = data.len(), "Found archive entry");
            let data = data
                .strip_prefix(b"\xEF\xBB\xBF")
                .map(<[u8]>::to_vec)
                .unwrap_or(data);
            let text = String::from_utf8(data).map_err(|e| DataError::Encoding(e.to_string()))?;
            return Ok(ArchiveEntry { name, text });
        }
        tracing::debug!(entry = %name, "Skipping archive entry");
    }

    Err(DataError::NoMatchingEntry { extension })
}

/// Compress text into a single named gzip member
pub fn compress_entry(name: &str, text: &str) -> DataResult<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .filename(name.replace('\0', ""))
        .write(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(encoder.finish()?)
}
