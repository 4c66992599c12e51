//! Unit tests for gzip archive entries.

use csvscope::data::{DataError, compress_entry, extract_entry, extract_entry_with_limit};

#[test]
fn test_compress_then_extract() {
    let bytes = compress_entry("sales.csv", "region,total\nnorth,10").unwrap();
    let entry = extract_entry(&bytes, "fallback.csv", "csv").unwrap();

    assert_eq!(entry.name, "sales.csv");
    assert_eq!(entry.text, "region,total\nnorth,10");
}

#[test]
fn test_extension_match_is_case_insensitive() {
    let bytes = compress_entry("SALES.CSV", "a\n1").unwrap();
    assert_eq!(extract_entry(&bytes, "x", "csv").unwrap().name, "SALES.CSV");
}

#[test]
fn test_skips_non_matching_members() {
    let mut bytes = compress_entry("notes.md", "# notes").unwrap();
    bytes.extend(compress_entry("data.json", "{}").unwrap());
    bytes.extend(compress_entry("table.csv", "v\n1").unwrap());

    assert_eq!(extract_entry(&bytes, "bundle", "csv").unwrap().name, "table.csv");
    assert_eq!(extract_entry(&bytes, "bundle", "json").unwrap().text, "{}");
}

#[test]
fn test_trailing_garbage_after_match_is_ignored() {
    let mut bytes = compress_entry("table.csv", "v\n1").unwrap();
    bytes.extend_from_slice(b"garbage");
    assert_eq!(extract_entry(&bytes, "bundle", "csv").unwrap().text, "v\n1");
}

#[test]
fn test_no_csv_entry() {
    let bytes = compress_entry("image.png", "not really").unwrap();
    let err = extract_entry(&bytes, "bundle", "csv").unwrap_err();

    assert_eq!(err.to_string(), "No .csv entry found in archive");
    assert!(err.is_ingestion());
}

#[test]
fn test_not_gzip() {
    assert!(matches!(
        extract_entry(b"name,score\n", "scores.csv", "csv"),
        Err(DataError::Archive(_))
    ));
}

#[test]
fn test_non_utf8_entry() {
    let bytes = compress_entry("bad.csv", "").unwrap();
    let mut raw = flate2::GzBuilder::new()
        .filename("bad.csv")
        .write(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut raw, &[0xFF, 0xFE]).unwrap();
    let raw = raw.finish().unwrap();

    assert!(extract_entry(&bytes, "x", "csv").unwrap().text.is_empty());
    assert!(matches!(extract_entry(&raw, "x", "csv"), Err(DataError::Encoding(_))));
}

#[test]
fn test_inflated_size_is_capped() {
    // Compresses to a few hundred bytes but inflates to 256 KiB
    let big = format!("v\n{}", "0".repeat(256 * 1024));
    let bytes = compress_entry("big.csv", &big).unwrap();
    assert!(bytes.len() < 4096);

    let result = extract_entry_with_limit(&bytes, "x", "csv", 64 * 1024);
    assert!(matches!(result, Err(DataError::TooLarge { .. })));

    // A skipped member counts as well
    let mut bundle = compress_entry("padding.txt", &big).unwrap();
    bundle.extend(compress_entry("small.csv", "a\n1").unwrap());
    let result = extract_entry_with_limit(&bundle, "x", "csv", 64 * 1024);
    assert!(matches!(result, Err(DataError::TooLarge { .. })));

    // Exactly at the cap is fine
    let entry = extract_entry_with_limit(&bytes, "x", "csv", big.len() as u64).unwrap();
    assert_eq!(entry.text.len(), big.len());
}
