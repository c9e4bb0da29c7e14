use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use file_compressor::batch::{artifact_path, restored_path, run_batch};
use file_compressor::{
    compress, compress_with, decompress, files_equal, inspect, CodecError, CompressOptions,
    EmptyInputPolicy, HEADER_LEN,
};

fn round_trip(dir: &Path, name: &str, data: &[u8]) -> u64 {
    let src = dir.join(name);
    let packed = dir.join(format!("{name}.huff"));
    let restored = dir.join(format!("{name}.out"));
    fs::write(&src, data).unwrap();

    compress(&src, &packed).unwrap();
    decompress(&packed, &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), data, "{name} did not round-trip");
    assert!(files_equal(&src, &restored));
    fs::metadata(&packed).unwrap().len()
}

#[test]
fn files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let all: Vec<u8> = (0..=255).collect();
    let random: Vec<u8> = (0..50_000).map(|_| rng.gen()).collect();
    let text = "Huffman coding is a greedy algorithm that builds optimal prefix codes. ".repeat(200);

    round_trip(dir.path(), "single", b"!");
    round_trip(dir.path(), "all", &all);
    round_trip(dir.path(), "random", &random);
    round_trip(dir.path(), "text", text.as_bytes());
}

#[test]
fn aaab_artifact_layout() {
    let dir = tempfile::tempdir().unwrap();
    let size = round_trip(dir.path(), "aaab", b"aaab");
    assert_eq!(size, HEADER_LEN as u64 + 1);

    let bytes = fs::read(dir.path().join("aaab.huff")).unwrap();
    assert_eq!(&bytes[0x61 * 4..0x61 * 4 + 4], &3u32.to_le_bytes());
    assert_eq!(&bytes[0x62 * 4..0x62 * 4 + 4], &1u32.to_le_bytes());
    assert_eq!(bytes[HEADER_LEN], 0xE0);
}

#[test]
fn repeated_byte_needs_no_body() {
    let dir = tempfile::tempdir().unwrap();
    let size = round_trip(dir.path(), "zeros", &vec![0u8; 100_000]);
    assert_eq!(size, HEADER_LEN as u64);
}

#[test]
fn skewed_file_shrinks() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<u8> = (0..40_000)
        .map(|_| if rng.gen_bool(0.95) { b'a' } else { rng.gen_range(b'b'..=b'z') })
        .collect();
    let size = round_trip(dir.path(), "skewed", &data);
    assert!(size - (HEADER_LEN as u64) < data.len() as u64);
    assert!(size < data.len() as u64);
}

#[test]
fn empty_file_gets_zero_header() {
    let dir = tempfile::tempdir().unwrap();
    let size = round_trip(dir.path(), "empty", b"");
    assert_eq!(size, HEADER_LEN as u64);
    assert!(fs::read(dir.path().join("empty.huff")).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn rejected_empty_file_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("empty");
    let dst = dir.path().join("empty.huff");
    fs::write(&src, b"").unwrap();

    let options = CompressOptions {
        empty_input: EmptyInputPolicy::Reject,
    };
    let err = compress_with(&src, &dst, &options).unwrap_err();
    assert!(matches!(err, CodecError::EmptyInput));
    assert!(!dst.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = compress(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
    assert!(matches!(err, CodecError::SourceUnavailable { .. }));

    let err = decompress(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
    assert!(matches!(err, CodecError::SourceUnavailable { .. }));
}

#[test]
fn unwritable_sink_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::write(&src, b"data").unwrap();
    let dst = dir.path().join("no_such_dir").join("out.huff");

    let err = compress(&src, &dst).unwrap_err();
    assert!(matches!(err, CodecError::SinkUnavailable { .. }));
}

#[test]
fn decompress_into_missing_dir_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let packed = dir.path().join("src.huff");
    fs::write(&src, b"data").unwrap();
    compress(&src, &packed).unwrap();

    let dst = dir.path().join("no_such_dir").join("restored");
    let err = decompress(&packed, &dst).unwrap_err();
    assert!(matches!(err, CodecError::SinkUnavailable { .. }));
    assert!(!dst.exists());
}

#[test]
fn directory_source_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    let err = compress(&sub, &dir.path().join("out.huff")).unwrap_err();
    assert!(matches!(err, CodecError::SourceUnavailable { .. }));
    let err = decompress(&sub, &dir.path().join("out")).unwrap_err();
    assert!(matches!(err, CodecError::SourceUnavailable { .. }));
    assert!(!dir.path().join("out.huff").exists());
    assert!(!dir.path().join("out").exists());
}

#[cfg(unix)]
#[test]
fn outputs_get_plain_create_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("book.txt");
    let packed = dir.path().join("book.txt.huff");
    let restored = dir.path().join("book.txt.out");
    let plain = dir.path().join("plain");
    fs::write(&src, "permissions should match a plain write ".repeat(20)).unwrap();
    fs::write(&plain, b"x").unwrap();

    compress(&src, &packed).unwrap();
    decompress(&packed, &restored).unwrap();

    assert_eq!(mode(&packed), mode(&plain));
    assert_eq!(mode(&restored), mode(&plain));
}

#[test]
fn corrupt_artifact_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let packed = dir.path().join("src.huff");
    let dst = dir.path().join("restored");
    fs::write(&src, b"some data that compresses into several bytes of body").unwrap();
    compress(&src, &packed).unwrap();

    let mut bytes = fs::read(&packed).unwrap();
    bytes.truncate(HEADER_LEN + 2);
    fs::write(&packed, &bytes).unwrap();
    fs::write(&dst, b"previous contents").unwrap();

    let err = decompress(&packed, &dst).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedBody { .. }));
    assert_eq!(fs::read(&dst).unwrap(), b"previous contents");

    bytes.truncate(500);
    fs::write(&packed, &bytes).unwrap();
    let err = decompress(&packed, &dst).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedHeader));
}

#[test]
fn inspect_reports_codes() {
    let dir = tempfile::tempdir().unwrap();
    round_trip(dir.path(), "aaab", b"aaab");

    let summary = inspect(&dir.path().join("aaab.huff")).unwrap();
    assert_eq!(summary.total_symbols, 4);
    assert_eq!(summary.distinct_symbols, 2);
    assert_eq!(summary.body_bytes, 1);
    assert_eq!(summary.tree_depth, 1);
    assert_eq!(
        summary.codes,
        vec![(b'a', 3, "1".to_string()), (b'b', 1, "0".to_string())]
    );
}

#[test]
fn batch_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("1book.txt");
    let missing = dir.path().join("2book.txt");
    let other = dir.path().join("3book.txt");
    fs::write(&good, "call me ishmael ".repeat(1000)).unwrap();
    fs::write(&other, b"\x00\x01\x02\x03\xff").unwrap();

    let reports = run_batch(
        &[good.clone(), missing.clone(), other.clone()],
        &CompressOptions::default(),
        true,
    );

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_ok());
    assert!(!reports[1].is_ok());
    assert!(reports[1].outcome.is_err());
    assert!(reports[2].is_ok());

    let trip = reports[0].outcome.as_ref().unwrap();
    assert_eq!(trip.compressed, artifact_path(&good));
    assert!(trip.compressed_bytes < trip.input_bytes);
    assert!(trip.check.as_ref().unwrap().matches);
    assert!(restored_path(&other).exists());
}
