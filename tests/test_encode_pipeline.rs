//! End-to-end tests for the encode orchestrator
//!
//! Runs the default session (luma targets, plain `fast_qr` encoder) and a
//! session with stub collaborators.

mod common;

use qart_backdrop::config::{EncodeParams, FileEncodeConfig};
use qart_backdrop::encoder::{Code, EncodeConfig, EncodedArt, QrArtEncoder};
use qart_backdrop::{ErrorKind, LumaTargetBuilder, QartError, QartResult, QartSession, encode, encode_by_file};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_encode_returns_valid_png() {
    let params = EncodeParams {
        version: 4,
        scale: 4,
        ..Default::default()
    };
    let out = encode("https://example.com/qart", &common::png(300, 200), &params).unwrap();
    assert!(!out.is_empty());
    // 33 modules + 8 quiet modules, 4px each
    assert_eq!(common::png_dimensions(&out), (164, 164));
}

#[test]
fn test_save_control_selects_control_bitmap() {
    let params = EncodeParams {
        version: 2,
        scale: 2,
        save_control: true,
        ..Default::default()
    };
    let out = encode("hello", &common::png(64, 64), &params).unwrap();
    let img = image::load_from_memory(&out).unwrap();
    assert_eq!(img.color(), image::ColorType::Rgba8);
    assert_eq!((img.width(), img.height()), ((25 + 8) * 2, (25 + 8) * 2));
}

#[test]
fn test_payload_too_large_is_encode_error() {
    let params = EncodeParams {
        version: 1,
        ..Default::default()
    };
    let url = format!("https://example.com/{}", "a".repeat(300));
    let err = encode(&url, &common::png(32, 32), &params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);
}

#[test]
fn test_huge_scale_is_encode_error() {
    let params = EncodeParams {
        version: 2,
        scale: 200_000_000,
        ..Default::default()
    };
    let err = encode("hello", &common::png(32, 32), &params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);
}

#[test]
fn test_decode_and_encode_failures_are_distinguishable() {
    let params = EncodeParams::default();
    let decode_err = encode("x", b"nope", &params).unwrap_err();
    let encode_err = encode(&"z".repeat(2000), &common::png(8, 8), &params).unwrap_err();
    assert_eq!(decode_err.kind(), ErrorKind::Decode);
    assert_eq!(encode_err.kind(), ErrorKind::Encode);
}

struct RecordingEncoder {
    seen: Rc<RefCell<Vec<EncodeConfig>>>,
}

impl QrArtEncoder for RecordingEncoder {
    fn encode(&self, config: &EncodeConfig) -> QartResult<EncodedArt> {
        self.seen.borrow_mut().push(config.clone());
        Ok(EncodedArt {
            code: Code::new(1, vec![true], 1)?,
            control: b"control".to_vec(),
        })
    }
}

#[test]
fn test_encode_url_sets_payload_before_encoding() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let encoder = RecordingEncoder { seen: Rc::clone(&seen) };
    let session = QartSession::new(LumaTargetBuilder::default(), encoder);
    let params = EncodeParams {
        save_control: true,
        ..Default::default()
    };
    let config = session.init_image(&common::png(20, 20), &params).unwrap();
    let out = session.encode_url("https://example.org", config).unwrap();
    assert_eq!(out, b"control");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].url, "https://example.org");
    assert_eq!(seen[0].rotation, 0);
}

struct FailingEncoder;

impl QrArtEncoder for FailingEncoder {
    fn encode(&self, _config: &EncodeConfig) -> QartResult<EncodedArt> {
        Err(QartError::Encode("no capacity".to_string()))
    }
}

#[test]
fn test_encoder_failure_is_propagated() {
    let session = QartSession::new(LumaTargetBuilder::default(), FailingEncoder);
    let err = session
        .encode("u", &common::png(20, 20), &EncodeParams::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "Encode error: no capacity");
}

#[test]
fn test_encode_by_file_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("backdrop.jpg");
    let dst = dir.path().join("code.png");
    std::fs::write(&src, common::encode_as(&common::gradient(900, 600), image::ImageFormat::Jpeg)).unwrap();

    encode_by_file("https://example.com", &src, &dst, 6).unwrap();

    let out = std::fs::read(&dst).unwrap();
    // version 6: 41 modules + 8 quiet, scale 4 from the file defaults
    assert_eq!(common::png_dimensions(&out), (196, 196));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        // umask can only remove bits
        assert_eq!(mode & !0o644, 0);
    }
}

#[test]
fn test_encode_by_file_missing_source_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.png");
    let err = encode_by_file("u", dir.path().join("missing.png"), &dst, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!dst.exists());
}

#[test]
fn test_encode_by_file_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.png");
    std::fs::write(&src, common::png(16, 16)).unwrap();
    let dst = dir.path().join("out.png");
    let config = FileEncodeConfig {
        mask: 11,
        ..Default::default()
    };
    let session = QartSession::<LumaTargetBuilder, qart_backdrop::PlainQrEncoder>::default();
    let err = session.encode_by_file("u", &src, &dst, 4, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!dst.exists());
}

#[test]
fn test_encode_by_file_unwritable_destination_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.png");
    std::fs::write(&src, common::png(16, 16)).unwrap();
    let dst = dir.path().join("no-such-dir").join("out.png");
    let err = encode_by_file("u", &src, &dst, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_encode_by_file_failed_write_leaves_no_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.png");
    std::fs::write(&src, common::png(16, 16)).unwrap();
    // a directory in the way makes the final rename fail
    let dst = dir.path().join("out.png");
    std::fs::create_dir(&dst).unwrap();

    let err = encode_by_file("u", &src, &dst, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(dst.is_dir());

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["in.png", "out.png"]);
}

#[test]
fn test_encode_by_file_replaces_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.png");
    let dst = dir.path().join("out.png");
    std::fs::write(&src, common::png(16, 16)).unwrap();
    std::fs::write(&dst, b"stale").unwrap();

    encode_by_file("u", &src, &dst, 2).unwrap();

    let out = std::fs::read(&dst).unwrap();
    assert_eq!(common::png_dimensions(&out), ((25 + 8) * 4, (25 + 8) * 4));
    assert!(!dir.path().join("out.png.partial").exists());
}
