//! Integration tests for frame scanning regression testing
//!
//! These tests render ECC200 symbols with the built-in encoder and run them
//! through the full pipeline. They protect the polarity handling, the
//! finder locator and sampler, and the decoder's error-correction boundary.

use rust_dm::decoder::placement::Placement;
use rust_dm::encoder::{RenderOptions, encode, encode_with_size, render};
use rust_dm::{
    FailureKind, Frame, MatrixDecoder, ModuleMatrix, Pipeline, Polarity, PolarityHint,
    PolarityMode, ScanConfig, ScanOutcome, ScanSession, SymbolShape, SymbolSize, scan,
};
use std::time::Duration;

const DEMO_LABEL: &[u8] = b"\x1D010035839402403521647945679587\x1D1719073110S66352\x1D7004973";

fn render_with(matrix: &ModuleMatrix, polarity: Polarity) -> Frame {
    render(matrix, &RenderOptions::default().with_polarity(polarity)).expect("render fixture")
}

fn label(payload: &[u8], polarity: Polarity) -> Frame {
    let matrix = encode(payload, SymbolShape::Square).expect("encode fixture");
    render_with(&matrix, polarity)
}

fn tonal_inverse(frame: &Frame) -> Frame {
    let data = frame.data().iter().map(|&v| 255 - v).collect();
    Frame::gray(frame.width(), frame.height(), data, frame.timestamp())
}

/// Rotate a Gray8 frame about its center onto a canvas large enough to hold
/// it, nearest-neighbour, filling uncovered pixels with `fill`
fn rotate(frame: &Frame, degrees: f32, fill: u8) -> Frame {
    let (w, h) = (frame.width() as f32, frame.height() as f32);
    let side = (w.hypot(h).ceil() as usize) + 4;
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (cx, cy) = (w / 2.0, h / 2.0);
    let c = side as f32 / 2.0;

    let mut data = vec![fill; side * side];
    for y in 0..side {
        for x in 0..side {
            let dx = x as f32 + 0.5 - c;
            let dy = y as f32 + 0.5 - c;
            let sx = cos * dx + sin * dy + cx;
            let sy = -sin * dx + cos * dy + cy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                data[y * side + x] = frame.data()[sy as usize * frame.width() + sx as usize];
            }
        }
    }
    Frame::gray(side, side, data, frame.timestamp())
}

/// Deterministic +/- `amplitude` noise
fn add_noise(frame: &Frame, amplitude: i32, seed: u64) -> Frame {
    let mut state = seed;
    let data = frame
        .data()
        .iter()
        .map(|&v| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let offset = ((state >> 33) % (2 * amplitude as u64 + 1)) as i32 - amplitude;
            (v as i32 + offset).clamp(0, 255) as u8
        })
        .collect();
    Frame::gray(frame.width(), frame.height(), data, frame.timestamp())
}

#[test]
fn test_scenario_no_finder_pattern() {
    let mut data = vec![200u8; 120 * 90];
    // A few unrelated blobs
    for y in 20..30 {
        for x in 10..70 {
            data[y * 120 + x] = 30;
        }
    }
    let frame = Frame::gray(120, 90, data, Duration::from_millis(10));
    let report = scan(&frame);
    assert_eq!(report.outcome, ScanOutcome::NoSymbolFound);
    assert_eq!(report.timestamp, Duration::from_millis(10));
}

#[test]
fn test_scenario_dark_on_light_digits() {
    let report = scan(&label(b"12345", Polarity::DarkOnLight));
    let payload = report.outcome.payload().expect("symbol should decode");
    assert_eq!(payload.bytes, b"12345");
    assert_eq!(payload.symbol, SymbolSize::from_dimensions(10, 10).unwrap());
    assert_eq!(payload.polarity, Some(Polarity::DarkOnLight));
    assert_eq!(report.attempted, vec![Polarity::DarkOnLight]);
}

#[test]
fn test_scenario_inverse_image_autodetect() {
    let inverse = tonal_inverse(&label(b"12345", Polarity::DarkOnLight));
    let report = scan(&inverse);
    let payload = report.outcome.payload().expect("inverse should decode");
    assert_eq!(payload.bytes, b"12345");
    assert_eq!(payload.polarity, Some(Polarity::LightOnDark));
    // Strongly dark border: light-on-dark goes first and the fallback is skipped
    assert_eq!(report.attempted, vec![Polarity::LightOnDark]);
}

/// Paste `frame` in the middle of a canvas three times its size
fn on_surround(frame: &Frame, fill: u8) -> Frame {
    let (w, h) = (frame.width(), frame.height());
    let (width, height) = (w * 3, h * 3);
    let mut data = vec![fill; width * height];
    for y in 0..h {
        let row = (y + h) * width + w;
        data[row..row + w].copy_from_slice(&frame.data()[y * w..(y + 1) * w]);
    }
    Frame::gray(width, height, data, frame.timestamp())
}

#[test]
fn test_label_on_opposite_tone_surround() {
    let matrix = encode(b"12345", SymbolShape::Square).unwrap();
    let options = RenderOptions {
        quiet_zone: 4,
        ..RenderOptions::default()
    };
    let label = render(&matrix, &options).unwrap();

    // Light label on a black desk, then a dark label on a white page
    let cases = [
        (on_surround(&label, 10), Polarity::DarkOnLight),
        (tonal_inverse(&on_surround(&label, 10)), Polarity::LightOnDark),
    ];
    for (frame, polarity) in cases {
        let report = scan(&frame);
        let payload = report.outcome.payload().expect("label decodes");
        assert_eq!(payload.bytes, b"12345");
        assert_eq!(payload.polarity, Some(polarity));
        // The border points the wrong way, so the fallback orientation decodes
        assert_eq!(report.attempted, vec![polarity.opposite(), polarity]);
    }
}

#[test]
fn test_scenario_embedded_separator() {
    let bytes = b"0112345678901231\x1D17250101";
    let report = scan(&label(bytes, Polarity::DarkOnLight));
    let payload = report.outcome.payload().expect("decoded");
    assert_eq!(payload.bytes, bytes);
    assert!(payload.bytes.contains(&0x1D));
    assert!(!payload.gs1);
    assert_eq!(payload.display(), "0112345678901231<GS>17250101");
}

#[test]
fn test_scenario_corrupted_data_never_decodes_wrongly() {
    for (text, rows) in [(&b"12345"[..], 10), (&b"CORRUPTED PAYLOAD 0123456789"[..], 24)] {
        let size = SymbolSize::from_dimensions(rows, rows).unwrap();
        let mut matrix = encode_with_size(text, size).unwrap();
        let placement = Placement::for_size(size);
        for bits in &placement.codewords()[..size.data_codewords()] {
            for &(row, col) in bits {
                matrix.toggle(row, col);
            }
        }

        let report = scan(&render_with(&matrix, Polarity::DarkOnLight));
        match report.outcome {
            ScanOutcome::Failed(
                FailureKind::ChecksumFailure
                | FailureKind::FormatFailure
                | FailureKind::SamplingFailure,
            ) => {}
            other => panic!("{size}: expected a decode failure, got {other:?}"),
        }
    }
}

#[test]
fn test_polarity_symmetry() {
    let payloads: [&[u8]; 4] = [b"A", b"HELLO WORLD", b"polarity-invariant 0123456789", DEMO_LABEL];
    for payload in payloads {
        let light = scan(&label(payload, Polarity::DarkOnLight));
        let dark = scan(&label(payload, Polarity::LightOnDark));
        let a = light.outcome.payload().expect("dark-on-light decodes");
        let b = dark.outcome.payload().expect("light-on-dark decodes");
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.bytes, payload);

        // Forcing the correct polarity gives the same result
        let forced = Pipeline::new(
            ScanConfig::default().with_polarity_mode(PolarityMode::ForceLightOnDark),
        )
        .run(&label(payload, Polarity::LightOnDark), &PolarityHint::new());
        assert_eq!(forced.outcome.payload().map(|p| &p.bytes), Some(&b.bytes));
    }
}

#[test]
fn test_demo_label_round_trip_in_both_polarities() {
    for polarity in [Polarity::DarkOnLight, Polarity::LightOnDark] {
        let report = scan(&label(DEMO_LABEL, polarity));
        let payload = report.outcome.payload().expect("demo label decodes");
        assert_eq!(payload.bytes, DEMO_LABEL);
        assert!(payload.gs1);
        assert_eq!(
            payload.display(),
            "<GS>010035839402403521647945679587<GS>1719073110S66352<GS>7004973"
        );
    }
}

#[test]
fn test_rectangular_and_multi_region_symbols() {
    let rect = encode(b"RECT 42", SymbolShape::Rectangle).unwrap();
    assert!(!rect.size().is_square());
    let report = scan(&render_with(&rect, Polarity::LightOnDark));
    assert_eq!(report.outcome.payload().map(|p| p.bytes.as_slice()), Some(&b"RECT 42"[..]));

    let text: Vec<u8> = (0..60).map(|i| b'A' + (i % 26) as u8).collect();
    let big = encode(&text, SymbolShape::Square).unwrap();
    assert!(big.size().regions_horizontal() > 1);
    let report = scan(&render_with(&big, Polarity::DarkOnLight));
    assert_eq!(report.outcome.payload().map(|p| &p.bytes), Some(&text));
}

#[test]
fn test_rotated_symbols() {
    let matrix = encode(b"ROTATE", SymbolShape::Square).unwrap();
    let options = RenderOptions::default().with_module_px(10);
    for polarity in [Polarity::DarkOnLight, Polarity::LightOnDark] {
        let frame = render(&matrix, &options.with_polarity(polarity)).unwrap();
        let fill = frame.data()[0];
        for degrees in [90.0, 180.0, 270.0, 8.0] {
            let report = scan(&rotate(&frame, degrees, fill));
            assert_eq!(
                report.outcome.payload().map(|p| p.bytes.as_slice()),
                Some(&b"ROTATE"[..]),
                "{polarity} rotated {degrees}"
            );
        }
    }
}

#[test]
fn test_noisy_frames_decode() {
    for polarity in [Polarity::DarkOnLight, Polarity::LightOnDark] {
        let frame = add_noise(&label(b"NOISE 2024", polarity), 6, 7);
        let report = scan(&frame);
        assert_eq!(
            report.outcome.payload().map(|p| p.bytes.as_slice()),
            Some(&b"NOISE 2024"[..]),
            "{polarity}"
        );
    }
}

#[test]
fn test_error_correction_boundary() {
    let size = SymbolSize::from_dimensions(10, 10).unwrap();
    let clean = encode_with_size(b"12345", size).unwrap();
    let placement = Placement::for_size(size);
    let corrupt = |codewords: &[usize]| {
        let mut matrix = clean.clone();
        for &index in codewords {
            let (row, col) = placement.codewords()[index][0];
            matrix.toggle(row, col);
        }
        matrix
    };

    let two = MatrixDecoder::decode(&corrupt(&[1, 6])).expect("two errors are correctable");
    assert_eq!(two.bytes, b"12345");
    assert_eq!(two.corrected_codewords, 2);

    let three = MatrixDecoder::decode(&corrupt(&[1, 4, 6]));
    assert!(matches!(three, Err(rust_dm::DecodeError::ChecksumFailure { .. })));

    // Same through the whole pipeline
    let report = scan(&render_with(&corrupt(&[0, 2, 7]), Polarity::LightOnDark));
    assert_eq!(report.outcome, ScanOutcome::Failed(FailureKind::ChecksumFailure));
}

#[test]
fn test_decode_is_idempotent() {
    let matrix = encode(DEMO_LABEL, SymbolShape::Square).unwrap();
    let first = MatrixDecoder::decode(&matrix);
    let second = MatrixDecoder::decode(&matrix);
    assert_eq!(first, second);

    let frame = label(b"SAME", Polarity::LightOnDark);
    let pipeline = Pipeline::default();
    let hint = PolarityHint::new();
    assert_eq!(pipeline.run(&frame, &hint), pipeline.run(&frame, &hint));
}

#[test]
fn test_session_hint_behaviour() {
    let mut session = ScanSession::new(ScanConfig::default());
    assert_eq!(session.hint(), PolarityHint::new());

    // Failure leaves the hint alone
    let blank = Frame::gray(80, 80, vec![128; 80 * 80], Duration::ZERO);
    assert_eq!(session.scan(&blank).outcome, ScanOutcome::NoSymbolFound);
    assert_eq!(session.hint(), PolarityHint::new());

    // Success moves it toward the decoded polarity
    let report = session.scan(&label(b"HINT", Polarity::LightOnDark));
    assert!(report.outcome.is_decoded());
    let after_one = session.hint().value();
    assert!((after_one + 0.3).abs() < 1e-6);
    session.scan(&label(b"HINT", Polarity::LightOnDark));
    assert!(session.hint().value() < after_one);

    // Mid-gray labels now try light-on-dark first
    let mid = session.pipeline().resolver().plan(128, &session.hint());
    assert_eq!(mid.first(), Polarity::LightOnDark);
}

#[test]
fn test_low_contrast_mid_gray_label() {
    // Both tones close to the middle: both polarities are planned
    let matrix = encode(b"MID", SymbolShape::Square).unwrap();
    let options = RenderOptions {
        dark: 90,
        light: 165,
        ..RenderOptions::default()
    };
    for polarity in [Polarity::DarkOnLight, Polarity::LightOnDark] {
        let frame = render(&matrix, &options.with_polarity(polarity)).unwrap();
        let report = scan(&frame);
        assert_eq!(report.attempted.len(), 2, "{polarity}");
        let payload = report.outcome.payload().expect("decoded");
        assert_eq!(payload.bytes, b"MID");
        assert_eq!(payload.polarity, Some(polarity));
    }
}
