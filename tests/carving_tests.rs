//! Behaviour of the carving engine over whole buffers

use packet_carver::domain::entities::{Artifact, FileType};
use packet_carver::domain::repositories::SinkError;
use packet_carver::domain::services::{CarverError, CarvingEngine, FixedClock};
use packet_carver::infrastructure::persistence::{CallbackSink, MemorySink};
use rstest::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_FOOTER: &[u8] = b"IEND\xaeB`\x82";

#[fixture]
fn engine() -> CarvingEngine {
    CarvingEngine::standard().with_clock(Arc::new(FixedClock::new("101010")))
}

fn jpg(fill: u8, len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF];
    data.extend(std::iter::repeat_n(fill, len));
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn png(fill: u8, len: usize) -> Vec<u8> {
    let mut data = PNG_HEADER.to_vec();
    data.extend(std::iter::repeat_n(fill, len));
    data.extend_from_slice(PNG_FOOTER);
    data
}

#[rstest]
fn test_jpg_and_png_example(engine: CarvingEngine) {
    let mut buffer = jpg(b'A', 10);
    buffer.extend(png(b'B', 5));

    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["jpg", "png"], &sink, None).unwrap();

    assert_eq!(result.total_artifacts(), 2);
    let artifacts = sink.artifacts();
    assert_eq!(artifacts[0].file_type(), FileType::Jpg);
    assert_eq!(artifacts[0].size(), 15);
    assert_eq!(artifacts[0].data(), &buffer[..15]);
    assert_eq!(artifacts[0].filename(), "jpg_101010_0.jpg");
    assert_eq!(artifacts[1].file_type(), FileType::Png);
    assert_eq!(artifacts[1].size(), 21);
    assert_eq!(artifacts[1].source_offset(), 15);
    assert_eq!(artifacts[1].filename(), "png_101010_1.png");
}

#[rstest]
fn test_single_instance_is_the_full_range(engine: CarvingEngine) {
    let mut buffer = b"noise".to_vec();
    let file = png(0x42, 64);
    buffer.extend_from_slice(&file);
    buffer.extend_from_slice(b"trailing noise");

    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["png"], &sink, None).unwrap();

    assert_eq!(result.total_artifacts(), 1);
    assert_eq!(sink.artifacts()[0].data(), file.as_slice());
    assert_eq!(result.artifacts()[0].range(), 5..5 + file.len() as u64);
}

#[rstest]
fn test_header_without_footer_yields_nothing(engine: CarvingEngine) {
    let buffer = [0xFF, 0xD8, 0xFF, 0x00, 0x01, 0x02];
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["jpg"], &sink, None).unwrap();
    assert_eq!(result.total_artifacts(), 0);
    assert_eq!(result.count_for_type(FileType::Jpg), 0);
}

#[rstest]
fn test_overlapping_headers_share_a_footer(engine: CarvingEngine) {
    let buffer = [0xFF, 0xD8, 0xFF, 0xD8, 0xFF, 0x41, 0x41, 0xFF, 0xD9];
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["jpg"], &sink, None).unwrap();

    let ranges: Vec<_> = result.artifacts().iter().map(|a| a.range()).collect();
    assert_eq!(ranges, vec![0..9, 2..9]);
    let artifacts = sink.artifacts();
    assert_eq!(artifacts[0].filename(), "jpg_101010_0.jpg");
    assert_eq!(artifacts[1].filename(), "jpg_101010_1.jpg");
    assert_eq!(artifacts[1].data(), &buffer[2..]);
}

#[rstest]
fn test_repeated_headers_without_footer_scan_in_linear_time(engine: CarvingEngine) {
    // 4 MiB of back-to-back PDF headers and not a single trailer
    let buffer = "%PDF".repeat(1 << 20).into_bytes();
    let sink = MemorySink::new();

    let started = Instant::now();
    let result = engine.extract(&buffer, &["pdf"], &sink, None).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.total_artifacts(), 0);
    assert!(elapsed < Duration::from_secs(5), "scan took {elapsed:?}");
}

#[rstest]
fn test_many_headers_sharing_one_footer(engine: CarvingEngine) {
    let mut buffer = "%PDF".repeat(1 << 10).into_bytes();
    buffer.extend_from_slice(b" %%EOF");
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["pdf"], &sink, None).unwrap();

    assert_eq!(result.total_artifacts(), 1 << 10);
    let last = result.artifacts().last().unwrap();
    assert_eq!(last.range().end, buffer.len() as u64);
}

#[rstest]
fn test_footerless_instances_end_at_next_header(engine: CarvingEngine) {
    let buffer = [0x1F, 0x8B, 0x08, 0x00, 0xAA, 0x1F, 0x8B, 0x08, 0xBB];
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["gz"], &sink, None).unwrap();

    let ranges: Vec<_> = result.artifacts().iter().map(|a| a.range()).collect();
    assert_eq!(ranges, vec![0..5, 5..9]);
}

#[rstest]
fn test_adjacent_footerless_headers(engine: CarvingEngine) {
    // 1F 8B 1F 8B: the first candidate is just its own header
    let buffer = [0x1F, 0x8B, 0x1F, 0x8B, 0x00];
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["gz"], &sink, None).unwrap();

    let ranges: Vec<_> = result.artifacts().iter().map(|a| a.range()).collect();
    assert_eq!(ranges, vec![0..2, 2..5]);
}

#[rstest]
fn test_shared_zip_header_counts_for_every_type(engine: CarvingEngine) {
    let mut buffer = b"PK\x03\x04\x14\x00".to_vec();
    buffer.extend_from_slice(b"word/document.xml");
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["docx", "xlsx", "zip"], &sink, None).unwrap();

    assert_eq!(result.count_for_type(FileType::Docx), 1);
    assert_eq!(result.count_for_type(FileType::Xlsx), 0);
    assert_eq!(result.count_for_type(FileType::Zip), 1);
    assert_eq!(result.total_artifacts(), 2);
}

#[rstest]
fn test_unknown_id_does_not_affect_others(engine: CarvingEngine) {
    let buffer = jpg(b'x', 4);
    let sink = MemorySink::new();
    let result = engine.extract(&buffer, &["tar", "jpg"], &sink, None).unwrap();

    assert_eq!(result.total_artifacts(), 1);
    assert_eq!(result.unknown_types(), &["tar".to_string()]);
    assert_eq!(sink.artifacts()[0].sequence(), 0);
}

#[rstest]
fn test_only_unknown_ids_is_not_an_error(engine: CarvingEngine) {
    let sink = MemorySink::new();
    let result = engine.extract(b"\xff\xd8\xff", &["tar"], &sink, None).unwrap();
    assert_eq!(result.total_artifacts(), 0);
}

#[rstest]
fn test_empty_buffer(engine: CarvingEngine) {
    let sink = MemorySink::new();
    let result = engine.extract(b"", &["jpg", "gz", "bmp"], &sink, None).unwrap();
    assert_eq!(result.total_artifacts(), 0);
    assert_eq!(result.payload_bytes(), 0);
}

#[rstest]
fn test_empty_selection(engine: CarvingEngine) {
    let sink = MemorySink::new();
    let none: Vec<String> = Vec::new();
    let err = engine.extract(b"\x1f\x8b", &none, &sink, None).unwrap_err();
    assert!(matches!(err, CarverError::NoTypesSelected));
    assert_eq!(sink.artifacts().len(), 0);
}

#[rstest]
fn test_sequence_numbers_are_global(engine: CarvingEngine) {
    let mut buffer = jpg(1, 3);
    buffer.extend(png(2, 3));
    buffer.extend(jpg(3, 3));

    let sink = MemorySink::new();
    engine.extract(&buffer, &["png", "jpg"], &sink, None).unwrap();

    let emitted: Vec<_> = sink
        .artifacts()
        .iter()
        .map(|a| (a.type_id(), a.sequence()))
        .collect();
    assert_eq!(emitted, vec![("png", 0), ("jpg", 1), ("jpg", 2)]);
}

#[rstest]
fn test_validation_rejects_without_moving_boundaries(engine: CarvingEngine) {
    // GIF header with a footer but an unknown version string
    let buffer = b"GIF12a....\x00\x3bGIF89a..\x00\x3b";
    let sink = MemorySink::new();
    let result = engine.extract(buffer, &["gif"], &sink, None).unwrap();

    assert_eq!(result.total_artifacts(), 1);
    assert_eq!(result.artifacts()[0].range(), 12..22);
}

#[rstest]
fn test_sink_failure_aborts(engine: CarvingEngine) {
    let buffer = [0x1F, 0x8B, 0x00, 0x1F, 0x8B, 0x00];
    let sink = CallbackSink::new(|artifact: &Artifact<'_>| {
        if artifact.sequence() == 1 {
            Err(SinkError::Rejected("disk gone".into()))
        } else {
            Ok(())
        }
    });

    let err = engine.extract(&buffer, &["gz"], &sink, None).unwrap_err();
    match err {
        CarverError::Sink { filename, .. } => assert_eq!(filename, "gz_101010_1.gz"),
        other => panic!("unexpected error: {other}"),
    }
}
