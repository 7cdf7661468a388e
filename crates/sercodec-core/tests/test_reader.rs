mod common;

use sercodec_core::error::SerError;
use sercodec_core::header::ColorMode;
use sercodec_core::reader::SerReader;

#[test]
fn test_parse_8bit_mono() {
    let frame_data: Vec<u8> = (0u8..12).collect();
    let ser_data = common::build_ser_with_frames(4, 3, &[frame_data]);
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    assert_eq!(reader.frame_count(), 1);
    assert_eq!(reader.metadata.image_width, 4);
    assert_eq!(reader.metadata.image_height, 3);
    assert_eq!(reader.metadata.pixel_depth, 8);
    assert_eq!(reader.metadata.color_mode(), ColorMode::Mono);
    assert_eq!(reader.metadata.observer, "Test");
    assert_eq!(reader.metadata.telescope, "MyScope");

    let frame = reader.read_frame(0).unwrap();
    assert_eq!(frame.dim(), (3, 4));
    assert_eq!(frame[[0, 0]], 0);
    assert_eq!(frame[[0, 1]], 1);
    assert_eq!(frame[[2, 3]], 11);
}

#[test]
fn test_parse_16bit_mono() {
    let values: [u16; 4] = [0, 1_000, 32_767, 65_535];
    let mut frame_data = Vec::new();
    for v in &values {
        frame_data.extend_from_slice(&v.to_le_bytes());
    }
    let mut ser_data = common::build_ser_header_full(2, 2, 16, 1, 0);
    ser_data.extend_from_slice(&frame_data);
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    let frame = reader.read_frame(0).unwrap();
    assert_eq!(frame[[0, 0]], 0);
    assert_eq!(frame[[0, 1]], 1_000);
    assert_eq!(frame[[1, 0]], 32_767);
    assert_eq!(frame[[1, 1]], 65_535);
}

#[test]
fn test_frame_raw_zero_copy() {
    let frame1: Vec<u8> = vec![0, 50, 100, 200];
    let frame2: Vec<u8> = vec![255, 200, 100, 50];
    let ser_data = common::build_ser_with_frames(2, 2, &[frame1.clone(), frame2.clone()]);
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    assert_eq!(reader.frame_raw(0).unwrap(), &frame1[..]);
    assert_eq!(reader.frame_raw(1).unwrap(), &frame2[..]);
}

#[test]
fn test_out_of_range_index() {
    let ser_data = common::build_ser_with_frames(2, 2, &[vec![0, 0, 0, 0]]);
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    let err = reader.read_frame(1).unwrap_err();
    assert!(matches!(err, SerError::Validation(_)));
    assert!(reader.timestamp(1).is_none());
}

#[test]
fn test_frames_iterator() {
    let frames = vec![
        vec![10u8, 20, 30, 40],
        vec![50u8, 60, 70, 80],
        vec![90u8, 100, 110, 120],
    ];
    let ser_data = common::build_ser_with_frames(2, 2, &frames);
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    let decoded: Vec<_> = reader.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0][[0, 0]], 10);
    assert_eq!(decoded[2][[1, 1]], 120);
}

#[test]
fn test_open_rejects_missing_frame_data() {
    // Header declares 2 frames but only one is present.
    let mut ser_data = common::build_ser_header(2, 2, 2);
    ser_data.extend_from_slice(&[1, 2, 3, 4]);
    let tmpfile = common::write_test_ser(&ser_data);

    let err = SerReader::open(tmpfile.path()).unwrap_err();
    assert!(matches!(err, SerError::Truncated { .. }));
}

#[test]
fn test_open_rejects_wrong_magic() {
    let mut ser_data = common::build_ser_with_frames(2, 2, &[vec![0, 0, 0, 0]]);
    ser_data[..14].copy_from_slice(b"NOT-A-SER-FILE");
    let tmpfile = common::write_test_ser(&ser_data);

    let err = SerReader::open(tmpfile.path()).unwrap_err();
    assert!(matches!(err, SerError::Format(_)));
}

#[test]
fn test_timestamps_per_index() {
    let mut ser_data = common::build_ser_with_frames(2, 2, &[vec![0; 4], vec![0; 4]]);
    ser_data.extend_from_slice(&1_000u64.to_le_bytes());
    ser_data.extend_from_slice(&2_000u64.to_le_bytes());
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    assert!(reader.has_timestamps());
    assert_eq!(reader.timestamp(0), Some(1_000));
    assert_eq!(reader.timestamp(1), Some(2_000));
    assert_eq!(reader.timestamps(), Some(vec![1_000, 2_000]));
}

#[test]
fn test_partial_trailer_has_no_timestamps() {
    let mut ser_data = common::build_ser_with_frames(2, 2, &[vec![0; 4], vec![0; 4]]);
    // Room for only one of the two timestamps.
    ser_data.extend_from_slice(&1_000u64.to_le_bytes());
    let tmpfile = common::write_test_ser(&ser_data);

    let reader = SerReader::open(tmpfile.path()).unwrap();
    assert!(!reader.has_timestamps());
    assert!(reader.timestamp(0).is_none());
    assert!(reader.timestamps().is_none());
}
