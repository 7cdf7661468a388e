#![allow(dead_code)]

use sercodec_core::header::SER_HEADER_SIZE;

/// 178-byte header for a mono 8-bit capture; callers append the frame
/// bytes themselves.
pub fn build_ser_header(width: u32, height: u32, num_frames: usize) -> Vec<u8> {
    build_ser_header_full(width, height, 8, num_frames, 0)
}

/// Like `build_ser_header` but with bit depth and color id under test
/// control (0=MONO, 8=BAYER_RGGB, 9=BAYER_GRBG, 10=BAYER_GBRG,
/// 11=BAYER_BGGR).
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: u32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // FileID (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0u32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian flag (4 bytes)
    buf.extend_from_slice(&1u32.to_le_bytes());
    // Width
    buf.extend_from_slice(&width.to_le_bytes());
    // Height
    buf.extend_from_slice(&height.to_le_bytes());
    // PixelDepth
    buf.extend_from_slice(&bit_depth.to_le_bytes());
    // FrameCount
    buf.extend_from_slice(&(num_frames as u32).to_le_bytes());
    // Observer (40 bytes)
    let mut observer = [0u8; 40];
    observer[..4].copy_from_slice(b"Test");
    buf.extend_from_slice(&observer);
    // Instrument (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // Telescope (40 bytes)
    let mut telescope = [0u8; 40];
    telescope[..7].copy_from_slice(b"MyScope");
    buf.extend_from_slice(&telescope);
    // DateTime (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());
    // DateTimeUTC (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Full synthetic mono 8-bit file: header plus the supplied frame bytes,
/// no timestamp trailer.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, frames.len());
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Dump a SER buffer into a temp file for the mmap-based reader tests.
/// Keep the returned handle alive for as long as the path is in use.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}
