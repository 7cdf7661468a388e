use ndarray::Array2;

use crate::error::{Result, SerError};
use crate::header::{SampleFormat, SerMetadata};

/// Decode the contiguous frame region that immediately follows the header.
///
/// Consumes exactly `frame_count * frame_byte_size` bytes from the start
/// of `data`; anything after that belongs to the timestamp trailer.
pub fn decode_frames(data: &[u8], metadata: &SerMetadata) -> Result<Vec<Array2<u16>>> {
    let frame_size = metadata.frame_byte_size();
    let count = metadata.frame_count as usize;

    let mut frames = Vec::with_capacity(count);
    let mut offset = 0usize;
    for _ in 0..count {
        let end = offset.saturating_add(frame_size);
        if end > data.len() {
            return Err(SerError::Truncated {
                context: "frame data",
                expected: frame_size,
                actual: data.len() - offset,
            });
        }
        frames.push(decode_samples(&data[offset..end], metadata));
        offset = end;
    }
    Ok(frames)
}

/// Decode a single frame from its raw bytes.
pub fn decode_frame(raw: &[u8], metadata: &SerMetadata) -> Result<Array2<u16>> {
    let frame_size = metadata.frame_byte_size();
    if raw.len() < frame_size {
        return Err(SerError::Truncated {
            context: "frame data",
            expected: frame_size,
            actual: raw.len(),
        });
    }
    Ok(decode_samples(&raw[..frame_size], metadata))
}

fn decode_samples(raw: &[u8], metadata: &SerMetadata) -> Array2<u16> {
    let height = metadata.image_height as usize;
    let width = metadata.image_width as usize;
    let mut data = Array2::<u16>::zeros((height, width));

    match metadata.sample_format() {
        SampleFormat::U8 => {
            for row in 0..height {
                for col in 0..width {
                    data[[row, col]] = u16::from(raw[row * width + col]);
                }
            }
        }
        SampleFormat::U16 => {
            for row in 0..height {
                for col in 0..width {
                    let idx = (row * width + col) * 2;
                    data[[row, col]] = u16::from_le_bytes([raw[idx], raw[idx + 1]]);
                }
            }
        }
    }
    data
}

/// Append one frame's samples to `out` in row-major order at the width
/// implied by `pixel_depth`. Values are expected in range for the target
/// width; 8-bit files narrow by plain truncation.
pub fn encode_frame(out: &mut Vec<u8>, frame: &Array2<u16>, metadata: &SerMetadata) -> Result<()> {
    check_frame_shape(frame, metadata)?;
    match metadata.sample_format() {
        SampleFormat::U8 => {
            for &value in frame.iter() {
                out.push(value as u8);
            }
        }
        SampleFormat::U16 => {
            for &value in frame.iter() {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    Ok(())
}

/// Verify a frame's shape is exactly `(image_height, image_width)`.
pub fn check_frame_shape(frame: &Array2<u16>, metadata: &SerMetadata) -> Result<()> {
    let expected = (
        metadata.image_height as usize,
        metadata.image_width as usize,
    );
    if frame.dim() != expected {
        return Err(SerError::Validation(format!(
            "frame shape {:?} does not match header ({}, {})",
            frame.dim(),
            expected.0,
            expected.1
        )));
    }
    Ok(())
}
