use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SerError};
use crate::frame::{decode_frame, decode_frames};
use crate::header::{parse_header, SerMetadata, SER_HEADER_SIZE};
use crate::timestamp::{decode_timestamps, TIMESTAMP_SIZE};

/// A fully decoded SER file.
#[derive(Clone, Debug)]
pub struct SerFile {
    pub metadata: SerMetadata,
    /// One raster per frame, shape `(image_height, image_width)`.
    pub frames: Vec<Array2<u16>>,
    /// Per-frame tick values, present for every frame or for none.
    pub timestamps: Option<Vec<u64>>,
}

/// Decode a complete SER byte stream: header, then frames, then the
/// optional timestamp trailer.
pub fn decode(bytes: &[u8]) -> Result<SerFile> {
    let metadata = parse_header(bytes)?;
    let body = &bytes[SER_HEADER_SIZE..];
    let frames = decode_frames(body, &metadata)?;

    // decode_frames verified this region fits, so the multiply is exact.
    let frame_bytes = metadata.frame_byte_size() * metadata.frame_count as usize;
    let timestamps = decode_timestamps(&body[frame_bytes..], metadata.frame_count);

    Ok(SerFile {
        metadata,
        frames,
        timestamps,
    })
}

/// Read and fully decode a SER file from disk.
pub fn read_ser(path: &Path) -> Result<SerFile> {
    let reader = SerReader::open(path)?;
    debug!(
        path = %path.display(),
        frames = reader.frame_count(),
        "decoding SER file"
    );
    let frames = reader.frames().collect::<Result<Vec<_>>>()?;
    let timestamps = reader.timestamps();
    Ok(SerFile {
        metadata: reader.metadata.clone(),
        frames,
        timestamps,
    })
}

/// Memory-mapped SER file reader with random frame access.
#[derive(Debug)]
pub struct SerReader {
    mmap: Mmap,
    pub metadata: SerMetadata,
}

impl SerReader {
    /// Open a SER file, parse its header, and verify the declared frame
    /// region is fully present.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let metadata = parse_header(&mmap)?;
        let data_size = metadata
            .frame_byte_size()
            .saturating_mul(metadata.frame_count as usize);
        let expected = SER_HEADER_SIZE.saturating_add(data_size);
        if mmap.len() < expected {
            return Err(SerError::Truncated {
                context: "frame data",
                expected,
                actual: mmap.len(),
            });
        }

        Ok(Self { mmap, metadata })
    }

    pub fn frame_count(&self) -> usize {
        self.metadata.frame_count as usize
    }

    /// Raw bytes of a single frame (zero-copy from the mapping).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(SerError::Validation(format!(
                "frame index {index} out of range ({count} frames)"
            )));
        }
        let frame_size = self.metadata.frame_byte_size();
        let offset = SER_HEADER_SIZE + index * frame_size;
        Ok(&self.mmap[offset..offset + frame_size])
    }

    /// Decode a single frame by index.
    pub fn read_frame(&self, index: usize) -> Result<Array2<u16>> {
        decode_frame(self.frame_raw(index)?, &self.metadata)
    }

    /// Iterator over all frames in file order.
    pub fn frames(&self) -> impl Iterator<Item = Result<Array2<u16>>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }

    /// Tick value for one frame, if the file carries a timestamp trailer.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        if index >= self.frame_count() || !self.has_timestamps() {
            return None;
        }
        let offset = self.trailer_offset() + index * TIMESTAMP_SIZE;
        let mut bytes = [0u8; TIMESTAMP_SIZE];
        bytes.copy_from_slice(&self.mmap[offset..offset + TIMESTAMP_SIZE]);
        Some(u64::from_le_bytes(bytes))
    }

    /// All tick values, if the file carries a timestamp trailer.
    pub fn timestamps(&self) -> Option<Vec<u64>> {
        decode_timestamps(&self.mmap[self.trailer_offset()..], self.metadata.frame_count)
    }

    /// Whether the trailing bytes hold one timestamp per frame.
    pub fn has_timestamps(&self) -> bool {
        let trailer_len = self.mmap.len() - self.trailer_offset();
        trailer_len >= self.frame_count() * TIMESTAMP_SIZE
    }

    fn trailer_offset(&self) -> usize {
        SER_HEADER_SIZE + self.metadata.frame_byte_size() * self.frame_count()
    }
}
