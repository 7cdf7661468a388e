use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, SerError};
use crate::frame::{check_frame_shape, encode_frame};
use crate::header::{encode_header, SerMetadata};
use crate::timestamp::encode_timestamps;

/// Encode a complete SER file into a byte buffer.
///
/// The whole (metadata, frames, timestamps) triple is validated before a
/// single byte is produced.
pub fn encode(
    metadata: &SerMetadata,
    frames: &[Array2<u16>],
    timestamps: Option<&[u64]>,
) -> Result<Vec<u8>> {
    validate(metadata, frames, timestamps)?;

    let mut out = encode_header(metadata)?;
    out.reserve(metadata.frame_byte_size() * frames.len());
    for frame in frames {
        encode_frame(&mut out, frame, metadata)?;
    }
    if let Some(ts) = timestamps {
        encode_timestamps(&mut out, ts, metadata.frame_count)?;
    }
    Ok(out)
}

/// Write a SER file to disk.
///
/// Validation runs before any bytes are written, and the bytes go through
/// a temporary file that is only renamed onto `path` on success, so a
/// failed encode never leaves a partially written file at the destination.
pub fn write_ser(
    path: &Path,
    metadata: &SerMetadata,
    frames: &[Array2<u16>],
    timestamps: Option<&[u64]>,
) -> Result<()> {
    validate(metadata, frames, timestamps)?;

    let mut writer = SerWriter::create(path, metadata)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    if let Some(ts) = timestamps {
        writer.write_timestamps(ts)?;
    }
    writer.finalize()?;

    info!(
        path = %path.display(),
        frames = frames.len(),
        timestamps = timestamps.is_some(),
        "SER file written"
    );
    Ok(())
}

fn validate(
    metadata: &SerMetadata,
    frames: &[Array2<u16>],
    timestamps: Option<&[u64]>,
) -> Result<()> {
    metadata.validate()?;
    if frames.len() != metadata.frame_count as usize {
        return Err(SerError::Validation(format!(
            "{} frames supplied, header declares {}",
            frames.len(),
            metadata.frame_count
        )));
    }
    for frame in frames {
        check_frame_shape(frame, metadata)?;
    }
    if let Some(ts) = timestamps {
        if ts.len() != metadata.frame_count as usize {
            return Err(SerError::Validation(format!(
                "timestamp count {} does not match frame count {}",
                ts.len(),
                metadata.frame_count
            )));
        }
    }
    Ok(())
}

/// Incremental SER writer.
///
/// Bytes go to a temporary file in the destination directory; the
/// destination is only created when `finalize` succeeds. Dropping the
/// writer without finalizing removes the temporary file.
pub struct SerWriter {
    writer: BufWriter<NamedTempFile>,
    dest: PathBuf,
    metadata: SerMetadata,
    frames_written: u32,
    trailer_started: bool,
}

impl SerWriter {
    /// Validate the header, open a temporary file next to `path`, and
    /// write the header.
    pub fn create(path: &Path, metadata: &SerMetadata) -> Result<Self> {
        let header = encode_header(metadata)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        let mut writer = BufWriter::new(tmp);
        writer.write_all(&header)?;

        Ok(Self {
            writer,
            dest: path.to_path_buf(),
            metadata: metadata.clone(),
            frames_written: 0,
            trailer_started: false,
        })
    }

    /// Append one frame, checking its shape against the header.
    pub fn write_frame(&mut self, frame: &Array2<u16>) -> Result<()> {
        self.check_frame_slot()?;
        let mut buf = Vec::with_capacity(self.metadata.frame_byte_size());
        encode_frame(&mut buf, frame, &self.metadata)?;
        self.writer.write_all(&buf)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Append one frame from pre-encoded bytes.
    pub fn write_raw_frame(&mut self, data: &[u8]) -> Result<()> {
        self.check_frame_slot()?;
        let frame_size = self.metadata.frame_byte_size();
        if data.len() != frame_size {
            return Err(SerError::Validation(format!(
                "raw frame is {} bytes, header requires {frame_size}",
                data.len()
            )));
        }
        self.writer.write_all(data)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Append the optional timestamp trailer, one u64 per frame.
    pub fn write_timestamps(&mut self, timestamps: &[u64]) -> Result<()> {
        if self.trailer_started {
            return Err(SerError::Validation(
                "timestamp trailer already written".to_string(),
            ));
        }
        let mut buf = Vec::with_capacity(timestamps.len() * 8);
        encode_timestamps(&mut buf, timestamps, self.metadata.frame_count)?;
        self.writer.write_all(&buf)?;
        self.trailer_started = true;
        Ok(())
    }

    /// Flush and rename the temporary file onto the destination.
    pub fn finalize(self) -> Result<()> {
        if self.frames_written != self.metadata.frame_count {
            return Err(SerError::Validation(format!(
                "wrote {} frames, header declares {}",
                self.frames_written, self.metadata.frame_count
            )));
        }
        let tmp = self
            .writer
            .into_inner()
            .map_err(|e| SerError::Io(e.into_error()))?;
        tmp.persist(&self.dest).map_err(|e| SerError::Io(e.error))?;
        Ok(())
    }

    fn check_frame_slot(&self) -> Result<()> {
        if self.trailer_started {
            return Err(SerError::Validation(
                "frames cannot follow the timestamp trailer".to_string(),
            ));
        }
        if self.frames_written >= self.metadata.frame_count {
            return Err(SerError::Validation(format!(
                "header declares {} frames, cannot write more",
                self.metadata.frame_count
            )));
        }
        Ok(())
    }
}
